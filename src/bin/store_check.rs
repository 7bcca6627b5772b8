use taskdesk::config::StoreConfig;
use taskdesk::controller::{ListState, TaskListController};
use taskdesk::query::PAGE_SIZE;
use taskdesk::session::SessionContext;
use taskdesk::store::{profiles, tasks, PostgrestClient};

#[tokio::main]
async fn main() {
    systemd_journal_logger::JournalLog::new()
        .unwrap()
        .with_syslog_identifier("taskdesk-store-check".to_string())
        .install()
        .unwrap();
    log::set_max_level(log::LevelFilter::Info);

    let config = StoreConfig::load();
    taskdesk::set_debug_logging(config.debug_logging);

    println!("=== Store connectivity check ===\n");

    if let Err(e) = config.ensure_usable() {
        println!("{}", e);
        println!("Set TASKDESK_STORE_URL / TASKDESK_STORE_KEY or edit {}", StoreConfig::config_path().display());
        return;
    }

    let client = match PostgrestClient::new(&config.store_url, &config.store_key) {
        Ok(c) => c,
        Err(e) => {
            println!("Client error: {}", e);
            return;
        }
    };

    // Load the directory
    let directory = match profiles::fetch_all(&client).await {
        Ok(p) => p,
        Err(e) => {
            println!("Failed to load profiles: {}", e);
            return;
        }
    };
    println!("Profiles: {}", directory.len());
    for profile in &directory {
        let chat = profile
            .telegram_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "no chat id".to_string());
        println!("  [{}] {} ({})", profile.role.as_keyword(), profile.display_name(), chat);
    }

    // Optionally sign in as a given profile to exercise the visibility rules
    let mut session = SessionContext::new();
    if let Some(arg) = std::env::args().nth(1) {
        match arg.parse() {
            Ok(profile_id) => session.sign_in(profile_id, directory.clone()),
            Err(_) => {
                println!("\nArgument is not a profile UUID: {}", arg);
                return;
            }
        }
        match session.current() {
            Some(profile) => println!("\nViewing as: {}", profile.display_name()),
            None => println!("\nProfile not found in directory; viewing unrestricted"),
        }
    } else {
        println!("\nNo profile UUID given; viewing unrestricted");
    }

    // First page through the real controller path
    let mut controller = TaskListController::new(session.visibility());
    let request = controller.begin_fetch();
    let result = tasks::fetch_page(&client, &request.query).await;
    controller.apply_result(request.generation, result);

    match controller.state() {
        ListState::Loaded => {
            println!(
                "\nTasks: {} total, {} page(s) of {}",
                controller.total(),
                controller.total_pages(),
                PAGE_SIZE
            );
            for task in controller.rows() {
                let assignee = task
                    .assignee_telegram_id
                    .map(|id| session.display_name_for(id))
                    .unwrap_or_else(|| "unassigned".to_string());
                println!(
                    "  #{} {} (due {}) [{}] {} -> {}",
                    task.id,
                    task.title,
                    task.due_date.format("%Y-%m-%d %H:%M"),
                    task.status.as_db_value(),
                    session.display_name_for(task.assigner_telegram_id),
                    assignee
                );
            }

            // Full record of the first row, the way the detail view loads it
            if let Some(first) = controller.rows().first() {
                match tasks::fetch_by_id(&client, first.id).await {
                    Ok(task) => {
                        println!("\nDetail for #{}:", task.id);
                        println!("  result:   {}", task.result.as_deref().unwrap_or("-"));
                        println!("  comments: {}", task.comments.as_deref().unwrap_or("-"));
                    }
                    Err(e) => println!("\nDetail fetch failed: {}", e),
                }
            }
        }
        ListState::Error(e) => println!("\nTask fetch failed: {}", e),
        other => println!("\nUnexpected controller state: {:?}", other),
    }

    println!("\n=== Done ===");
}
