use crate::core::Profile;
use crate::error::Result;

use super::postgrest::PostgrestClient;

const TABLE: &str = "profiles";

/// Load the full profile directory. Called once per session, right after
/// sign-in; the directory is small and read-only from here on.
pub async fn fetch_all(client: &PostgrestClient) -> Result<Vec<Profile>> {
    let params = vec![(
        "select".to_string(),
        "id,full_name,role,telegram_id".to_string(),
    )];
    let profiles: Vec<Profile> = client.select(TABLE, &params).await?;
    log::info!("loaded {} profiles", profiles.len());
    Ok(profiles)
}
