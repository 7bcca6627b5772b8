use super::profile::Profile;
use super::task::Task;

/// One comparison over task fields. The store layer renders these into its
/// query language; nothing else touches identifier strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskCondition {
    AssignerIs(i64),
    AssigneeIs(i64),
    AssigneeIn(Vec<i64>),
}

impl TaskCondition {
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            Self::AssignerIs(id) => task.assigner_telegram_id == *id,
            Self::AssigneeIs(id) => task.assignee_telegram_id == Some(*id),
            Self::AssigneeIn(ids) => task
                .assignee_telegram_id
                .is_some_and(|assignee| ids.contains(&assignee)),
        }
    }
}

/// Which tasks the signed-in user may see. `AnyOf` conditions are
/// OR-combined: any single match grants visibility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visibility {
    /// No predicate applied; every task is visible.
    Unrestricted,
    /// Visible when at least one condition matches.
    AnyOf(Vec<TaskCondition>),
    /// No task is visible. Used when the user has no chat id and no
    /// subordinates; the reference front-end showed everything in that case,
    /// which was a permission leak rather than intent.
    Nothing,
}

impl Visibility {
    pub fn admits(&self, task: &Task) -> bool {
        match self {
            Self::Unrestricted => true,
            Self::AnyOf(conditions) => conditions.iter().any(|c| c.matches(task)),
            Self::Nothing => false,
        }
    }
}

/// Builds the visibility predicate for `current` over the loaded directory.
///
/// Until the session profile resolves there is nothing to restrict on, so
/// the full list is shown; the controller refetches once it lands.
pub fn resolve_visibility(current: Option<&Profile>, directory: &[Profile]) -> Visibility {
    let Some(profile) = current else {
        return Visibility::Unrestricted;
    };

    if profile.role.is_unrestricted() {
        return Visibility::Unrestricted;
    }

    let mut conditions = Vec::new();

    if let Some(own_id) = profile.telegram_id {
        conditions.push(TaskCondition::AssignerIs(own_id));
        conditions.push(TaskCondition::AssigneeIs(own_id));
    }

    let subordinate_roles = profile.role.visible_subordinates();
    let mut subordinate_ids: Vec<i64> = directory
        .iter()
        .filter(|p| p.id != profile.id && subordinate_roles.contains(&p.role))
        .filter_map(|p| p.telegram_id)
        .collect();
    subordinate_ids.sort_unstable();
    subordinate_ids.dedup();

    if !subordinate_ids.is_empty() {
        conditions.push(TaskCondition::AssigneeIn(subordinate_ids));
    }

    if conditions.is_empty() {
        Visibility::Nothing
    } else {
        Visibility::AnyOf(conditions)
    }
}
