use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Position in the management hierarchy. Stored as snake_case strings in the
/// `profiles` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    ProjectHead,
    TeamLeader,
    RegionManager,
    JuniorManager,
}

impl Role {
    pub fn as_keyword(&self) -> &'static str {
        match self {
            Self::ProjectHead => "project_head",
            Self::TeamLeader => "team_leader",
            Self::RegionManager => "region_manager",
            Self::JuniorManager => "junior_manager",
        }
    }

    pub fn from_keyword(s: &str) -> Option<Self> {
        match s {
            "project_head" => Some(Self::ProjectHead),
            "team_leader" => Some(Self::TeamLeader),
            "region_manager" => Some(Self::RegionManager),
            "junior_manager" => Some(Self::JuniorManager),
            _ => None,
        }
    }

    /// Roles whose assigned tasks are visible to a holder of `self`, on top
    /// of the holder's own tasks. The head of project is unrestricted and
    /// never consults this table.
    pub fn visible_subordinates(&self) -> &'static [Role] {
        match self {
            Self::ProjectHead => &[Role::TeamLeader, Role::RegionManager, Role::JuniorManager],
            Self::TeamLeader => &[Role::RegionManager, Role::JuniorManager],
            Self::RegionManager => &[Role::JuniorManager],
            Self::JuniorManager => &[],
        }
    }

    /// Roles a holder of `self` may assign tasks to. Self-assignment is
    /// always allowed separately.
    pub fn assignable_roles(&self) -> &'static [Role] {
        match self {
            Self::ProjectHead => &[Role::TeamLeader],
            Self::TeamLeader => &[Role::RegionManager],
            Self::RegionManager => &[Role::JuniorManager],
            Self::JuniorManager => &[],
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        matches!(self, Self::ProjectHead)
    }
}

/// A row of the `profiles` table. Created by the identity provider; this
/// crate only reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub role: Role,
    /// Chat identifier binding the profile to its messaging-bot identity.
    /// Tasks are addressed by this id, not by the profile UUID.
    pub telegram_id: Option<i64>,
}

impl Profile {
    pub fn new(role: Role) -> Self {
        Self {
            id: Uuid::new_v4(),
            full_name: None,
            role,
            telegram_id: None,
        }
    }

    /// Name shown for this profile: full name, else the role keyword.
    pub fn display_name(&self) -> String {
        match &self.full_name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => self.role.as_keyword().to_string(),
        }
    }
}
