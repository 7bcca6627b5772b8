use uuid::Uuid;

use crate::core::visibility::{resolve_visibility, Visibility};
use crate::core::Profile;

/// Session-scoped view of who is signed in and who else exists. Populated
/// on sign-in, cleared on sign-out; owned by the caller, never a global.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    current: Option<Profile>,
    directory: Vec<Profile>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the freshly loaded directory and resolves the signed-in
    /// profile by its internal id. A missing row leaves the current profile
    /// unresolved; visibility stays unrestricted until it lands.
    pub fn sign_in(&mut self, profile_id: Uuid, directory: Vec<Profile>) {
        self.current = directory.iter().find(|p| p.id == profile_id).cloned();
        if self.current.is_none() {
            log::warn!("signed-in profile {} not present in directory", profile_id);
        }
        self.directory = directory;
    }

    pub fn sign_out(&mut self) {
        self.current = None;
        self.directory.clear();
    }

    pub fn current(&self) -> Option<&Profile> {
        self.current.as_ref()
    }

    pub fn directory(&self) -> &[Profile] {
        &self.directory
    }

    pub fn visibility(&self) -> Visibility {
        resolve_visibility(self.current.as_ref(), &self.directory)
    }

    /// Profiles the signed-in user may assign tasks to, besides themself:
    /// holders of the roles their own role maps to, reachable by chat id.
    /// No resolved profile means nobody but self.
    pub fn eligible_assignees(&self) -> Vec<&Profile> {
        let Some(current) = &self.current else {
            return Vec::new();
        };
        let allowed = current.role.assignable_roles();
        self.directory
            .iter()
            .filter(|p| p.id != current.id)
            .filter(|p| allowed.contains(&p.role))
            .filter(|p| p.telegram_id.is_some())
            .collect()
    }

    /// Case-insensitive full-name lookup among eligible assignees. Requires
    /// exactly one match; ambiguity resolves to none.
    pub fn find_assignee_by_name(&self, name: &str) -> Option<&Profile> {
        let needle = name.trim();
        if needle.is_empty() {
            return None;
        }
        let mut matches = self.eligible_assignees().into_iter().filter(|p| {
            p.full_name
                .as_deref()
                .is_some_and(|n| n.eq_ignore_ascii_case(needle))
        });
        let first = matches.next()?;
        if matches.next().is_some() {
            return None;
        }
        Some(first)
    }

    /// Name to show for a chat id: full name, else role keyword, else the
    /// raw id. A dangling task reference degrades instead of failing.
    pub fn display_name_for(&self, telegram_id: i64) -> String {
        match self
            .directory
            .iter()
            .find(|p| p.telegram_id == Some(telegram_id))
        {
            Some(profile) => profile.display_name(),
            None => telegram_id.to_string(),
        }
    }
}
