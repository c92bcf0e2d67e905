//! Platform-wide competition mode

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::event::GroupEventId;
use crate::domain::id::entity_id;
use crate::domain::storage::StorageEntity;
use crate::domain::user::UserId;

entity_id!(
    /// Key of the platform mode record; only one value is ever used
    PlatformModeId
);

const SINGLETON_KEY: &str = "platform";

impl PlatformModeId {
    pub fn singleton() -> Self {
        Self(SINGLETON_KEY.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CompetitionMode {
    #[default]
    Individual,
    Group,
}

/// Singleton switch between individual and group competition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformMode {
    id: PlatformModeId,
    mode: CompetitionMode,
    active_event_id: Option<GroupEventId>,
    changed_at: DateTime<Utc>,
    changed_by: Option<UserId>,
}

impl Default for PlatformMode {
    fn default() -> Self {
        Self {
            id: PlatformModeId::singleton(),
            mode: CompetitionMode::Individual,
            active_event_id: None,
            changed_at: Utc::now(),
            changed_by: None,
        }
    }
}

impl PlatformMode {
    pub fn id(&self) -> &PlatformModeId {
        &self.id
    }

    pub fn mode(&self) -> CompetitionMode {
        self.mode
    }

    pub fn active_event_id(&self) -> Option<&GroupEventId> {
        self.active_event_id.as_ref()
    }

    pub fn changed_at(&self) -> DateTime<Utc> {
        self.changed_at
    }

    pub fn changed_by(&self) -> Option<&UserId> {
        self.changed_by.as_ref()
    }

    pub fn is_group_mode(&self) -> bool {
        self.mode == CompetitionMode::Group && self.active_event_id.is_some()
    }

    pub fn is_active_event(&self, event_id: &GroupEventId) -> bool {
        self.active_event_id.as_ref() == Some(event_id)
    }

    /// Switches to group mode; `changed_by` is `None` for scheduled changes
    pub fn switch_to_group(&mut self, event_id: GroupEventId, changed_by: Option<UserId>) {
        self.mode = CompetitionMode::Group;
        self.active_event_id = Some(event_id);
        self.changed_by = changed_by;
        self.changed_at = Utc::now();
    }

    pub fn switch_to_individual(&mut self, changed_by: Option<UserId>) {
        self.mode = CompetitionMode::Individual;
        self.active_event_id = None;
        self.changed_by = changed_by;
        self.changed_at = Utc::now();
    }
}

impl StorageEntity for PlatformMode {
    type Key = PlatformModeId;

    fn key(&self) -> &Self::Key {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_individual() {
        let mode = PlatformMode::default();

        assert_eq!(mode.mode(), CompetitionMode::Individual);
        assert!(!mode.is_group_mode());
        assert_eq!(mode.id().as_str(), "platform");
    }

    #[test]
    fn test_switching() {
        let mut mode = PlatformMode::default();
        let event_id = GroupEventId::generate();
        let admin = UserId::generate();

        mode.switch_to_group(event_id.clone(), Some(admin.clone()));
        assert!(mode.is_group_mode());
        assert!(mode.is_active_event(&event_id));
        assert_eq!(mode.changed_by(), Some(&admin));

        mode.switch_to_individual(None);
        assert_eq!(mode.mode(), CompetitionMode::Individual);
        assert!(mode.active_event_id().is_none());
        assert!(mode.changed_by().is_none());
    }
}
