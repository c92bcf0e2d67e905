//! Group event entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::id::entity_id;
use crate::domain::storage::StorageEntity;
use crate::domain::user::UserId;

entity_id!(
    /// Group event identifier
    GroupEventId
);

/// Where an event sits relative to its time window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventPhase {
    Upcoming,
    Active,
    Ended,
}

/// An admin-scheduled, time-boxed team competition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupEvent {
    id: GroupEventId,
    name: String,
    description: String,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    is_active: bool,
    created_by: UserId,
    point_multiplier: f64,
    max_teams: Option<u32>,
    /// Whether the lifecycle scheduler may flip `is_active` from the time window.
    /// Cleared once an admin activates or deactivates the event by hand.
    schedule_managed: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl GroupEvent {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        created_by: UserId,
    ) -> Self {
        let now = Utc::now();

        Self {
            id: GroupEventId::generate(),
            name: name.into(),
            description: description.into(),
            start_time,
            end_time,
            is_active: false,
            created_by,
            point_multiplier: 1.0,
            max_teams: None,
            schedule_managed: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_point_multiplier(mut self, multiplier: f64) -> Self {
        self.point_multiplier = multiplier;
        self
    }

    pub fn with_max_teams(mut self, max_teams: Option<u32>) -> Self {
        self.max_teams = max_teams;
        self
    }

    pub fn id(&self) -> &GroupEventId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn end_time(&self) -> DateTime<Utc> {
        self.end_time
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn created_by(&self) -> &UserId {
        &self.created_by
    }

    pub fn point_multiplier(&self) -> f64 {
        self.point_multiplier
    }

    pub fn max_teams(&self) -> Option<u32> {
        self.max_teams
    }

    pub fn is_schedule_managed(&self) -> bool {
        self.schedule_managed
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn phase(&self, now: DateTime<Utc>) -> EventPhase {
        if now < self.start_time {
            EventPhase::Upcoming
        } else if now > self.end_time {
            EventPhase::Ended
        } else {
            EventPhase::Active
        }
    }

    /// Whether `now` falls inside the event window (both ends inclusive)
    pub fn should_be_active(&self, now: DateTime<Utc>) -> bool {
        self.phase(now) == EventPhase::Active
    }

    pub fn has_ended(&self, now: DateTime<Utc>) -> bool {
        self.phase(now) == EventPhase::Ended
    }

    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        start < self.end_time && end > self.start_time
    }

    /// Activation by an admin; the scheduler stops managing this event
    pub fn activate_manually(&mut self) {
        self.is_active = true;
        self.schedule_managed = false;
        self.touch();
    }

    /// Deactivation by an admin; the scheduler stops managing this event
    pub fn deactivate_manually(&mut self) {
        self.is_active = false;
        self.schedule_managed = false;
        self.touch();
    }

    /// Activation state change driven by the schedule or by another event taking over
    pub fn set_active(&mut self, is_active: bool) {
        self.is_active = is_active;
        self.touch();
    }

    pub fn reschedule(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        point_multiplier: f64,
        max_teams: Option<u32>,
    ) {
        self.name = name.into();
        self.description = description.into();
        self.start_time = start_time;
        self.end_time = end_time;
        self.point_multiplier = point_multiplier;
        self.max_teams = max_teams;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl StorageEntity for GroupEvent {
    type Key = GroupEventId;

    fn key(&self) -> &Self::Key {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn event() -> GroupEvent {
        let start = Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap();
        GroupEvent::new("Summer Cup", "Team finals", start, start + Duration::hours(4), UserId::generate())
    }

    #[test]
    fn test_phase_boundaries_are_inclusive() {
        let event = event();

        assert_eq!(event.phase(event.start_time() - Duration::seconds(1)), EventPhase::Upcoming);
        assert_eq!(event.phase(event.start_time()), EventPhase::Active);
        assert_eq!(event.phase(event.end_time()), EventPhase::Active);
        assert_eq!(event.phase(event.end_time() + Duration::seconds(1)), EventPhase::Ended);
    }

    #[test]
    fn test_overlaps() {
        let event = event();
        let start = event.start_time();
        let end = event.end_time();

        assert!(event.overlaps(start + Duration::hours(1), end + Duration::hours(1)));
        assert!(event.overlaps(start - Duration::hours(1), start + Duration::minutes(1)));
        assert!(!event.overlaps(end, end + Duration::hours(2)));
        assert!(!event.overlaps(start - Duration::hours(2), start));
    }

    #[test]
    fn test_manual_activation_leaves_schedule() {
        let mut event = event();
        assert!(event.is_schedule_managed());
        assert!(!event.is_active());

        event.activate_manually();
        assert!(event.is_active());
        assert!(!event.is_schedule_managed());

        event.set_active(false);
        assert!(!event.is_active());
        assert!(!event.is_schedule_managed());
    }
}
