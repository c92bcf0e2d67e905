//! Group event validation
//!
//! Event rules report every problem at once so an admin can fix a form in one
//! pass; each function returns the list of messages (empty when valid).

use chrono::{DateTime, Duration, Utc};

use super::event::GroupEvent;

const MIN_EVENT_DURATION_HOURS: i64 = 1;
const MAX_START_IN_PAST_HOURS: i64 = 1;
const MAX_POINT_MULTIPLIER: f64 = 10.0;
const MAX_TEAMS_LIMIT: u32 = 1000;

/// Proposed event values, before they are applied
#[derive(Debug, Clone)]
pub struct EventDraft<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub point_multiplier: f64,
    pub max_teams: Option<u32>,
}

/// Validates an event against the other events on the calendar.
///
/// `others` must not contain the event being edited. The "start not too far in
/// the past" rule only applies when `check_past_start` is set, so an event that
/// is already running can still be edited.
pub fn validate_event_draft(
    draft: &EventDraft<'_>,
    others: &[GroupEvent],
    now: DateTime<Utc>,
    check_past_start: bool,
) -> Vec<String> {
    let mut errors = Vec::new();
    let name = draft.name.trim();

    if name.is_empty() {
        errors.push("Event name is required".to_string());
    } else if others.iter().any(|e| e.name() == name) {
        errors.push(format!("An event named '{}' already exists", name));
    }

    if draft.description.trim().is_empty() {
        errors.push("Event description is required".to_string());
    }

    if draft.start_time >= draft.end_time {
        errors.push("Start time must be before end time".to_string());
    } else if draft.end_time - draft.start_time < Duration::hours(MIN_EVENT_DURATION_HOURS) {
        errors.push("Event must last at least 1 hour".to_string());
    }

    if check_past_start && draft.start_time < now - Duration::hours(MAX_START_IN_PAST_HOURS) {
        errors.push("Start time cannot be more than 1 hour in the past".to_string());
    }

    if !draft.point_multiplier.is_finite() || draft.point_multiplier <= 0.0 {
        errors.push("Point multiplier must be greater than 0".to_string());
    } else if draft.point_multiplier > MAX_POINT_MULTIPLIER {
        errors.push(format!(
            "Point multiplier cannot exceed {:.1}",
            MAX_POINT_MULTIPLIER
        ));
    }

    match draft.max_teams {
        Some(0) => errors.push("Maximum teams must be greater than 0".to_string()),
        Some(n) if n > MAX_TEAMS_LIMIT => {
            errors.push(format!("Maximum teams cannot exceed {}", MAX_TEAMS_LIMIT))
        }
        _ => {}
    }

    if draft.start_time < draft.end_time {
        for other in others
            .iter()
            .filter(|e| e.overlaps(draft.start_time, draft.end_time))
        {
            errors.push(format!(
                "Event overlaps with existing event '{}'",
                other.name()
            ));
        }
    }

    errors
}

/// Checks whether an event can be switched on by an admin
pub fn activation_errors(
    event: &GroupEvent,
    challenge_count: usize,
    now: DateTime<Utc>,
) -> Vec<String> {
    let mut errors = Vec::new();

    if event.is_active() {
        errors.push("Event is already active".to_string());
    }

    if event.has_ended(now) {
        errors.push("Cannot activate an event that has already ended".to_string());
    }

    if challenge_count == 0 {
        errors.push("Event must have at least one challenge before activation".to_string());
    }

    errors
}

pub fn deactivation_errors(event: &GroupEvent) -> Vec<String> {
    if event.is_active() {
        Vec::new()
    } else {
        vec!["Event is not active".to_string()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::UserId;

    fn draft(start: DateTime<Utc>, hours: i64) -> EventDraft<'static> {
        EventDraft {
            name: "Spring Cup",
            description: "Team event",
            start_time: start,
            end_time: start + Duration::hours(hours),
            point_multiplier: 1.0,
            max_teams: Some(20),
        }
    }

    fn existing(name: &str, start: DateTime<Utc>, hours: i64) -> GroupEvent {
        GroupEvent::new(name, "x", start, start + Duration::hours(hours), UserId::generate())
    }

    #[test]
    fn test_valid_draft() {
        let now = Utc::now();
        assert!(validate_event_draft(&draft(now + Duration::hours(1), 3), &[], now, true).is_empty());
    }

    #[test]
    fn test_collects_every_error() {
        let now = Utc::now();
        let bad = EventDraft {
            name: " ",
            description: "",
            start_time: now + Duration::hours(2),
            end_time: now + Duration::hours(1),
            point_multiplier: 0.0,
            max_teams: Some(0),
        };

        let errors = validate_event_draft(&bad, &[], now, true);
        assert_eq!(
            errors,
            vec![
                "Event name is required",
                "Event description is required",
                "Start time must be before end time",
                "Point multiplier must be greater than 0",
                "Maximum teams must be greater than 0",
            ]
        );
    }

    #[test]
    fn test_minimum_duration() {
        let now = Utc::now();
        let mut short = draft(now + Duration::hours(1), 1);
        short.end_time = short.start_time + Duration::minutes(59);

        assert_eq!(
            validate_event_draft(&short, &[], now, true),
            vec!["Event must last at least 1 hour"]
        );
    }

    #[test]
    fn test_start_in_the_past() {
        let now = Utc::now();
        let late = draft(now - Duration::hours(2), 4);

        assert_eq!(
            validate_event_draft(&late, &[], now, true),
            vec!["Start time cannot be more than 1 hour in the past"]
        );
        assert!(validate_event_draft(&late, &[], now, false).is_empty());

        let recent = draft(now - Duration::minutes(30), 4);
        assert!(validate_event_draft(&recent, &[], now, true).is_empty());
    }

    #[test]
    fn test_multiplier_and_team_limits() {
        let now = Utc::now();
        let mut d = draft(now + Duration::hours(1), 2);
        d.point_multiplier = 10.5;
        d.max_teams = Some(1001);

        assert_eq!(
            validate_event_draft(&d, &[], now, true),
            vec![
                "Point multiplier cannot exceed 10.0",
                "Maximum teams cannot exceed 1000"
            ]
        );

        d.point_multiplier = 10.0;
        d.max_teams = None;
        assert!(validate_event_draft(&d, &[], now, true).is_empty());
    }

    #[test]
    fn test_duplicate_name_and_overlap() {
        let now = Utc::now();
        let start = now + Duration::hours(5);
        let others = vec![
            existing("Spring Cup", now + Duration::days(3), 2),
            existing("Night Op", start + Duration::hours(1), 4),
        ];

        let errors = validate_event_draft(&draft(start, 3), &others, now, true);
        assert_eq!(
            errors,
            vec![
                "An event named 'Spring Cup' already exists",
                "Event overlaps with existing event 'Night Op'",
            ]
        );
    }

    #[test]
    fn test_adjacent_events_do_not_overlap() {
        let now = Utc::now();
        let start = now + Duration::hours(5);
        let others = vec![existing("Before", start - Duration::hours(2), 2)];

        assert!(validate_event_draft(&draft(start, 3), &others, now, true).is_empty());
    }

    #[test]
    fn test_activation_errors() {
        let now = Utc::now();
        let mut event = existing("Past", now - Duration::hours(5), 2);

        assert_eq!(
            activation_errors(&event, 0, now),
            vec![
                "Cannot activate an event that has already ended",
                "Event must have at least one challenge before activation",
            ]
        );

        event.activate_manually();
        assert!(activation_errors(&event, 3, now).contains(&"Event is already active".to_string()));
        assert!(deactivation_errors(&event).is_empty());

        event.deactivate_manually();
        assert_eq!(deactivation_errors(&event), vec!["Event is not active"]);
    }

    #[test]
    fn test_upcoming_event_can_be_activated_early() {
        let now = Utc::now();
        let event = existing("Soon", now + Duration::hours(2), 2);

        assert!(activation_errors(&event, 1, now).is_empty());
    }
}
