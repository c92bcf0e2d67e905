//! Event lifecycle service - schedule-driven activation, status reports and
//! post-event results

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, error, info};

use crate::domain::group_event::{EventPhase, GroupEvent, GroupEventId, PlatformMode};
use crate::domain::leaderboard::Ranked;
use crate::domain::user::UserId;
use crate::domain::{Clock, DomainError, StorageExt};
use crate::infrastructure::observability::record_lifecycle_transition;
use crate::infrastructure::storage::Stores;

use super::group_event_service::{event_leaderboard, EventTeamEntry};
use super::queries::{delete_event_cascade, platform_mode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionAction {
    Activated,
    Deactivated,
}

/// A state change applied by the scheduler
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LifecycleTransition {
    pub event_id: GroupEventId,
    pub event_name: String,
    pub action: TransitionAction,
}

/// How an event's stored state compares with its schedule
#[derive(Debug, Clone, Serialize)]
pub struct EventStatus {
    pub event_id: GroupEventId,
    pub event_name: String,
    pub phase: EventPhase,
    pub is_active: bool,
    pub should_be_active: bool,
    pub is_platform_active: bool,
    pub status_consistent: bool,
    pub schedule_managed: bool,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub current_time: DateTime<Utc>,
}

/// One line of the status summary
#[derive(Debug, Clone, Serialize)]
pub struct EventOverview {
    pub id: GroupEventId,
    pub name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub is_active: bool,
    pub should_be_active: bool,
}

impl EventOverview {
    fn new(event: &GroupEvent, now: DateTime<Utc>) -> Self {
        Self {
            id: event.id().clone(),
            name: event.name().to_string(),
            start_time: event.start_time(),
            end_time: event.end_time(),
            is_active: event.is_active(),
            should_be_active: event.should_be_active(now),
        }
    }
}

/// Every event grouped by phase, earliest start first
#[derive(Debug, Clone, Serialize)]
pub struct StatusSummary {
    pub current_time: DateTime<Utc>,
    pub total_events: usize,
    pub upcoming_events: Vec<EventOverview>,
    pub active_events: Vec<EventOverview>,
    pub past_events: Vec<EventOverview>,
    pub platform_mode: PlatformMode,
}

#[derive(Debug, Clone, Serialize)]
pub struct PreservedEvent {
    pub id: GroupEventId,
    pub name: String,
    pub end_time: DateTime<Utc>,
    pub challenges_count: usize,
    pub submissions_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RemovedEvent {
    pub id: GroupEventId,
    pub name: String,
    pub end_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CleanupSummary {
    pub expired_events_count: usize,
    pub data_preservation_enabled: bool,
    pub preserved_events: Vec<PreservedEvent>,
    pub removed_events: Vec<RemovedEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventStatistics {
    pub total_points_awarded: u64,
    pub total_correct_submissions: usize,
    pub total_incorrect_submissions: usize,
    pub average_team_score: f64,
}

/// Final standings and totals of an event
#[derive(Debug, Clone, Serialize)]
pub struct EventResults {
    pub event_id: GroupEventId,
    pub event_name: String,
    pub generated_at: DateTime<Utc>,
    pub challenges_count: usize,
    pub submissions_count: usize,
    pub participating_teams_count: usize,
    pub final_leaderboard: Vec<Ranked<EventTeamEntry>>,
    pub statistics: EventStatistics,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventDetails {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
    pub point_multiplier: f64,
    pub max_teams: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventHistoryEntry {
    #[serde(flatten)]
    pub results: EventResults,
    pub event_details: EventDetails,
}

/// Drives events through their schedule and reports on them
#[derive(Clone)]
pub struct EventLifecycleService {
    stores: Stores,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for EventLifecycleService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLifecycleService")
            .field("stores", &self.stores)
            .finish_non_exhaustive()
    }
}

impl EventLifecycleService {
    pub fn new(stores: Stores, clock: Arc<dyn Clock>) -> Self {
        Self { stores, clock }
    }

    pub async fn event_status(&self, event_id: &GroupEventId) -> Result<EventStatus, DomainError> {
        let event = self.stores.events.require(event_id, "Group event").await?;
        let mode = platform_mode(&self.stores).await?;
        let now = self.clock.now();
        let should_be_active = event.should_be_active(now);

        Ok(EventStatus {
            event_id: event.id().clone(),
            event_name: event.name().to_string(),
            phase: event.phase(now),
            is_active: event.is_active(),
            should_be_active,
            is_platform_active: mode.is_group_mode() && mode.is_active_event(event.id()),
            status_consistent: event.is_active() == should_be_active,
            schedule_managed: event.is_schedule_managed(),
            start_time: event.start_time(),
            end_time: event.end_time(),
            current_time: now,
        })
    }

    /// Reconcile every event with its schedule and the platform mode with the
    /// active event.
    ///
    /// Ended events are always switched off. Schedule-managed events follow
    /// their window, but never take over from a running manually-activated
    /// event; among several candidates the earliest start wins.
    pub async fn run_lifecycle(&self) -> Result<Vec<LifecycleTransition>, DomainError> {
        let _guard = self.stores.lock_writes().await;

        let now = self.clock.now();
        let mut events = self.stores.events.list().await?;
        let mut transitions = Vec::new();

        for event in events.iter_mut().filter(|e| e.is_active()) {
            let outside_window =
                event.has_ended(now) || (event.is_schedule_managed() && !event.should_be_active(now));
            if outside_window {
                event.set_active(false);
                *event = self.stores.events.update(event.clone()).await?;
                transitions.push(transition(event, TransitionAction::Deactivated));
            }
        }

        let manual_running = events
            .iter()
            .any(|e| e.is_active() && !e.is_schedule_managed());

        if !manual_running {
            let candidate = events
                .iter()
                .filter(|e| e.is_schedule_managed() && e.should_be_active(now))
                .min_by_key(|e| e.start_time())
                .map(|e| e.id().clone());

            if let Some(candidate) = candidate {
                for event in events.iter_mut() {
                    let target = event.id() == &candidate;
                    if event.is_active() == target {
                        continue;
                    }

                    event.set_active(target);
                    *event = self.stores.events.update(event.clone()).await?;
                    let action = if target {
                        TransitionAction::Activated
                    } else {
                        TransitionAction::Deactivated
                    };
                    transitions.push(transition(event, action));
                }
            }
        }

        self.sync_platform_mode(&events).await?;

        for t in &transitions {
            record_lifecycle_transition(t.action == TransitionAction::Activated);
            info!(event_id = %t.event_id, event_name = %t.event_name, action = ?t.action, "Event lifecycle transition");
        }

        Ok(transitions)
    }

    /// Points the platform mode at the active event, or back to individual mode
    async fn sync_platform_mode(&self, events: &[GroupEvent]) -> Result<(), DomainError> {
        let mut mode = platform_mode(&self.stores).await?;

        match events.iter().find(|e| e.is_active()) {
            Some(active) if !(mode.is_group_mode() && mode.is_active_event(active.id())) => {
                mode.switch_to_group(active.id().clone(), Some(active.created_by().clone()));
                self.stores.platform_mode.save(mode).await?;
            }
            None if mode.active_event_id().is_some() || mode.is_group_mode() => {
                mode.switch_to_individual(None);
                self.stores.platform_mode.save(mode).await?;
            }
            _ => {}
        }

        Ok(())
    }

    pub async fn summary(&self) -> Result<StatusSummary, DomainError> {
        let now = self.clock.now();
        let mut events = self.stores.events.list().await?;
        events.sort_by_key(|e| e.start_time());

        let mut summary = StatusSummary {
            current_time: now,
            total_events: events.len(),
            upcoming_events: Vec::new(),
            active_events: Vec::new(),
            past_events: Vec::new(),
            platform_mode: platform_mode(&self.stores).await?,
        };

        for event in &events {
            let overview = EventOverview::new(event, now);
            match event.phase(now) {
                EventPhase::Upcoming => summary.upcoming_events.push(overview),
                EventPhase::Active => summary.active_events.push(overview),
                EventPhase::Ended => summary.past_events.push(overview),
            }
        }

        Ok(summary)
    }

    /// Switch off ended events, or delete them with their data when
    /// `preserve_data` is false
    pub async fn cleanup_expired(&self, preserve_data: bool) -> Result<CleanupSummary, DomainError> {
        let _guard = self.stores.lock_writes().await;

        let now = self.clock.now();
        let expired = self
            .stores
            .events
            .find_all(move |e| e.end_time() < now)
            .await?;

        let mut summary = CleanupSummary {
            expired_events_count: expired.len(),
            data_preservation_enabled: preserve_data,
            preserved_events: Vec::new(),
            removed_events: Vec::new(),
        };

        for mut event in expired {
            if !preserve_data {
                delete_event_cascade(&self.stores, event.id()).await?;
                info!(event_id = %event.id(), "Removed expired event");
                summary.removed_events.push(RemovedEvent {
                    id: event.id().clone(),
                    name: event.name().to_string(),
                    end_time: event.end_time(),
                });
                continue;
            }

            if event.is_active() {
                event.set_active(false);
                event = self.stores.events.update(event).await?;
                info!(event_id = %event.id(), "Deactivated expired event");
            }

            let mut mode = platform_mode(&self.stores).await?;
            if mode.is_active_event(event.id()) {
                mode.switch_to_individual(None);
                self.stores.platform_mode.save(mode).await?;
            }

            let (challenges_count, submissions_count) = self.event_counts(event.id()).await?;
            summary.preserved_events.push(PreservedEvent {
                id: event.id().clone(),
                name: event.name().to_string(),
                end_time: event.end_time(),
                challenges_count,
                submissions_count,
            });
        }

        Ok(summary)
    }

    pub async fn event_results(&self, event_id: &GroupEventId) -> Result<EventResults, DomainError> {
        let event = self.stores.events.require(event_id, "Group event").await?;
        self.results_for(&event).await
    }

    /// Results of every event, latest end first
    pub async fn history(&self) -> Result<Vec<EventHistoryEntry>, DomainError> {
        let mut events = self.stores.events.list().await?;
        events.sort_by(|a, b| b.end_time().cmp(&a.end_time()));

        let mut history = Vec::with_capacity(events.len());
        for event in &events {
            history.push(EventHistoryEntry {
                results: self.results_for(event).await?,
                event_details: EventDetails {
                    start_time: event.start_time(),
                    end_time: event.end_time(),
                    created_by: event.created_by().clone(),
                    created_at: event.created_at(),
                    is_active: event.is_active(),
                    point_multiplier: event.point_multiplier(),
                    max_teams: event.max_teams(),
                },
            });
        }

        Ok(history)
    }

    async fn results_for(&self, event: &GroupEvent) -> Result<EventResults, DomainError> {
        let key = event.id().clone();
        let submissions = self
            .stores
            .group_submissions
            .find_all(move |s| s.event_id() == &key)
            .await?;
        let (challenges_count, _) = self.event_counts(event.id()).await?;

        let teams: HashSet<_> = submissions.iter().map(|s| s.team_id()).collect();
        let correct = submissions.iter().filter(|s| s.is_correct()).count();
        let total_points: u64 = submissions
            .iter()
            .filter(|s| s.is_correct())
            .map(|s| s.points_awarded())
            .sum();

        Ok(EventResults {
            event_id: event.id().clone(),
            event_name: event.name().to_string(),
            generated_at: self.clock.now(),
            challenges_count,
            submissions_count: submissions.len(),
            participating_teams_count: teams.len(),
            final_leaderboard: event_leaderboard(&self.stores, event.id(), None).await?,
            statistics: EventStatistics {
                total_points_awarded: total_points,
                total_correct_submissions: correct,
                total_incorrect_submissions: submissions.len() - correct,
                average_team_score: total_points as f64 / teams.len().max(1) as f64,
            },
        })
    }

    async fn event_counts(&self, event_id: &GroupEventId) -> Result<(usize, usize), DomainError> {
        let key = event_id.clone();
        let challenges = self
            .stores
            .group_challenges
            .find_all(move |c| c.event_id() == &key)
            .await?
            .len();
        let key = event_id.clone();
        let submissions = self
            .stores
            .group_submissions
            .find_all(move |s| s.event_id() == &key)
            .await?
            .len();
        Ok((challenges, submissions))
    }
}

fn transition(event: &GroupEvent, action: TransitionAction) -> LifecycleTransition {
    LifecycleTransition {
        event_id: event.id().clone(),
        event_name: event.name().to_string(),
        action,
    }
}

/// Runs the lifecycle on a fixed period until the task is aborted
pub fn spawn_lifecycle_task(
    service: Arc<EventLifecycleService>,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(period);

        loop {
            ticker.tick().await;

            match service.run_lifecycle().await {
                Ok(transitions) if transitions.is_empty() => debug!("Event lifecycle check: no changes"),
                Ok(transitions) => {
                    info!(count = transitions.len(), "Event lifecycle check applied transitions")
                }
                Err(e) => error!(error = %e, "Event lifecycle check failed"),
            }
        }
    })
}
