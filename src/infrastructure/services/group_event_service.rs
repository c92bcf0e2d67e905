//! Group event service - event administration, access control and team scoring
//!
//! At most one event is active at a time. Activating an event switches the
//! platform mode singleton to group mode; deactivating the platform's event
//! switches it back to individual mode.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::domain::challenge::{
    validate_description, validate_flag, validate_points, validate_title, Category, Difficulty,
};
use crate::domain::group_event::{
    activation_errors, attempt_summary, challenge_stats, deactivation_errors, evaluate_access,
    event_standings, validate_event_draft, AccessContext, ChallengeStats, CompetitionMode,
    EventDraft, EventPhase, GroupAccessDenial, GroupChallenge, GroupChallengeId, GroupEvent,
    GroupEventId, GroupSubmission, PlatformMode, TeamSnapshot,
};
use crate::domain::leaderboard::{rank, Ranked, Standing};
use crate::domain::team::{Team, TeamId};
use crate::domain::user::UserId;
use crate::domain::{Clock, DomainError, StorageExt};
use crate::infrastructure::observability::{record_flag_submission, SubmissionKind};
use crate::infrastructure::storage::Stores;

use super::queries::{current_team, delete_event_cascade, platform_mode};

/// Request to schedule an event
#[derive(Debug, Clone)]
pub struct CreateEventRequest {
    pub name: String,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub point_multiplier: Option<f64>,
    pub max_teams: Option<u32>,
}

/// Request to edit an event; `None` leaves a field unchanged
#[derive(Debug, Clone, Default)]
pub struct UpdateEventRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub point_multiplier: Option<f64>,
    /// `Some(None)` clears the team cap
    pub max_teams: Option<Option<u32>>,
}

/// Request to add a challenge to an event
#[derive(Debug, Clone)]
pub struct CreateGroupChallengeRequest {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub difficulty: Difficulty,
    pub points: u32,
    pub flag: String,
    pub max_attempts_per_team: Option<u32>,
    pub requires_collaboration: Option<bool>,
}

/// Request to edit a group challenge; `None` leaves a field unchanged
#[derive(Debug, Clone, Default)]
pub struct UpdateGroupChallengeRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub difficulty: Option<Difficulty>,
    pub points: Option<u32>,
    pub flag: Option<String>,
    pub max_attempts_per_team: Option<u32>,
    pub requires_collaboration: Option<bool>,
}

/// A team that passed every access check, with the event it plays in
#[derive(Debug, Clone)]
pub struct GroupAccess {
    pub team: Team,
    pub member_count: usize,
    pub event: GroupEvent,
}

/// Access decision as reported to the caller
#[derive(Debug, Clone, Serialize)]
pub struct AccessReport {
    pub has_access: bool,
    pub message: Option<String>,
    pub denial: Option<GroupAccessDenial>,
}

impl AccessReport {
    fn from_result(result: &Result<(), GroupAccessDenial>) -> Self {
        match result {
            Ok(()) => Self {
                has_access: true,
                message: None,
                denial: None,
            },
            Err(denial) => Self {
                has_access: false,
                message: Some(denial.to_string()),
                denial: Some(denial.clone()),
            },
        }
    }
}

/// Platform mode and the caller's standing towards it
#[derive(Debug, Clone, Serialize)]
pub struct GroupStatus {
    pub mode: CompetitionMode,
    pub changed_at: DateTime<Utc>,
    pub active_event: Option<GroupEvent>,
    pub access: AccessReport,
}

/// Outcome of a group flag submission
#[derive(Debug, Clone, Serialize)]
pub struct GroupFlagResult {
    pub correct: bool,
    pub message: String,
    pub points_awarded: u64,
    pub attempts_used: u32,
    pub attempts_remaining: u32,
}

/// A group challenge from one team's point of view
#[derive(Debug, Clone)]
pub struct TeamChallengeView {
    pub challenge: GroupChallenge,
    pub solved: bool,
    pub attempts_used: u32,
    pub attempts_remaining: u32,
    pub effective_points: u64,
}

/// A team on an event leaderboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventTeamEntry {
    pub team_id: TeamId,
    pub name: String,
}

/// A team's position within an event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamRanking {
    pub rank: Option<usize>,
    pub total_teams: usize,
    pub score: u64,
    pub challenges_solved: u32,
}

/// Counts describing one event
#[derive(Debug, Clone, Serialize)]
pub struct EventInfo {
    pub event: GroupEvent,
    pub phase: EventPhase,
    pub challenge_count: usize,
    pub team_count: usize,
    pub submission_count: usize,
}

/// Group event service for administrators and competing teams
#[derive(Clone)]
pub struct GroupEventService {
    stores: Stores,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for GroupEventService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupEventService")
            .field("stores", &self.stores)
            .finish_non_exhaustive()
    }
}

impl GroupEventService {
    pub fn new(stores: Stores, clock: Arc<dyn Clock>) -> Self {
        Self { stores, clock }
    }

    /// Schedule a new event; every rule violation is reported at once
    pub async fn create_event(
        &self,
        admin_id: &UserId,
        request: CreateEventRequest,
    ) -> Result<GroupEvent, DomainError> {
        let _guard = self.stores.lock_writes().await;

        let multiplier = request.point_multiplier.unwrap_or(1.0);
        let draft = EventDraft {
            name: &request.name,
            description: &request.description,
            start_time: request.start_time,
            end_time: request.end_time,
            point_multiplier: multiplier,
            max_teams: request.max_teams,
        };

        let others = self.stores.events.list().await?;
        let errors = validate_event_draft(&draft, &others, self.clock.now(), true);
        if !errors.is_empty() {
            return Err(DomainError::validation_list(&errors));
        }

        let event = GroupEvent::new(
            request.name.trim(),
            request.description.trim(),
            request.start_time,
            request.end_time,
            admin_id.clone(),
        )
        .with_point_multiplier(multiplier)
        .with_max_teams(request.max_teams);

        info!(event_id = %event.id(), name = %event.name(), "Creating group event");
        self.stores.events.create(event).await
    }

    /// Edit an event, re-validating it against every other event
    pub async fn update_event(
        &self,
        event_id: &GroupEventId,
        request: UpdateEventRequest,
    ) -> Result<GroupEvent, DomainError> {
        let _guard = self.stores.lock_writes().await;

        let mut event = self.stores.events.require(event_id, "Group event").await?;

        let name = request.name.unwrap_or_else(|| event.name().to_string());
        let description = request
            .description
            .unwrap_or_else(|| event.description().to_string());
        let start_time = request.start_time.unwrap_or(event.start_time());
        let end_time = request.end_time.unwrap_or(event.end_time());
        let multiplier = request
            .point_multiplier
            .unwrap_or(event.point_multiplier());
        let max_teams = request.max_teams.unwrap_or(event.max_teams());

        let draft = EventDraft {
            name: &name,
            description: &description,
            start_time,
            end_time,
            point_multiplier: multiplier,
            max_teams,
        };

        let key = event_id.clone();
        let others = self.stores.events.find_all(move |e| e.id() != &key).await?;
        let start_changed = start_time != event.start_time();
        let errors = validate_event_draft(&draft, &others, self.clock.now(), start_changed);
        if !errors.is_empty() {
            return Err(DomainError::validation_list(&errors));
        }

        event.reschedule(
            name.trim(),
            description.trim(),
            start_time,
            end_time,
            multiplier,
            max_teams,
        );

        info!(event_id = %event_id, "Updating group event");
        self.stores.events.update(event).await
    }

    /// Delete an event with its challenges and submissions
    pub async fn delete_event(&self, event_id: &GroupEventId) -> Result<(), DomainError> {
        let _guard = self.stores.lock_writes().await;

        if !delete_event_cascade(&self.stores, event_id).await? {
            return Err(DomainError::not_found(format!(
                "Group event '{}' not found",
                event_id
            )));
        }

        info!(event_id = %event_id, "Deleted group event");
        Ok(())
    }

    /// Every event, earliest start first
    pub async fn list_events(&self) -> Result<Vec<GroupEvent>, DomainError> {
        let mut events = self.stores.events.list().await?;
        events.sort_by_key(|e| e.start_time());
        Ok(events)
    }

    pub async fn get_event(&self, event_id: &GroupEventId) -> Result<GroupEvent, DomainError> {
        self.stores.events.require(event_id, "Group event").await
    }

    pub async fn create_challenge(
        &self,
        event_id: &GroupEventId,
        request: CreateGroupChallengeRequest,
    ) -> Result<GroupChallenge, DomainError> {
        self.get_event(event_id).await?;

        let max_attempts = request.max_attempts_per_team;
        let errors = challenge_errors(
            Some(&request.title),
            Some(&request.description),
            Some(&request.flag),
            Some(request.points),
            max_attempts,
        );
        if !errors.is_empty() {
            return Err(DomainError::validation_list(&errors));
        }

        let mut challenge = GroupChallenge::new(
            event_id.clone(),
            request.title.trim(),
            request.description,
            request.category,
            request.difficulty,
            request.points,
            request.flag.trim(),
        );
        if let Some(max_attempts) = max_attempts {
            challenge = challenge.with_max_attempts(max_attempts);
        }
        if let Some(requires) = request.requires_collaboration {
            challenge = challenge.with_requires_collaboration(requires);
        }

        info!(challenge_id = %challenge.id(), event_id = %event_id, "Creating group challenge");
        self.stores.group_challenges.create(challenge).await
    }

    pub async fn update_challenge(
        &self,
        challenge_id: &GroupChallengeId,
        request: UpdateGroupChallengeRequest,
    ) -> Result<GroupChallenge, DomainError> {
        let mut challenge = self.get_challenge(challenge_id).await?;

        let errors = challenge_errors(
            request.title.as_deref(),
            request.description.as_deref(),
            request.flag.as_deref(),
            request.points,
            request.max_attempts_per_team,
        );
        if !errors.is_empty() {
            return Err(DomainError::validation_list(&errors));
        }

        let title = request
            .title
            .map(|t| t.trim().to_string())
            .unwrap_or_else(|| challenge.title().to_string());
        let description = request
            .description
            .unwrap_or_else(|| challenge.description().to_string());
        challenge.set_content(
            title,
            description,
            request.category.unwrap_or(challenge.category()),
            request.difficulty.unwrap_or(challenge.difficulty()),
        );

        if let Some(points) = request.points {
            challenge.set_points(points);
        }
        if let Some(flag) = request.flag {
            challenge.set_flag(flag.trim());
        }
        challenge.set_rules(
            request
                .max_attempts_per_team
                .unwrap_or(challenge.max_attempts_per_team()),
            request
                .requires_collaboration
                .unwrap_or(challenge.requires_collaboration()),
        );

        info!(challenge_id = %challenge_id, "Updating group challenge");
        self.stores.group_challenges.update(challenge).await
    }

    /// Delete a group challenge together with its submissions
    pub async fn delete_challenge(&self, challenge_id: &GroupChallengeId) -> Result<(), DomainError> {
        let _guard = self.stores.lock_writes().await;

        if !self.stores.group_challenges.delete(challenge_id).await? {
            return Err(DomainError::not_found(format!(
                "Group challenge '{}' not found",
                challenge_id
            )));
        }

        let key = challenge_id.clone();
        for submission in self
            .stores
            .group_submissions
            .find_all(move |s| s.challenge_id() == &key)
            .await?
        {
            self.stores.group_submissions.delete(submission.id()).await?;
        }

        info!(challenge_id = %challenge_id, "Deleted group challenge");
        Ok(())
    }

    pub async fn get_challenge(
        &self,
        challenge_id: &GroupChallengeId,
    ) -> Result<GroupChallenge, DomainError> {
        self.stores
            .group_challenges
            .require(challenge_id, "Group challenge")
            .await
    }

    /// Challenges of an event in catalog order
    pub async fn list_challenges(
        &self,
        event_id: &GroupEventId,
    ) -> Result<Vec<GroupChallenge>, DomainError> {
        let key = event_id.clone();
        let mut challenges = self
            .stores
            .group_challenges
            .find_all(move |c| c.event_id() == &key)
            .await?;
        challenges.sort_by_key(|c| c.catalog_key());
        Ok(challenges)
    }

    /// Switch an event on; every other event is switched off and the platform
    /// enters group mode. The scheduler no longer manages the event.
    pub async fn activate(
        &self,
        admin_id: &UserId,
        event_id: &GroupEventId,
    ) -> Result<GroupEvent, DomainError> {
        let _guard = self.stores.lock_writes().await;

        let mut event = self.get_event(event_id).await?;
        let challenge_count = self.list_challenges(event_id).await?.len();

        let errors = activation_errors(&event, challenge_count, self.clock.now());
        if !errors.is_empty() {
            return Err(DomainError::validation_list(&errors));
        }

        let key = event_id.clone();
        for mut other in self
            .stores
            .events
            .find_all(move |e| e.is_active() && e.id() != &key)
            .await?
        {
            info!(event_id = %other.id(), "Deactivating event superseded by activation");
            other.set_active(false);
            self.stores.events.update(other).await?;
        }

        event.activate_manually();
        let event = self.stores.events.update(event).await?;

        let mut mode = platform_mode(&self.stores).await?;
        mode.switch_to_group(event_id.clone(), Some(admin_id.clone()));
        self.stores.platform_mode.save(mode).await?;

        info!(event_id = %event_id, admin_id = %admin_id, "Group event activated");
        Ok(event)
    }

    /// Switch an event off; the platform returns to individual mode if this
    /// was its event. The scheduler no longer manages the event.
    pub async fn deactivate(
        &self,
        admin_id: &UserId,
        event_id: &GroupEventId,
    ) -> Result<GroupEvent, DomainError> {
        let _guard = self.stores.lock_writes().await;

        let mut event = self.get_event(event_id).await?;
        let errors = deactivation_errors(&event);
        if !errors.is_empty() {
            return Err(DomainError::validation_list(&errors));
        }

        event.deactivate_manually();
        let event = self.stores.events.update(event).await?;

        let mut mode = platform_mode(&self.stores).await?;
        if mode.is_active_event(event_id) {
            mode.switch_to_individual(Some(admin_id.clone()));
            self.stores.platform_mode.save(mode).await?;
        }

        info!(event_id = %event_id, admin_id = %admin_id, "Group event deactivated");
        Ok(event)
    }

    pub async fn platform_mode(&self) -> Result<PlatformMode, DomainError> {
        platform_mode(&self.stores).await
    }

    /// The event currently driving group mode, if any
    pub async fn active_event(&self) -> Result<Option<GroupEvent>, DomainError> {
        let mode = platform_mode(&self.stores).await?;
        match mode.active_event_id() {
            Some(event_id) => Ok(self
                .stores
                .events
                .get(event_id)
                .await?
                .filter(|e| e.is_active())),
            None => Ok(None),
        }
    }

    /// Evaluate the access rules for a caller; `None` is an anonymous caller
    pub async fn check_access(&self, user_id: Option<&UserId>) -> Result<AccessReport, DomainError> {
        let (_, result) = self.evaluate(user_id).await?;
        Ok(AccessReport::from_result(&result))
    }

    /// The caller's team and the running event, or the first failed access rule
    pub async fn require_access(&self, user_id: &UserId) -> Result<GroupAccess, DomainError> {
        let (snapshot, result) = self.evaluate(Some(user_id)).await?;
        result?;

        match snapshot {
            AccessSnapshot {
                team: Some((team, member_count)),
                event: Some(event),
                ..
            } => Ok(GroupAccess {
                team,
                member_count,
                event,
            }),
            _ => Err(GroupAccessDenial::NoActiveEvent.into()),
        }
    }

    pub async fn status(&self, user_id: Option<&UserId>) -> Result<GroupStatus, DomainError> {
        let (snapshot, result) = self.evaluate(user_id).await?;

        Ok(GroupStatus {
            mode: snapshot.mode.mode(),
            changed_at: snapshot.mode.changed_at(),
            active_event: snapshot.event.filter(|e| e.is_active()),
            access: AccessReport::from_result(&result),
        })
    }

    /// Submit a flag for the caller's team
    pub async fn submit_flag(
        &self,
        user_id: &UserId,
        challenge_id: &GroupChallengeId,
        flag: &str,
    ) -> Result<GroupFlagResult, DomainError> {
        let _guard = self.stores.lock_writes().await;

        let GroupAccess {
            mut team, event, ..
        } = self.require_access(user_id).await?;

        let challenge = self.get_challenge(challenge_id).await?;
        if challenge.event_id() != event.id() {
            return Err(DomainError::validation(
                "This challenge is not part of the active group event",
            ));
        }

        let submissions = self.event_submissions(event.id()).await?;

        if let Some(max_teams) = event.max_teams() {
            let participating: HashSet<&TeamId> = submissions.iter().map(|s| s.team_id()).collect();
            if !participating.contains(team.id()) && participating.len() >= max_teams as usize {
                return Err(DomainError::validation(format!(
                    "This event has reached its maximum of {} teams",
                    max_teams
                )));
            }
        }

        let flag = flag.trim();
        if flag.is_empty() {
            return Err(DomainError::validation("Flag is required"));
        }

        let summary = attempt_summary(challenge_id, team.id(), &submissions);
        if summary.solved {
            return Err(DomainError::conflict("Challenge already solved by your team"));
        }
        let max_attempts = challenge.max_attempts_per_team();
        if summary.attempts >= max_attempts {
            return Err(DomainError::validation(format!(
                "Maximum attempts ({}) exceeded for this challenge",
                max_attempts
            )));
        }

        let now = self.clock.now();
        let correct = challenge.check_flag(flag);
        let points = if correct {
            challenge.effective_points(event.point_multiplier())
        } else {
            0
        };
        record_flag_submission(SubmissionKind::Group, correct);

        self.stores
            .group_submissions
            .create(GroupSubmission::new(
                &challenge,
                team.id().clone(),
                user_id.clone(),
                correct,
                points,
                now,
            ))
            .await?;

        let attempts_used = summary.attempts + 1;
        let attempts_remaining = max_attempts.saturating_sub(attempts_used);

        if !correct {
            info!(team_id = %team.id(), challenge_id = %challenge_id, "Incorrect group flag");
            return Ok(GroupFlagResult {
                correct: false,
                message: "Incorrect flag. Try again!".to_string(),
                points_awarded: 0,
                attempts_used,
                attempts_remaining,
            });
        }

        team.credit_solve(points, now);
        let team_id = team.id().clone();
        self.stores.teams.update(team).await?;

        info!(team_id = %team_id, challenge_id = %challenge_id, points, "Group challenge solved");
        Ok(GroupFlagResult {
            correct: true,
            message: "Correct! Well done!".to_string(),
            points_awarded: points,
            attempts_used,
            attempts_remaining,
        })
    }

    /// The running event's challenges as the caller's team sees them
    pub async fn team_challenges(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<TeamChallengeView>, DomainError> {
        let access = self.require_access(user_id).await?;
        let submissions = self.event_submissions(access.event.id()).await?;

        Ok(self
            .list_challenges(access.event.id())
            .await?
            .into_iter()
            .map(|challenge| {
                let summary = attempt_summary(challenge.id(), access.team.id(), &submissions);
                TeamChallengeView {
                    solved: summary.solved,
                    attempts_used: summary.attempts,
                    attempts_remaining: challenge
                        .max_attempts_per_team()
                        .saturating_sub(summary.attempts),
                    effective_points: challenge
                        .effective_points(access.event.point_multiplier()),
                    challenge,
                }
            })
            .collect())
    }

    /// The caller's team submissions in the running event, newest first
    pub async fn team_submissions(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<GroupSubmission>, DomainError> {
        let access = self.require_access(user_id).await?;

        let mut submissions: Vec<GroupSubmission> = self
            .event_submissions(access.event.id())
            .await?
            .into_iter()
            .filter(|s| s.team_id() == access.team.id())
            .collect();
        submissions.sort_by(|a, b| b.submitted_at().cmp(&a.submitted_at()));
        Ok(submissions)
    }

    /// Leaderboard of an event; without an id, of the running event
    pub async fn leaderboard(
        &self,
        event_id: Option<&GroupEventId>,
        limit: Option<usize>,
    ) -> Result<Vec<Ranked<EventTeamEntry>>, DomainError> {
        let event_id = match event_id {
            Some(event_id) => event_id.clone(),
            None => match self.active_event().await? {
                Some(event) => event.id().clone(),
                None => return Ok(Vec::new()),
            },
        };

        event_leaderboard(&self.stores, &event_id, limit).await
    }

    /// Where the caller's team stands in the running event
    pub async fn team_ranking(&self, user_id: &UserId) -> Result<TeamRanking, DomainError> {
        let (team, _) = current_team(&self.stores, user_id)
            .await?
            .ok_or(GroupAccessDenial::NotInTeam)?;

        let board = self.leaderboard(None, None).await?;
        let entry = board
            .iter()
            .find(|r| &r.standing.competitor.team_id == team.id());

        Ok(TeamRanking {
            rank: entry.map(|r| r.rank),
            total_teams: board.len(),
            score: entry.map(|r| r.standing.score).unwrap_or(0),
            challenges_solved: entry.map(|r| r.standing.challenges_solved).unwrap_or(0),
        })
    }

    pub async fn challenge_stats(
        &self,
        challenge_id: &GroupChallengeId,
    ) -> Result<ChallengeStats, DomainError> {
        let challenge = self.get_challenge(challenge_id).await?;
        let submissions = self.event_submissions(challenge.event_id()).await?;
        Ok(challenge_stats(challenge_id, &submissions))
    }

    pub async fn event_info(&self, event_id: &GroupEventId) -> Result<EventInfo, DomainError> {
        let event = self.get_event(event_id).await?;
        let challenge_count = self.list_challenges(event_id).await?.len();
        let submissions = self.event_submissions(event_id).await?;
        let team_count = submissions
            .iter()
            .map(|s| s.team_id())
            .collect::<HashSet<_>>()
            .len();

        Ok(EventInfo {
            phase: event.phase(self.clock.now()),
            event,
            challenge_count,
            team_count,
            submission_count: submissions.len(),
        })
    }

    async fn event_submissions(
        &self,
        event_id: &GroupEventId,
    ) -> Result<Vec<GroupSubmission>, DomainError> {
        let key = event_id.clone();
        self.stores
            .group_submissions
            .find_all(move |s| s.event_id() == &key)
            .await
    }

    async fn evaluate(
        &self,
        user_id: Option<&UserId>,
    ) -> Result<(AccessSnapshot, Result<(), GroupAccessDenial>), DomainError> {
        let mode = platform_mode(&self.stores).await?;
        let event = match mode.active_event_id() {
            Some(event_id) => self.stores.events.get(event_id).await?,
            None => None,
        };
        let team = match user_id {
            Some(user_id) => current_team(&self.stores, user_id).await?,
            None => None,
        };

        let snapshot = AccessSnapshot { mode, event, team };
        let result = evaluate_access(&AccessContext {
            authenticated: user_id.is_some(),
            team: snapshot.team.as_ref().map(|(team, member_count)| TeamSnapshot {
                team,
                member_count: *member_count,
            }),
            platform_mode: &snapshot.mode,
            active_event: snapshot.event.as_ref(),
        });

        Ok((snapshot, result))
    }
}

/// Everything loaded to evaluate access
#[derive(Debug)]
struct AccessSnapshot {
    mode: PlatformMode,
    event: Option<GroupEvent>,
    team: Option<(Team, usize)>,
}

/// Ranks the teams that submitted in an event
pub(crate) async fn event_leaderboard(
    stores: &Stores,
    event_id: &GroupEventId,
    limit: Option<usize>,
) -> Result<Vec<Ranked<EventTeamEntry>>, DomainError> {
    let key = event_id.clone();
    let submissions = stores
        .group_submissions
        .find_all(move |s| s.event_id() == &key)
        .await?;

    let names: HashMap<TeamId, String> = stores
        .teams
        .list()
        .await?
        .into_iter()
        .map(|t| (t.id().clone(), t.name().to_string()))
        .collect();

    let standings = event_standings(&submissions)
        .into_iter()
        .map(|standing| Standing {
            competitor: EventTeamEntry {
                name: names.get(&standing.competitor).cloned().unwrap_or_default(),
                team_id: standing.competitor,
            },
            score: standing.score,
            challenges_solved: standing.challenges_solved,
            last_submission: standing.last_submission,
        })
        .collect();

    Ok(rank(standings, limit))
}

fn challenge_errors(
    title: Option<&str>,
    description: Option<&str>,
    flag: Option<&str>,
    points: Option<u32>,
    max_attempts: Option<u32>,
) -> Vec<String> {
    let mut errors = Vec::new();

    if let Some(Err(e)) = title.map(|t| validate_title(t.trim())) {
        errors.push(e.to_string());
    }
    if let Some(Err(e)) = description.map(validate_description) {
        errors.push(e.to_string());
    }
    if let Some(Err(e)) = flag.map(validate_flag) {
        errors.push(e.to_string());
    }
    if let Some(Err(e)) = points.map(validate_points) {
        errors.push(e.to_string());
    }
    if max_attempts == Some(0) {
        errors.push("Maximum attempts per team must be at least 1".to_string());
    }

    errors
}
