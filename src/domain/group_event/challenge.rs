//! Event-scoped challenges and submissions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::event::GroupEventId;
use super::scoring::calculate_points;
use crate::domain::challenge::{Category, Difficulty, HashedFlag};
use crate::domain::id::entity_id;
use crate::domain::storage::StorageEntity;
use crate::domain::team::TeamId;
use crate::domain::user::UserId;

entity_id!(
    /// Group challenge identifier
    GroupChallengeId
);

entity_id!(
    /// Group submission identifier
    GroupSubmissionId
);

pub const DEFAULT_MAX_ATTEMPTS_PER_TEAM: u32 = 10;

/// A challenge that only exists inside one group event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupChallenge {
    id: GroupChallengeId,
    event_id: GroupEventId,
    title: String,
    description: String,
    points: u32,
    flag: HashedFlag,
    category: Category,
    difficulty: Difficulty,
    requires_collaboration: bool,
    max_attempts_per_team: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl GroupChallenge {
    pub fn new(
        event_id: GroupEventId,
        title: impl Into<String>,
        description: impl Into<String>,
        category: Category,
        difficulty: Difficulty,
        points: u32,
        flag: &str,
    ) -> Self {
        let now = Utc::now();

        Self {
            id: GroupChallengeId::generate(),
            event_id,
            title: title.into(),
            description: description.into(),
            points,
            flag: HashedFlag::from_plain(flag),
            category,
            difficulty,
            requires_collaboration: true,
            max_attempts_per_team: DEFAULT_MAX_ATTEMPTS_PER_TEAM,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts_per_team = max_attempts;
        self
    }

    pub fn with_requires_collaboration(mut self, requires: bool) -> Self {
        self.requires_collaboration = requires;
        self
    }

    pub fn id(&self) -> &GroupChallengeId {
        &self.id
    }

    pub fn event_id(&self) -> &GroupEventId {
        &self.event_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn points(&self) -> u32 {
        self.points
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn requires_collaboration(&self) -> bool {
        self.requires_collaboration
    }

    pub fn max_attempts_per_team(&self) -> u32 {
        self.max_attempts_per_team
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn check_flag(&self, submitted: &str) -> bool {
        self.flag.matches(submitted)
    }

    /// Points awarded under the given event multiplier
    pub fn effective_points(&self, multiplier: f64) -> u64 {
        calculate_points(self.points, multiplier)
    }

    pub fn catalog_key(&self) -> (Difficulty, u32) {
        (self.difficulty, self.points)
    }

    pub fn set_content(
        &mut self,
        title: impl Into<String>,
        description: impl Into<String>,
        category: Category,
        difficulty: Difficulty,
    ) {
        self.title = title.into();
        self.description = description.into();
        self.category = category;
        self.difficulty = difficulty;
        self.touch();
    }

    pub fn set_points(&mut self, points: u32) {
        self.points = points;
        self.touch();
    }

    pub fn set_flag(&mut self, flag: &str) {
        self.flag = HashedFlag::from_plain(flag);
        self.touch();
    }

    pub fn set_rules(&mut self, max_attempts_per_team: u32, requires_collaboration: bool) {
        self.max_attempts_per_team = max_attempts_per_team;
        self.requires_collaboration = requires_collaboration;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl StorageEntity for GroupChallenge {
    type Key = GroupChallengeId;

    fn key(&self) -> &Self::Key {
        &self.id
    }
}

/// One team attempt at a group challenge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupSubmission {
    id: GroupSubmissionId,
    event_id: GroupEventId,
    challenge_id: GroupChallengeId,
    team_id: TeamId,
    submitted_by: UserId,
    is_correct: bool,
    points_awarded: u64,
    submitted_at: DateTime<Utc>,
}

impl GroupSubmission {
    pub fn new(
        challenge: &GroupChallenge,
        team_id: TeamId,
        submitted_by: UserId,
        is_correct: bool,
        points_awarded: u64,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: GroupSubmissionId::generate(),
            event_id: challenge.event_id().clone(),
            challenge_id: challenge.id().clone(),
            team_id,
            submitted_by,
            is_correct,
            points_awarded: if is_correct { points_awarded } else { 0 },
            submitted_at,
        }
    }

    pub fn id(&self) -> &GroupSubmissionId {
        &self.id
    }

    pub fn event_id(&self) -> &GroupEventId {
        &self.event_id
    }

    pub fn challenge_id(&self) -> &GroupChallengeId {
        &self.challenge_id
    }

    pub fn team_id(&self) -> &TeamId {
        &self.team_id
    }

    pub fn submitted_by(&self) -> &UserId {
        &self.submitted_by
    }

    pub fn is_correct(&self) -> bool {
        self.is_correct
    }

    pub fn points_awarded(&self) -> u64 {
        self.points_awarded
    }

    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }
}

impl StorageEntity for GroupSubmission {
    type Key = GroupSubmissionId;

    fn key(&self) -> &Self::Key {
        &self.id
    }
}
