//! Response shapes for entities whose stored form carries secrets

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::challenge::{Category, Challenge, ChallengeType, Difficulty};
use crate::domain::group_event::GroupChallenge;
use crate::domain::user::{PersonalDetails, Profile, User, UserRole, UserStatus};

/// User as exposed over the API (no password hash)
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub status: UserStatus,
    #[serde(flatten)]
    pub details: PersonalDetails,
    #[serde(flatten)]
    pub profile: Profile,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().to_string(),
            username: user.username().to_string(),
            email: user.email().to_string(),
            first_name: user.first_name().to_string(),
            last_name: user.last_name().to_string(),
            role: user.role(),
            status: user.status(),
            details: user.details().clone(),
            profile: user.profile().clone(),
            created_at: user.created_at(),
            last_login_at: user.last_login_at(),
        }
    }
}

/// Challenge without its flag hash
#[derive(Debug, Clone, Serialize)]
pub struct ChallengeResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub difficulty: Difficulty,
    pub points: u32,
    pub is_active: bool,
    pub challenge_type: ChallengeType,
    pub min_team_size: u32,
    pub max_team_size: u32,
    pub team_points_multiplier: f64,
    pub team_points: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Challenge> for ChallengeResponse {
    fn from(challenge: &Challenge) -> Self {
        Self {
            id: challenge.id().to_string(),
            title: challenge.title().to_string(),
            description: challenge.description().to_string(),
            category: challenge.category(),
            difficulty: challenge.difficulty(),
            points: challenge.points(),
            is_active: challenge.is_active(),
            challenge_type: challenge.challenge_type(),
            min_team_size: challenge.min_team_size(),
            max_team_size: challenge.max_team_size(),
            team_points_multiplier: challenge.team_points_multiplier(),
            team_points: challenge.team_points(),
            created_at: challenge.created_at(),
            updated_at: challenge.updated_at(),
        }
    }
}

/// Group challenge without its flag hash
#[derive(Debug, Clone, Serialize)]
pub struct GroupChallengeResponse {
    pub id: String,
    pub event_id: String,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub difficulty: Difficulty,
    pub points: u32,
    pub max_attempts_per_team: u32,
    pub requires_collaboration: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&GroupChallenge> for GroupChallengeResponse {
    fn from(challenge: &GroupChallenge) -> Self {
        Self {
            id: challenge.id().to_string(),
            event_id: challenge.event_id().to_string(),
            title: challenge.title().to_string(),
            description: challenge.description().to_string(),
            category: challenge.category(),
            difficulty: challenge.difficulty(),
            points: challenge.points(),
            max_attempts_per_team: challenge.max_attempts_per_team(),
            requires_collaboration: challenge.requires_collaboration(),
            created_at: challenge.created_at(),
        }
    }
}

/// Generic `{items, total}` list envelope
#[derive(Debug, Clone, Serialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub total: usize,
}

impl<T> From<Vec<T>> for ListResponse<T> {
    fn from(items: Vec<T>) -> Self {
        let total = items.len();
        Self { items, total }
    }
}

/// Acknowledgement for operations without a body to return
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
