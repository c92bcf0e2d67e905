//! Purchasable hints

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::ChallengeId;
use crate::domain::id::entity_id;
use crate::domain::storage::StorageEntity;
use crate::domain::user::UserId;

entity_id!(
    /// Hint identifier
    HintId
);

entity_id!(
    /// Hint unlock record identifier
    HintUnlockId
);

/// A hint attached to a challenge; its content costs `cost` points to reveal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hint {
    id: HintId,
    challenge_id: ChallengeId,
    content: String,
    cost: u32,
    order: u32,
    created_at: DateTime<Utc>,
}

impl Hint {
    pub fn new(challenge_id: ChallengeId, content: impl Into<String>, cost: u32, order: u32) -> Self {
        Self {
            id: HintId::generate(),
            challenge_id,
            content: content.into(),
            cost,
            order,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &HintId {
        &self.id
    }

    pub fn challenge_id(&self) -> &ChallengeId {
        &self.challenge_id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub fn order(&self) -> u32 {
        self.order
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_free(&self) -> bool {
        self.cost == 0
    }
}

impl StorageEntity for Hint {
    type Key = HintId;

    fn key(&self) -> &Self::Key {
        &self.id
    }
}

/// Record of a user revealing a hint; at most one per (user, hint)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HintUnlock {
    id: HintUnlockId,
    user_id: UserId,
    hint_id: HintId,
    challenge_id: ChallengeId,
    points_deducted: u32,
    unlocked_at: DateTime<Utc>,
}

impl HintUnlock {
    pub fn new(user_id: UserId, hint: &Hint, points_deducted: u32) -> Self {
        Self {
            id: HintUnlockId::generate(),
            user_id,
            hint_id: hint.id().clone(),
            challenge_id: hint.challenge_id().clone(),
            points_deducted,
            unlocked_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &HintUnlockId {
        &self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn hint_id(&self) -> &HintId {
        &self.hint_id
    }

    pub fn challenge_id(&self) -> &ChallengeId {
        &self.challenge_id
    }

    pub fn points_deducted(&self) -> u32 {
        self.points_deducted
    }

    pub fn unlocked_at(&self) -> DateTime<Utc> {
        self.unlocked_at
    }
}

impl StorageEntity for HintUnlock {
    type Key = HintUnlockId;

    fn key(&self) -> &Self::Key {
        &self.id
    }
}
