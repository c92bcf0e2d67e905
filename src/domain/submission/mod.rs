//! Submission domain
//!
//! The append-only ledger of individual flag attempts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::challenge::ChallengeId;
use crate::domain::id::entity_id;
use crate::domain::storage::StorageEntity;
use crate::domain::user::UserId;

entity_id!(
    /// Submission identifier
    SubmissionId
);

/// One flag attempt by a user; the submitted text itself is not retained
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    id: SubmissionId,
    user_id: UserId,
    challenge_id: ChallengeId,
    is_correct: bool,
    points_awarded: u32,
    submitted_at: DateTime<Utc>,
}

impl Submission {
    pub fn correct(
        user_id: UserId,
        challenge_id: ChallengeId,
        points: u32,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: SubmissionId::generate(),
            user_id,
            challenge_id,
            is_correct: true,
            points_awarded: points,
            submitted_at: at,
        }
    }

    pub fn incorrect(user_id: UserId, challenge_id: ChallengeId, at: DateTime<Utc>) -> Self {
        Self {
            id: SubmissionId::generate(),
            user_id,
            challenge_id,
            is_correct: false,
            points_awarded: 0,
            submitted_at: at,
        }
    }

    pub fn id(&self) -> &SubmissionId {
        &self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn challenge_id(&self) -> &ChallengeId {
        &self.challenge_id
    }

    pub fn is_correct(&self) -> bool {
        self.is_correct
    }

    pub fn points_awarded(&self) -> u32 {
        self.points_awarded
    }

    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }
}

impl StorageEntity for Submission {
    type Key = SubmissionId;

    fn key(&self) -> &Self::Key {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incorrect_submission_awards_nothing() {
        let submission =
            Submission::incorrect(UserId::generate(), ChallengeId::generate(), Utc::now());

        assert!(!submission.is_correct());
        assert_eq!(submission.points_awarded(), 0);
    }

    #[test]
    fn test_correct_submission_keeps_points() {
        let submission =
            Submission::correct(UserId::generate(), ChallengeId::generate(), 250, Utc::now());

        assert!(submission.is_correct());
        assert_eq!(submission.points_awarded(), 250);
    }
}
