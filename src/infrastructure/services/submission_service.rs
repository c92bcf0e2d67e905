//! Submission service - individual flag checks and the player leaderboard

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::domain::challenge::ChallengeId;
use crate::domain::leaderboard::{rank, Ranked, Standing};
use crate::domain::submission::Submission;
use crate::domain::user::UserId;
use crate::domain::{Clock, DomainError, StorageExt};
use crate::infrastructure::observability::{record_flag_submission, SubmissionKind};
use crate::infrastructure::storage::Stores;

/// Outcome of a flag submission
#[derive(Debug, Clone, Serialize)]
pub struct FlagResult {
    pub correct: bool,
    pub message: String,
    pub points_awarded: u32,
    pub total_score: u64,
}

/// A player on the individual leaderboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerEntry {
    pub user_id: UserId,
    pub username: String,
}

/// Submission service for the individual competition
#[derive(Clone)]
pub struct SubmissionService {
    stores: Stores,
    clock: Arc<dyn Clock>,
    leaderboard_limit: usize,
}

impl std::fmt::Debug for SubmissionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionService")
            .field("stores", &self.stores)
            .field("leaderboard_limit", &self.leaderboard_limit)
            .finish_non_exhaustive()
    }
}

impl SubmissionService {
    pub fn new(stores: Stores, clock: Arc<dyn Clock>, leaderboard_limit: usize) -> Self {
        Self {
            stores,
            clock,
            leaderboard_limit,
        }
    }

    /// Check a flag against an active challenge and credit the first correct answer
    pub async fn submit_flag(
        &self,
        user_id: &UserId,
        challenge_id: &ChallengeId,
        flag: &str,
    ) -> Result<FlagResult, DomainError> {
        let _guard = self.stores.lock_writes().await;

        let mut user = self.stores.users.require(user_id, "User").await?;
        if !user.can_score() {
            return Err(DomainError::forbidden(
                "Administrators cannot solve challenges",
            ));
        }

        let flag = flag.trim();
        if flag.is_empty() {
            return Err(DomainError::validation("Flag is required"));
        }

        let challenge = self
            .stores
            .challenges
            .get(challenge_id)
            .await?
            .filter(|c| c.is_active())
            .ok_or_else(|| {
                DomainError::not_found(format!("Challenge '{}' not found", challenge_id))
            })?;

        let (owner, target) = (user_id.clone(), challenge_id.clone());
        let already_solved = self
            .stores
            .submissions
            .find_one(move |s| {
                s.user_id() == &owner && s.challenge_id() == &target && s.is_correct()
            })
            .await?
            .is_some();
        if already_solved {
            return Err(DomainError::conflict("You have already solved this challenge"));
        }

        let now = self.clock.now();
        let correct = challenge.check_flag(flag);
        record_flag_submission(SubmissionKind::Individual, correct);

        if !correct {
            self.stores
                .submissions
                .create(Submission::incorrect(user_id.clone(), challenge_id.clone(), now))
                .await?;

            info!(user_id = %user_id, challenge_id = %challenge_id, "Incorrect flag submitted");
            return Ok(FlagResult {
                correct: false,
                message: "Incorrect flag. Try again!".to_string(),
                points_awarded: 0,
                total_score: user.profile().total_score,
            });
        }

        let points = challenge.points();
        self.stores
            .submissions
            .create(Submission::correct(
                user_id.clone(),
                challenge_id.clone(),
                points,
                now,
            ))
            .await?;

        user.credit_solve(points, now);
        let user = self.stores.users.update(user).await?;

        info!(user_id = %user_id, challenge_id = %challenge_id, points, "Challenge solved");
        Ok(FlagResult {
            correct: true,
            message: format!("Correct! You earned {} points!", points),
            points_awarded: points,
            total_score: user.profile().total_score,
        })
    }

    /// A player's attempts, newest first
    pub async fn history(&self, user_id: &UserId) -> Result<Vec<Submission>, DomainError> {
        let owner = user_id.clone();
        let mut submissions = self
            .stores
            .submissions
            .find_all(move |s| s.user_id() == &owner)
            .await?;
        submissions.sort_by(|a, b| b.submitted_at().cmp(&a.submitted_at()));
        Ok(submissions)
    }

    /// Players with a positive score, best first
    pub async fn leaderboard(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<Ranked<PlayerEntry>>, DomainError> {
        let standings = self
            .stores
            .users
            .find_all(|u| u.can_score() && u.profile().total_score > 0)
            .await?
            .into_iter()
            .map(|user| Standing {
                score: user.profile().total_score,
                challenges_solved: user.profile().challenges_solved,
                last_submission: user.profile().last_submission,
                competitor: PlayerEntry {
                    user_id: user.id().clone(),
                    username: user.username().to_string(),
                },
            })
            .collect();

        Ok(rank(standings, Some(limit.unwrap_or(self.leaderboard_limit))))
    }
}
