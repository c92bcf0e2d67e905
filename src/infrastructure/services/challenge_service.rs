//! Challenge service - the individual catalog and its hints

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, info};

use crate::domain::broadcast::Broadcast;
use crate::domain::challenge::{
    validate_description, validate_flag, validate_hint_content, validate_multiplier,
    validate_points, validate_team_size, validate_title, Category, Challenge, ChallengeId,
    ChallengeType, Difficulty, Hint, HintId, HintUnlock, DEFAULT_MAX_TEAM_SIZE,
    DEFAULT_MIN_TEAM_SIZE,
};
use crate::domain::user::UserId;
use crate::domain::{DomainError, StorageExt};
use crate::infrastructure::storage::Stores;

/// Request to create a challenge
#[derive(Debug, Clone)]
pub struct CreateChallengeRequest {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub difficulty: Difficulty,
    pub points: u32,
    pub flag: String,
    pub is_active: bool,
    pub challenge_type: ChallengeType,
    pub min_team_size: Option<u32>,
    pub max_team_size: Option<u32>,
    pub team_points_multiplier: Option<f64>,
}

/// Request to update a challenge; `None` leaves a field unchanged
#[derive(Debug, Clone, Default)]
pub struct UpdateChallengeRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub difficulty: Option<Difficulty>,
    pub points: Option<u32>,
    pub flag: Option<String>,
    pub is_active: Option<bool>,
    pub challenge_type: Option<ChallengeType>,
    pub min_team_size: Option<u32>,
    pub max_team_size: Option<u32>,
    pub team_points_multiplier: Option<f64>,
}

/// A catalog entry as seen by one player
#[derive(Debug, Clone)]
pub struct ChallengeListing {
    pub challenge: Challenge,
    pub solved: bool,
}

/// A hint as seen by one player; content stays hidden until revealed
#[derive(Debug, Clone, Serialize)]
pub struct HintView {
    pub id: HintId,
    pub order: u32,
    pub cost: u32,
    pub unlocked: bool,
    pub content: Option<String>,
}

/// Result of unlocking a hint
#[derive(Debug, Clone, Serialize)]
pub struct HintUnlockResult {
    pub hint: HintView,
    pub points_deducted: u32,
    pub already_unlocked: bool,
    pub total_score: u64,
}

/// Challenge service for catalog administration and play
#[derive(Debug, Clone)]
pub struct ChallengeService {
    stores: Stores,
}

impl ChallengeService {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    /// Create a challenge; publishing it drafts an announcement
    pub async fn create(&self, request: CreateChallengeRequest) -> Result<Challenge, DomainError> {
        let min = request.min_team_size.unwrap_or(DEFAULT_MIN_TEAM_SIZE);
        let max = request.max_team_size.unwrap_or(DEFAULT_MAX_TEAM_SIZE);
        let multiplier = request.team_points_multiplier.unwrap_or(1.0);

        let mut errors = Vec::new();
        collect(&mut errors, validate_title(request.title.trim()));
        collect(&mut errors, validate_description(&request.description));
        collect(&mut errors, validate_flag(&request.flag));
        collect(&mut errors, validate_points(request.points));
        collect(&mut errors, validate_team_size(min, max));
        collect(&mut errors, validate_multiplier(multiplier));
        if !errors.is_empty() {
            return Err(DomainError::validation_list(&errors));
        }

        let challenge = Challenge::new(
            request.title.trim(),
            request.description,
            request.category,
            request.difficulty,
            request.points,
            request.flag.trim(),
        )
        .with_type(request.challenge_type)
        .with_team_size(min, max)
        .with_team_points_multiplier(multiplier)
        .with_active(request.is_active);

        info!(challenge_id = %challenge.id(), title = %challenge.title(), "Creating challenge");
        let challenge = self.stores.challenges.create(challenge).await?;

        if challenge.is_active() {
            self.announce(&challenge).await?;
        }

        Ok(challenge)
    }

    /// Update a challenge; flipping it from inactive to active drafts an announcement
    pub async fn update(
        &self,
        id: &ChallengeId,
        request: UpdateChallengeRequest,
    ) -> Result<Challenge, DomainError> {
        let mut challenge = self.stores.challenges.require(id, "Challenge").await?;
        let was_active = challenge.is_active();

        let min = request.min_team_size.unwrap_or(challenge.min_team_size());
        let max = request.max_team_size.unwrap_or(challenge.max_team_size());

        let mut errors = Vec::new();
        if let Some(title) = &request.title {
            collect(&mut errors, validate_title(title.trim()));
        }
        if let Some(description) = &request.description {
            collect(&mut errors, validate_description(description));
        }
        if let Some(flag) = &request.flag {
            collect(&mut errors, validate_flag(flag));
        }
        if let Some(points) = request.points {
            collect(&mut errors, validate_points(points));
        }
        if let Some(multiplier) = request.team_points_multiplier {
            collect(&mut errors, validate_multiplier(multiplier));
        }
        collect(&mut errors, validate_team_size(min, max));
        if !errors.is_empty() {
            return Err(DomainError::validation_list(&errors));
        }

        if let Some(title) = request.title {
            challenge.set_title(title.trim());
        }
        if let Some(description) = request.description {
            challenge.set_description(description);
        }
        if let Some(category) = request.category {
            challenge.set_category(category);
        }
        if let Some(difficulty) = request.difficulty {
            challenge.set_difficulty(difficulty);
        }
        if let Some(points) = request.points {
            challenge.set_points(points);
        }
        if let Some(flag) = request.flag {
            challenge.set_flag(flag.trim());
        }
        if let Some(challenge_type) = request.challenge_type {
            challenge.set_challenge_type(challenge_type);
        }
        if let Some(multiplier) = request.team_points_multiplier {
            challenge.set_team_points_multiplier(multiplier);
        }
        if let Some(is_active) = request.is_active {
            challenge.set_active(is_active);
        }
        challenge.set_team_size(min, max);

        info!(challenge_id = %id, "Updating challenge");
        let challenge = self.stores.challenges.update(challenge).await?;

        if !was_active && challenge.is_active() {
            self.announce(&challenge).await?;
        }

        Ok(challenge)
    }

    /// Delete a challenge and its hints; the submission ledger is kept
    pub async fn delete(&self, id: &ChallengeId) -> Result<(), DomainError> {
        if !self.stores.challenges.delete(id).await? {
            return Err(DomainError::not_found(format!("Challenge '{}' not found", id)));
        }

        let challenge_id = id.clone();
        for hint in self
            .stores
            .hints
            .find_all(move |h| h.challenge_id() == &challenge_id)
            .await?
        {
            self.stores.hints.delete(hint.id()).await?;
        }

        info!(challenge_id = %id, "Deleted challenge");
        Ok(())
    }

    /// Every challenge, active or not, in catalog order
    pub async fn list_all(&self) -> Result<Vec<Challenge>, DomainError> {
        let mut challenges = self.stores.challenges.list().await?;
        challenges.sort_by_key(|c| c.catalog_key());
        Ok(challenges)
    }

    pub async fn get(&self, id: &ChallengeId) -> Result<Challenge, DomainError> {
        self.stores.challenges.require(id, "Challenge").await
    }

    /// Active challenges in catalog order, marked with the player's solves
    pub async fn list_for_player(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ChallengeListing>, DomainError> {
        let solved = self.solved_by(user_id).await?;

        let mut challenges = self.stores.challenges.find_all(|c| c.is_active()).await?;
        challenges.sort_by_key(|c| c.catalog_key());

        Ok(challenges
            .into_iter()
            .map(|challenge| ChallengeListing {
                solved: solved.contains(challenge.id()),
                challenge,
            })
            .collect())
    }

    /// A single active challenge; inactive ones are reported as missing
    pub async fn get_for_player(
        &self,
        user_id: &UserId,
        id: &ChallengeId,
    ) -> Result<ChallengeListing, DomainError> {
        let challenge = self.get_active(id).await?;
        let solved = self.solved_by(user_id).await?.contains(challenge.id());
        Ok(ChallengeListing { challenge, solved })
    }

    pub async fn get_active(&self, id: &ChallengeId) -> Result<Challenge, DomainError> {
        self.stores
            .challenges
            .get(id)
            .await?
            .filter(|c| c.is_active())
            .ok_or_else(|| DomainError::not_found(format!("Challenge '{}' not found", id)))
    }

    /// Attach a hint; without an explicit order it goes after the existing ones
    pub async fn add_hint(
        &self,
        challenge_id: &ChallengeId,
        content: &str,
        cost: u32,
        order: Option<u32>,
    ) -> Result<Hint, DomainError> {
        validate_hint_content(content).map_err(|e| DomainError::validation(e.to_string()))?;
        self.get(challenge_id).await?;

        let _guard = self.stores.lock_writes().await;
        let existing = self.hints_of(challenge_id).await?;

        let order = match order {
            Some(order) if existing.iter().any(|h| h.order() == order) => {
                return Err(DomainError::conflict(format!(
                    "A hint with order {} already exists for this challenge",
                    order
                )));
            }
            Some(order) => order,
            None => existing.iter().map(|h| h.order() + 1).max().unwrap_or(1),
        };

        let hint = Hint::new(challenge_id.clone(), content.trim(), cost, order);
        info!(hint_id = %hint.id(), challenge_id = %challenge_id, cost, order, "Adding hint");
        self.stores.hints.create(hint).await
    }

    pub async fn delete_hint(&self, hint_id: &HintId) -> Result<(), DomainError> {
        if !self.stores.hints.delete(hint_id).await? {
            return Err(DomainError::not_found(format!("Hint '{}' not found", hint_id)));
        }
        info!(hint_id = %hint_id, "Deleted hint");
        Ok(())
    }

    /// Hints of an active challenge as the player sees them
    pub async fn list_hints(
        &self,
        user_id: &UserId,
        challenge_id: &ChallengeId,
    ) -> Result<Vec<HintView>, DomainError> {
        self.get_active(challenge_id).await?;

        let owner = user_id.clone();
        let unlocked: HashSet<HintId> = self
            .stores
            .hint_unlocks
            .find_all(move |u| u.user_id() == &owner)
            .await?
            .into_iter()
            .map(|u| u.hint_id().clone())
            .collect();

        Ok(self
            .hints_of(challenge_id)
            .await?
            .iter()
            .map(|hint| hint_view(hint, unlocked.contains(hint.id())))
            .collect())
    }

    /// Reveal a hint, charging its cost once per player
    pub async fn unlock_hint(
        &self,
        user_id: &UserId,
        hint_id: &HintId,
    ) -> Result<HintUnlockResult, DomainError> {
        let hint = self.stores.hints.require(hint_id, "Hint").await?;
        self.get_active(hint.challenge_id()).await?;

        let _guard = self.stores.lock_writes().await;
        let mut user = self.stores.users.require(user_id, "User").await?;

        let (owner, target) = (user_id.clone(), hint_id.clone());
        if let Some(existing) = self
            .stores
            .hint_unlocks
            .find_one(move |u| u.user_id() == &owner && u.hint_id() == &target)
            .await?
        {
            debug!(hint_id = %hint_id, user_id = %user_id, "Hint already unlocked");
            return Ok(HintUnlockResult {
                hint: hint_view(&hint, true),
                points_deducted: existing.points_deducted(),
                already_unlocked: true,
                total_score: user.profile().total_score,
            });
        }

        let deducted = user.deduct_points(hint.cost());
        let user = self.stores.users.update(user).await?;
        self.stores
            .hint_unlocks
            .create(HintUnlock::new(user_id.clone(), &hint, deducted))
            .await?;

        info!(hint_id = %hint_id, user_id = %user_id, deducted, "Hint unlocked");
        Ok(HintUnlockResult {
            hint: hint_view(&hint, true),
            points_deducted: deducted,
            already_unlocked: false,
            total_score: user.profile().total_score,
        })
    }

    async fn hints_of(&self, challenge_id: &ChallengeId) -> Result<Vec<Hint>, DomainError> {
        let challenge_id = challenge_id.clone();
        let mut hints = self
            .stores
            .hints
            .find_all(move |h| h.challenge_id() == &challenge_id)
            .await?;
        hints.sort_by_key(|h| h.order());
        Ok(hints)
    }

    async fn solved_by(&self, user_id: &UserId) -> Result<HashSet<ChallengeId>, DomainError> {
        let owner = user_id.clone();
        Ok(self
            .stores
            .submissions
            .find_all(move |s| s.user_id() == &owner && s.is_correct())
            .await?
            .into_iter()
            .map(|s| s.challenge_id().clone())
            .collect())
    }

    async fn announce(&self, challenge: &Challenge) -> Result<(), DomainError> {
        let broadcast = Broadcast::new_challenge(challenge);
        info!(
            broadcast_id = %broadcast.id(),
            challenge_id = %challenge.id(),
            "Drafted challenge announcement"
        );
        self.stores.broadcasts.create(broadcast).await?;
        Ok(())
    }
}

fn collect<E: ToString>(errors: &mut Vec<String>, result: Result<(), E>) {
    if let Err(e) = result {
        errors.push(e.to_string());
    }
}

fn hint_view(hint: &Hint, unlocked: bool) -> HintView {
    let revealed = unlocked || hint.is_free();
    HintView {
        id: hint.id().clone(),
        order: hint.order(),
        cost: hint.cost(),
        unlocked,
        content: revealed.then(|| hint.content().to_string()),
    }
}
