//! Individual challenge endpoints: catalog, flags, hints and standings

use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, ChallengeResponse, Json, ListResponse};
use crate::domain::challenge::{ChallengeId, HintId};
use crate::domain::leaderboard::Ranked;
use crate::domain::submission::Submission;
use crate::infrastructure::services::{
    ChallengeListing, FlagResult, HintUnlockResult, HintView, PlayerEntry,
};

/// A challenge with the caller's solve marker
#[derive(Debug, Clone, Serialize)]
pub struct PlayerChallengeResponse {
    #[serde(flatten)]
    pub challenge: ChallengeResponse,
    pub solved: bool,
}

impl From<&ChallengeListing> for PlayerChallengeResponse {
    fn from(listing: &ChallengeListing) -> Self {
        Self {
            challenge: ChallengeResponse::from(&listing.challenge),
            solved: listing.solved,
        }
    }
}

/// Flag submission body
#[derive(Debug, Deserialize)]
pub struct SubmitFlagRequest {
    pub flag: String,
}

/// Leaderboard query
#[derive(Debug, Deserialize)]
pub struct LeaderboardParams {
    pub limit: Option<usize>,
}

/// GET /v1/challenges
pub async fn list_challenges(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<ListResponse<PlayerChallengeResponse>>, ApiError> {
    let listings = state
        .challenge_service
        .list_for_player(user.id())
        .await
        .map_err(ApiError::from)?;

    Ok(Json(
        listings
            .iter()
            .map(PlayerChallengeResponse::from)
            .collect::<Vec<_>>()
            .into(),
    ))
}

/// GET /v1/challenges/{challenge_id}
pub async fn get_challenge(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(challenge_id): Path<String>,
) -> Result<Json<PlayerChallengeResponse>, ApiError> {
    let challenge_id: ChallengeId = challenge_id.parse()?;

    let listing = state
        .challenge_service
        .get_for_player(user.id(), &challenge_id)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(PlayerChallengeResponse::from(&listing)))
}

/// POST /v1/challenges/{challenge_id}/submit
pub async fn submit_flag(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(challenge_id): Path<String>,
    Json(request): Json<SubmitFlagRequest>,
) -> Result<Json<FlagResult>, ApiError> {
    let challenge_id: ChallengeId = challenge_id.parse()?;
    debug!(user_id = %user.id(), challenge_id = %challenge_id, "Flag submitted");

    let result = state
        .submission_service
        .submit_flag(user.id(), &challenge_id, &request.flag)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(result))
}

/// GET /v1/challenges/{challenge_id}/hints
pub async fn list_hints(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(challenge_id): Path<String>,
) -> Result<Json<ListResponse<HintView>>, ApiError> {
    let challenge_id: ChallengeId = challenge_id.parse()?;

    let hints = state
        .challenge_service
        .list_hints(user.id(), &challenge_id)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(hints.into()))
}

/// POST /v1/hints/{hint_id}/unlock
pub async fn unlock_hint(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(hint_id): Path<String>,
) -> Result<Json<HintUnlockResult>, ApiError> {
    let hint_id: HintId = hint_id.parse()?;
    debug!(user_id = %user.id(), hint_id = %hint_id, "Unlocking hint");

    let result = state
        .challenge_service
        .unlock_hint(user.id(), &hint_id)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(result))
}

/// GET /v1/submissions
pub async fn list_submissions(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<ListResponse<Submission>>, ApiError> {
    let submissions = state
        .submission_service
        .history(user.id())
        .await
        .map_err(ApiError::from)?;

    Ok(Json(submissions.into()))
}

/// GET /v1/leaderboard
pub async fn leaderboard(
    State(state): State<AppState>,
    Query(params): Query<LeaderboardParams>,
) -> Result<Json<ListResponse<Ranked<PlayerEntry>>>, ApiError> {
    let entries = state
        .submission_service
        .leaderboard(params.limit)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(entries.into()))
}
