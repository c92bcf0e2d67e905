//! Challenge catalog admin endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::debug;

use crate::api::middleware::RequireAdmin;
use crate::api::state::AppState;
use crate::api::types::{ApiError, ChallengeResponse, Json, ListResponse};
use crate::domain::challenge::{Category, ChallengeId, ChallengeType, Difficulty, Hint, HintId};
use crate::infrastructure::services::{CreateChallengeRequest, UpdateChallengeRequest};

fn default_true() -> bool {
    true
}

/// Request to create a challenge
#[derive(Debug, Clone, Deserialize)]
pub struct CreateChallengeApiRequest {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub difficulty: Difficulty,
    pub points: u32,
    pub flag: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub challenge_type: ChallengeType,
    pub min_team_size: Option<u32>,
    pub max_team_size: Option<u32>,
    pub team_points_multiplier: Option<f64>,
}

/// Request to update a challenge; omitted fields are unchanged
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateChallengeApiRequest {
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

/// Request to add a hint
#[derive(Debug, Clone, Deserialize)]
pub struct AddHintRequest {
    pub content: String,
    #[serde(default)]
    pub cost: u32,
    pub order: Option<u32>,
}

/// GET /admin/challenges
pub async fn list_challenges(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<ListResponse<ChallengeResponse>>, ApiError> {
    debug!("Admin listing challenges");

    let challenges = state
        .challenge_service
        .list_all()
        .await
        .map_err(ApiError::from)?;

    Ok(Json(
        challenges
            .iter()
            .map(ChallengeResponse::from)
            .collect::<Vec<_>>()
            .into(),
    ))
}

/// POST /admin/challenges
pub async fn create_challenge(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Json(request): Json<CreateChallengeApiRequest>,
) -> Result<(StatusCode, Json<ChallengeResponse>), ApiError> {
    debug!(title = %request.title, "Admin creating challenge");

    let challenge = state
        .challenge_service
        .create(CreateChallengeRequest {
            title: request.title,
            description: request.description,
            category: request.category,
            difficulty: request.difficulty,
            points: request.points,
            flag: request.flag,
            is_active: request.is_active,
            challenge_type: request.challenge_type,
            min_team_size: request.min_team_size,
            max_team_size: request.max_team_size,
            team_points_multiplier: request.team_points_multiplier,
        })
        .await
        .map_err(ApiError::from)?;

    Ok((StatusCode::CREATED, Json(ChallengeResponse::from(&challenge))))
}

/// GET /admin/challenges/{challenge_id}
pub async fn get_challenge(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(challenge_id): Path<String>,
) -> Result<Json<ChallengeResponse>, ApiError> {
    let challenge_id: ChallengeId = challenge_id.parse()?;

    let challenge = state
        .challenge_service
        .get(&challenge_id)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(ChallengeResponse::from(&challenge)))
}

/// PUT /admin/challenges/{challenge_id}
pub async fn update_challenge(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(challenge_id): Path<String>,
    Json(request): Json<UpdateChallengeApiRequest>,
) -> Result<Json<ChallengeResponse>, ApiError> {
    let challenge_id: ChallengeId = challenge_id.parse()?;
    debug!(challenge_id = %challenge_id, "Admin updating challenge");

    let challenge = state
        .challenge_service
        .update(
            &challenge_id,
            UpdateChallengeRequest {
                title: request.title,
                description: request.description,
                category: request.category,
                difficulty: request.difficulty,
                points: request.points,
                flag: request.flag,
                is_active: request.is_active,
                challenge_type: request.challenge_type,
                min_team_size: request.min_team_size,
                max_team_size: request.max_team_size,
                team_points_multiplier: request.team_points_multiplier,
            },
        )
        .await
        .map_err(ApiError::from)?;

    Ok(Json(ChallengeResponse::from(&challenge)))
}

/// DELETE /admin/challenges/{challenge_id}
pub async fn delete_challenge(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(challenge_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let challenge_id: ChallengeId = challenge_id.parse()?;
    debug!(challenge_id = %challenge_id, "Admin deleting challenge");

    state
        .challenge_service
        .delete(&challenge_id)
        .await
        .map_err(ApiError::from)?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /admin/challenges/{challenge_id}/hints
pub async fn add_hint(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(challenge_id): Path<String>,
    Json(request): Json<AddHintRequest>,
) -> Result<(StatusCode, Json<Hint>), ApiError> {
    let challenge_id: ChallengeId = challenge_id.parse()?;

    let hint = state
        .challenge_service
        .add_hint(&challenge_id, &request.content, request.cost, request.order)
        .await
        .map_err(ApiError::from)?;

    Ok((StatusCode::CREATED, Json(hint)))
}

/// DELETE /admin/hints/{hint_id}
pub async fn delete_hint(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(hint_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let hint_id: HintId = hint_id.parse()?;

    state
        .challenge_service
        .delete_hint(&hint_id)
        .await
        .map_err(ApiError::from)?;

    Ok(StatusCode::NO_CONTENT)
}
