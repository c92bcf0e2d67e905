//! Group event admin endpoints: events, their challenges and platform mode

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use tracing::debug;

use crate::api::middleware::RequireAdmin;
use crate::api::state::AppState;
use crate::api::types::{ApiError, GroupChallengeResponse, Json, ListResponse};
use crate::domain::challenge::{Category, Difficulty};
use crate::domain::group_event::{GroupChallengeId, GroupEvent, GroupEventId, PlatformMode};
use crate::infrastructure::services::{
    CreateEventRequest, CreateGroupChallengeRequest, EventInfo, UpdateEventRequest,
    UpdateGroupChallengeRequest,
};

/// Distinguishes an omitted field from an explicit `null`
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateEventApiRequest {
    pub name: String,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub point_multiplier: Option<f64>,
    pub max_teams: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateEventApiRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub point_multiplier: Option<f64>,
    /// `null` removes the team cap
    #[serde(default, deserialize_with = "double_option")]
    pub max_teams: Option<Option<u32>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateGroupChallengeApiRequest {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub difficulty: Difficulty,
    pub points: u32,
    pub flag: String,
    pub max_attempts_per_team: Option<u32>,
    pub requires_collaboration: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateGroupChallengeApiRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub difficulty: Option<Difficulty>,
    pub points: Option<u32>,
    pub flag: Option<String>,
    pub max_attempts_per_team: Option<u32>,
    pub requires_collaboration: Option<bool>,
}

/// GET /admin/events
pub async fn list_events(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<ListResponse<GroupEvent>>, ApiError> {
    debug!("Admin listing group events");

    let events = state
        .group_event_service
        .list_events()
        .await
        .map_err(ApiError::from)?;

    Ok(Json(events.into()))
}

/// POST /admin/events
pub async fn create_event(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(request): Json<CreateEventApiRequest>,
) -> Result<(StatusCode, Json<GroupEvent>), ApiError> {
    debug!(name = %request.name, "Admin creating group event");

    let event = state
        .group_event_service
        .create_event(
            admin.id(),
            CreateEventRequest {
                name: request.name,
                description: request.description,
                start_time: request.start_time,
                end_time: request.end_time,
                point_multiplier: request.point_multiplier,
                max_teams: request.max_teams,
            },
        )
        .await
        .map_err(ApiError::from)?;

    Ok((StatusCode::CREATED, Json(event)))
}

/// GET /admin/events/{event_id}
pub async fn get_event(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(event_id): Path<String>,
) -> Result<Json<EventInfo>, ApiError> {
    let event_id: GroupEventId = event_id.parse()?;

    let info = state
        .group_event_service
        .event_info(&event_id)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(info))
}

/// PUT /admin/events/{event_id}
pub async fn update_event(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(event_id): Path<String>,
    Json(request): Json<UpdateEventApiRequest>,
) -> Result<Json<GroupEvent>, ApiError> {
    let event_id: GroupEventId = event_id.parse()?;
    debug!(event_id = %event_id, "Admin updating group event");

    let event = state
        .group_event_service
        .update_event(
            &event_id,
            UpdateEventRequest {
                name: request.name,
                description: request.description,
                start_time: request.start_time,
                end_time: request.end_time,
                point_multiplier: request.point_multiplier,
                max_teams: request.max_teams,
            },
        )
        .await
        .map_err(ApiError::from)?;

    Ok(Json(event))
}

/// DELETE /admin/events/{event_id}
pub async fn delete_event(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(event_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let event_id: GroupEventId = event_id.parse()?;
    debug!(event_id = %event_id, "Admin deleting group event");

    state
        .group_event_service
        .delete_event(&event_id)
        .await
        .map_err(ApiError::from)?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /admin/events/{event_id}/activate
pub async fn activate_event(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(event_id): Path<String>,
) -> Result<Json<GroupEvent>, ApiError> {
    let event_id: GroupEventId = event_id.parse()?;

    let event = state
        .group_event_service
        .activate(admin.id(), &event_id)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(event))
}

/// POST /admin/events/{event_id}/deactivate
pub async fn deactivate_event(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(event_id): Path<String>,
) -> Result<Json<GroupEvent>, ApiError> {
    let event_id: GroupEventId = event_id.parse()?;

    let event = state
        .group_event_service
        .deactivate(admin.id(), &event_id)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(event))
}

/// GET /admin/events/{event_id}/challenges
pub async fn list_event_challenges(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(event_id): Path<String>,
) -> Result<Json<ListResponse<GroupChallengeResponse>>, ApiError> {
    let event_id: GroupEventId = event_id.parse()?;

    let challenges = state
        .group_event_service
        .list_challenges(&event_id)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(
        challenges
            .iter()
            .map(GroupChallengeResponse::from)
            .collect::<Vec<_>>()
            .into(),
    ))
}

/// POST /admin/events/{event_id}/challenges
pub async fn create_event_challenge(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(event_id): Path<String>,
    Json(request): Json<CreateGroupChallengeApiRequest>,
) -> Result<(StatusCode, Json<GroupChallengeResponse>), ApiError> {
    let event_id: GroupEventId = event_id.parse()?;
    debug!(event_id = %event_id, title = %request.title, "Admin creating group challenge");

    let challenge = state
        .group_event_service
        .create_challenge(
            &event_id,
            CreateGroupChallengeRequest {
                title: request.title,
                description: request.description,
                category: request.category,
                difficulty: request.difficulty,
                points: request.points,
                flag: request.flag,
                max_attempts_per_team: request.max_attempts_per_team,
                requires_collaboration: request.requires_collaboration,
            },
        )
        .await
        .map_err(ApiError::from)?;

    Ok((StatusCode::CREATED, Json(GroupChallengeResponse::from(&challenge))))
}

/// GET /admin/group-challenges/{challenge_id}
pub async fn get_group_challenge(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(challenge_id): Path<String>,
) -> Result<Json<GroupChallengeResponse>, ApiError> {
    let challenge_id: GroupChallengeId = challenge_id.parse()?;

    let challenge = state
        .group_event_service
        .get_challenge(&challenge_id)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(GroupChallengeResponse::from(&challenge)))
}

/// PUT /admin/group-challenges/{challenge_id}
pub async fn update_group_challenge(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(challenge_id): Path<String>,
    Json(request): Json<UpdateGroupChallengeApiRequest>,
) -> Result<Json<GroupChallengeResponse>, ApiError> {
    let challenge_id: GroupChallengeId = challenge_id.parse()?;

    let challenge = state
        .group_event_service
        .update_challenge(
            &challenge_id,
            UpdateGroupChallengeRequest {
                title: request.title,
                description: request.description,
                category: request.category,
                difficulty: request.difficulty,
                points: request.points,
                flag: request.flag,
                max_attempts_per_team: request.max_attempts_per_team,
                requires_collaboration: request.requires_collaboration,
            },
        )
        .await
        .map_err(ApiError::from)?;

    Ok(Json(GroupChallengeResponse::from(&challenge)))
}

/// DELETE /admin/group-challenges/{challenge_id}
pub async fn delete_group_challenge(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(challenge_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let challenge_id: GroupChallengeId = challenge_id.parse()?;

    state
        .group_event_service
        .delete_challenge(&challenge_id)
        .await
        .map_err(ApiError::from)?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /admin/platform-mode
pub async fn platform_mode(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<PlatformMode>, ApiError> {
    let mode = state
        .group_event_service
        .platform_mode()
        .await
        .map_err(ApiError::from)?;

    Ok(Json(mode))
}
