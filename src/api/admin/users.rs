//! User administration endpoints

use axum::extract::{Path, State};
use serde::Serialize;
use tracing::debug;

use crate::api::middleware::RequireAdmin;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, ListResponse, UserResponse};
use crate::domain::user::UserId;

#[derive(Debug, Serialize)]
pub struct RecalculateResponse {
    pub updated_users: usize,
}

/// GET /admin/users
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<ListResponse<UserResponse>>, ApiError> {
    debug!("Admin listing users");

    let users = state.user_service.list().await.map_err(ApiError::from)?;

    Ok(Json(
        users
            .iter()
            .map(UserResponse::from)
            .collect::<Vec<_>>()
            .into(),
    ))
}

/// POST /admin/users/{user_id}/suspend
pub async fn suspend_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let user_id: UserId = user_id.parse()?;
    debug!(user_id = %user_id, "Admin suspending user");

    let user = state
        .user_service
        .suspend(admin.id(), &user_id)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(UserResponse::from(&user)))
}

/// POST /admin/users/{user_id}/activate
pub async fn activate_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let user_id: UserId = user_id.parse()?;
    debug!(user_id = %user_id, "Admin activating user");

    let user = state
        .user_service
        .activate(admin.id(), &user_id)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(UserResponse::from(&user)))
}

/// POST /admin/users/recalculate-scores
pub async fn recalculate_scores(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<RecalculateResponse>, ApiError> {
    let updated_users = state
        .user_service
        .recalculate_scores()
        .await
        .map_err(ApiError::from)?;

    Ok(Json(RecalculateResponse { updated_users }))
}
