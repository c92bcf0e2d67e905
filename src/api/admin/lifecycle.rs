//! Event lifecycle admin endpoints

use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::middleware::RequireAdmin;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, ListResponse};
use crate::domain::group_event::GroupEventId;
use crate::infrastructure::services::{
    CleanupSummary, EventHistoryEntry, EventResults, EventStatus, LifecycleTransition,
    StatusSummary,
};

#[derive(Debug, Deserialize)]
pub struct CleanupParams {
    #[serde(default = "default_preserve")]
    pub preserve_data: bool,
}

fn default_preserve() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub struct LifecycleRunResponse {
    pub transitions: Vec<LifecycleTransition>,
}

/// GET /admin/lifecycle/summary
pub async fn summary(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<StatusSummary>, ApiError> {
    let summary = state
        .lifecycle_service
        .summary()
        .await
        .map_err(ApiError::from)?;

    Ok(Json(summary))
}

/// POST /admin/lifecycle/run
pub async fn run(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<Json<LifecycleRunResponse>, ApiError> {
    info!(admin_id = %admin.id(), "Manual lifecycle run requested");

    let transitions = state
        .lifecycle_service
        .run_lifecycle()
        .await
        .map_err(ApiError::from)?;

    Ok(Json(LifecycleRunResponse { transitions }))
}

/// POST /admin/lifecycle/cleanup
pub async fn cleanup(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Query(params): Query<CleanupParams>,
) -> Result<Json<CleanupSummary>, ApiError> {
    info!(admin_id = %admin.id(), preserve_data = params.preserve_data, "Cleaning up expired events");

    let summary = state
        .lifecycle_service
        .cleanup_expired(params.preserve_data)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(summary))
}

/// GET /admin/lifecycle/history
pub async fn history(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<ListResponse<EventHistoryEntry>>, ApiError> {
    let history = state
        .lifecycle_service
        .history()
        .await
        .map_err(ApiError::from)?;

    Ok(Json(history.into()))
}

/// GET /admin/events/{event_id}/status
pub async fn event_status(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(event_id): Path<String>,
) -> Result<Json<EventStatus>, ApiError> {
    let event_id: GroupEventId = event_id.parse()?;

    let status = state
        .lifecycle_service
        .event_status(&event_id)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(status))
}

/// GET /admin/events/{event_id}/results
pub async fn event_results(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(event_id): Path<String>,
) -> Result<Json<EventResults>, ApiError> {
    let event_id: GroupEventId = event_id.parse()?;

    let results = state
        .lifecycle_service
        .event_results(&event_id)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(results))
}
