//! Broadcast admin endpoints

use axum::extract::{Path, State};
use serde::Serialize;
use tracing::debug;

use crate::api::middleware::RequireAdmin;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, ListResponse};
use crate::domain::broadcast::{Broadcast, BroadcastId};
use crate::infrastructure::services::Recipient;

/// A broadcast with its resolved audience
#[derive(Debug, Serialize)]
pub struct BroadcastRecipientsResponse {
    pub broadcast: Broadcast,
    pub recipients: Vec<Recipient>,
    pub total: usize,
}

/// GET /admin/broadcasts
pub async fn list_broadcasts(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<ListResponse<Broadcast>>, ApiError> {
    debug!("Admin listing broadcasts");

    let broadcasts = state
        .broadcast_service
        .list()
        .await
        .map_err(ApiError::from)?;

    Ok(Json(broadcasts.into()))
}

/// GET /admin/broadcasts/{broadcast_id}/recipients
pub async fn recipients(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(broadcast_id): Path<String>,
) -> Result<Json<BroadcastRecipientsResponse>, ApiError> {
    let broadcast_id: BroadcastId = broadcast_id.parse()?;

    let broadcast = state
        .broadcast_service
        .get(&broadcast_id)
        .await
        .map_err(ApiError::from)?;
    let recipients = state
        .broadcast_service
        .recipients(&broadcast_id)
        .await
        .map_err(ApiError::from)?;
    let total = recipients.len();

    Ok(Json(BroadcastRecipientsResponse {
        broadcast,
        recipients,
        total,
    }))
}

/// POST /admin/broadcasts/{broadcast_id}/sent
pub async fn mark_sent(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(broadcast_id): Path<String>,
) -> Result<Json<Broadcast>, ApiError> {
    let broadcast_id: BroadcastId = broadcast_id.parse()?;

    let broadcast = state
        .broadcast_service
        .mark_sent(&broadcast_id)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(broadcast))
}
