//! Team chat endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, ListResponse};
use crate::domain::chat::{MessageId, MessageReaction, TeamMessage};
use crate::domain::team::TeamId;
use crate::infrastructure::services::ChatMessageView;

#[derive(Debug, Deserialize)]
pub struct MessageContentRequest {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ReactionRequest {
    pub emoji: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatHistoryParams {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    pub unread: usize,
}

#[derive(Debug, Serialize)]
pub struct MarkedReadResponse {
    pub marked: usize,
}

#[derive(Debug, Serialize)]
pub struct UnreactResponse {
    pub removed: bool,
}

/// GET /v1/teams/{team_id}/chat
pub async fn list_messages(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(team_id): Path<String>,
    Query(params): Query<ChatHistoryParams>,
) -> Result<Json<ListResponse<ChatMessageView>>, ApiError> {
    let team_id: TeamId = team_id.parse()?;

    let messages = state
        .chat_service
        .list(user.id(), &team_id, params.limit)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(messages.into()))
}

/// POST /v1/teams/{team_id}/chat
pub async fn post_message(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(team_id): Path<String>,
    Json(request): Json<MessageContentRequest>,
) -> Result<(StatusCode, Json<TeamMessage>), ApiError> {
    let team_id: TeamId = team_id.parse()?;
    debug!(user_id = %user.id(), team_id = %team_id, "Posting chat message");

    let message = state
        .chat_service
        .post(user.id(), &team_id, &request.content)
        .await
        .map_err(ApiError::from)?;

    Ok((StatusCode::CREATED, Json(message)))
}

/// POST /v1/teams/{team_id}/chat/read
pub async fn mark_all_read(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(team_id): Path<String>,
) -> Result<Json<MarkedReadResponse>, ApiError> {
    let team_id: TeamId = team_id.parse()?;

    let marked = state
        .chat_service
        .mark_all_read(user.id(), &team_id)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(MarkedReadResponse { marked }))
}

/// GET /v1/teams/{team_id}/chat/unread
pub async fn unread_count(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(team_id): Path<String>,
) -> Result<Json<UnreadCountResponse>, ApiError> {
    let team_id: TeamId = team_id.parse()?;

    let unread = state
        .chat_service
        .unread_count(user.id(), &team_id)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(UnreadCountResponse { unread }))
}

/// PUT /v1/messages/{message_id}
pub async fn edit_message(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(message_id): Path<String>,
    Json(request): Json<MessageContentRequest>,
) -> Result<Json<TeamMessage>, ApiError> {
    let message_id: MessageId = message_id.parse()?;

    let message = state
        .chat_service
        .edit(user.id(), &message_id, &request.content)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(message))
}

/// DELETE /v1/messages/{message_id}
pub async fn delete_message(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(message_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let message_id: MessageId = message_id.parse()?;

    state
        .chat_service
        .delete(user.id(), &message_id)
        .await
        .map_err(ApiError::from)?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /v1/messages/{message_id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(message_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let message_id: MessageId = message_id.parse()?;

    state
        .chat_service
        .mark_read(user.id(), &message_id)
        .await
        .map_err(ApiError::from)?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /v1/messages/{message_id}/reactions
pub async fn react(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(message_id): Path<String>,
    Json(request): Json<ReactionRequest>,
) -> Result<Json<MessageReaction>, ApiError> {
    let message_id: MessageId = message_id.parse()?;

    let reaction = state
        .chat_service
        .react(user.id(), &message_id, &request.emoji)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(reaction))
}

/// DELETE /v1/messages/{message_id}/reactions/{emoji}
pub async fn unreact(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path((message_id, emoji)): Path<(String, String)>,
) -> Result<Json<UnreactResponse>, ApiError> {
    let message_id: MessageId = message_id.parse()?;

    let removed = state
        .chat_service
        .unreact(user.id(), &message_id, &emoji)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(UnreactResponse { removed }))
}
