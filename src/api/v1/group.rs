//! Group competition endpoints for teams

use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::middleware::{OptionalUser, RequireUser};
use crate::api::state::AppState;
use crate::api::types::{ApiError, GroupChallengeResponse, Json, ListResponse};
use crate::domain::group_event::{ChallengeStats, GroupChallengeId, GroupEventId, GroupSubmission};
use crate::domain::leaderboard::Ranked;
use crate::infrastructure::services::{
    AccessReport, EventInfo, EventTeamEntry, GroupFlagResult, GroupStatus, TeamChallengeView,
    TeamRanking,
};

use super::challenges::SubmitFlagRequest;

/// A group challenge with the caller's team progress
#[derive(Debug, Clone, Serialize)]
pub struct TeamChallengeResponse {
    #[serde(flatten)]
    pub challenge: GroupChallengeResponse,
    pub solved: bool,
    pub attempts_used: u32,
    pub attempts_remaining: u32,
    pub effective_points: u64,
}

impl From<&TeamChallengeView> for TeamChallengeResponse {
    fn from(view: &TeamChallengeView) -> Self {
        Self {
            challenge: GroupChallengeResponse::from(&view.challenge),
            solved: view.solved,
            attempts_used: view.attempts_used,
            attempts_remaining: view.attempts_remaining,
            effective_points: view.effective_points,
        }
    }
}

/// Event leaderboard query; defaults to the active event
#[derive(Debug, Deserialize)]
pub struct EventLeaderboardParams {
    pub event_id: Option<String>,
    pub limit: Option<usize>,
}

/// GET /v1/group/status
pub async fn status(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
) -> Result<Json<GroupStatus>, ApiError> {
    let status = state
        .group_event_service
        .status(user.as_ref().map(|u| u.id()))
        .await
        .map_err(ApiError::from)?;

    Ok(Json(status))
}

/// GET /v1/group/access
pub async fn check_access(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
) -> Result<Json<AccessReport>, ApiError> {
    let report = state
        .group_event_service
        .check_access(user.as_ref().map(|u| u.id()))
        .await
        .map_err(ApiError::from)?;

    Ok(Json(report))
}

/// GET /v1/group/challenges
pub async fn list_challenges(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<ListResponse<TeamChallengeResponse>>, ApiError> {
    let views = state
        .group_event_service
        .team_challenges(user.id())
        .await
        .map_err(ApiError::from)?;

    Ok(Json(
        views
            .iter()
            .map(TeamChallengeResponse::from)
            .collect::<Vec<_>>()
            .into(),
    ))
}

/// POST /v1/group/challenges/{challenge_id}/submit
pub async fn submit_flag(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(challenge_id): Path<String>,
    Json(request): Json<SubmitFlagRequest>,
) -> Result<Json<GroupFlagResult>, ApiError> {
    let challenge_id: GroupChallengeId = challenge_id.parse()?;
    debug!(user_id = %user.id(), challenge_id = %challenge_id, "Group flag submitted");

    let result = state
        .group_event_service
        .submit_flag(user.id(), &challenge_id, &request.flag)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(result))
}

/// GET /v1/group/challenges/{challenge_id}/stats
pub async fn challenge_stats(
    State(state): State<AppState>,
    RequireUser(_): RequireUser,
    Path(challenge_id): Path<String>,
) -> Result<Json<ChallengeStats>, ApiError> {
    let challenge_id: GroupChallengeId = challenge_id.parse()?;

    let stats = state
        .group_event_service
        .challenge_stats(&challenge_id)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(stats))
}

/// GET /v1/group/leaderboard
pub async fn leaderboard(
    State(state): State<AppState>,
    Query(params): Query<EventLeaderboardParams>,
) -> Result<Json<ListResponse<Ranked<EventTeamEntry>>>, ApiError> {
    let event_id: Option<GroupEventId> = params.event_id.map(|id| id.parse()).transpose()?;

    let entries = state
        .group_event_service
        .leaderboard(event_id.as_ref(), params.limit)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(entries.into()))
}

/// GET /v1/group/ranking
pub async fn team_ranking(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<TeamRanking>, ApiError> {
    let ranking = state
        .group_event_service
        .team_ranking(user.id())
        .await
        .map_err(ApiError::from)?;

    Ok(Json(ranking))
}

/// GET /v1/group/submissions
pub async fn team_submissions(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<ListResponse<GroupSubmission>>, ApiError> {
    let submissions = state
        .group_event_service
        .team_submissions(user.id())
        .await
        .map_err(ApiError::from)?;

    Ok(Json(submissions.into()))
}

/// GET /v1/group/events/{event_id}
pub async fn event_info(
    State(state): State<AppState>,
    RequireUser(_): RequireUser,
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
