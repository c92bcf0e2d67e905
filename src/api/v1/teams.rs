//! Team endpoints: registry, join requests, roster changes and invitations

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, ListResponse, MessageResponse};
use crate::domain::leaderboard::Ranked;
use crate::domain::team::{InvitationId, MembershipId, Team, TeamId, TeamInvitation, TeamMembership};
use crate::domain::user::UserId;
use crate::infrastructure::services::{
    CreateTeamRequest, TeamDetail, TeamEntry, TeamSummary, UpdateTeamRequest,
};

use super::challenges::LeaderboardParams;

#[derive(Debug, Deserialize)]
pub struct CreateTeamApiRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTeamApiRequest {
    pub description: Option<String>,
    pub is_open: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct TransferCaptaincyRequest {
    pub new_captain_id: String,
}

#[derive(Debug, Deserialize)]
pub struct SendInvitationRequest {
    pub email: String,
    #[serde(default)]
    pub message: String,
}

/// Caller's team, if any
#[derive(Debug, Serialize)]
pub struct MyTeamResponse {
    pub team: Option<TeamDetail>,
}

/// How many pending requests were withdrawn
#[derive(Debug, Serialize)]
pub struct CancelledRequestsResponse {
    pub cancelled: usize,
}

/// GET /v1/teams
pub async fn list_teams(
    State(state): State<AppState>,
    RequireUser(_): RequireUser,
) -> Result<Json<ListResponse<TeamSummary>>, ApiError> {
    let teams = state.team_service.list_teams().await.map_err(ApiError::from)?;
    Ok(Json(teams.into()))
}

/// POST /v1/teams
pub async fn create_team(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(request): Json<CreateTeamApiRequest>,
) -> Result<(StatusCode, Json<Team>), ApiError> {
    debug!(user_id = %user.id(), name = %request.name, "Creating team");

    let team = state
        .team_service
        .create_team(
            user.id(),
            CreateTeamRequest {
                name: request.name,
                description: request.description,
            },
        )
        .await
        .map_err(ApiError::from)?;

    Ok((StatusCode::CREATED, Json(team)))
}

/// GET /v1/teams/{team_id}
pub async fn get_team(
    State(state): State<AppState>,
    RequireUser(_): RequireUser,
    Path(team_id): Path<String>,
) -> Result<Json<TeamDetail>, ApiError> {
    let team_id: TeamId = team_id.parse()?;

    let detail = state
        .team_service
        .team_detail(&team_id)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(detail))
}

/// PUT /v1/teams/{team_id}
pub async fn update_team(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(team_id): Path<String>,
    Json(request): Json<UpdateTeamApiRequest>,
) -> Result<Json<Team>, ApiError> {
    let team_id: TeamId = team_id.parse()?;
    debug!(team_id = %team_id, "Updating team settings");

    let team = state
        .team_service
        .update_team(
            user.id(),
            &team_id,
            UpdateTeamRequest {
                description: request.description,
                is_open: request.is_open,
            },
        )
        .await
        .map_err(ApiError::from)?;

    Ok(Json(team))
}

/// GET /v1/teams/mine
pub async fn my_team(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<MyTeamResponse>, ApiError> {
    let team = state
        .team_service
        .my_team(user.id())
        .await
        .map_err(ApiError::from)?;

    Ok(Json(MyTeamResponse { team }))
}

/// POST /v1/teams/mine/leave
pub async fn leave_team(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .team_service
        .leave_team(user.id())
        .await
        .map_err(ApiError::from)?;

    Ok(Json(MessageResponse::new("You have left the team")))
}

/// GET /v1/teams/leaderboard
pub async fn team_leaderboard(
    State(state): State<AppState>,
    Query(params): Query<LeaderboardParams>,
) -> Result<Json<ListResponse<Ranked<TeamEntry>>>, ApiError> {
    let entries = state
        .team_service
        .leaderboard(params.limit)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(entries.into()))
}

/// POST /v1/teams/{team_id}/join
pub async fn request_join(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(team_id): Path<String>,
) -> Result<(StatusCode, Json<TeamMembership>), ApiError> {
    let team_id: TeamId = team_id.parse()?;
    debug!(user_id = %user.id(), team_id = %team_id, "Requesting to join team");

    let membership = state
        .team_service
        .request_join(user.id(), &team_id)
        .await
        .map_err(ApiError::from)?;

    Ok((StatusCode::CREATED, Json(membership)))
}

/// DELETE /v1/join-requests
pub async fn cancel_join_requests(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<CancelledRequestsResponse>, ApiError> {
    let cancelled = state
        .team_service
        .cancel_join_requests(user.id())
        .await
        .map_err(ApiError::from)?;

    Ok(Json(CancelledRequestsResponse { cancelled }))
}

/// GET /v1/teams/{team_id}/requests
pub async fn pending_requests(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(team_id): Path<String>,
) -> Result<Json<ListResponse<TeamMembership>>, ApiError> {
    let team_id: TeamId = team_id.parse()?;

    let requests = state
        .team_service
        .pending_requests(user.id(), &team_id)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(requests.into()))
}

/// POST /v1/memberships/{membership_id}/approve
pub async fn approve_request(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(membership_id): Path<String>,
) -> Result<Json<TeamMembership>, ApiError> {
    let membership_id: MembershipId = membership_id.parse()?;

    let membership = state
        .team_service
        .approve(user.id(), &membership_id)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(membership))
}

/// POST /v1/memberships/{membership_id}/reject
pub async fn reject_request(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(membership_id): Path<String>,
) -> Result<Json<TeamMembership>, ApiError> {
    let membership_id: MembershipId = membership_id.parse()?;

    let membership = state
        .team_service
        .reject(user.id(), &membership_id)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(membership))
}

/// DELETE /v1/memberships/{membership_id}
pub async fn remove_member(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(membership_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let membership_id: MembershipId = membership_id.parse()?;

    state
        .team_service
        .remove_member(user.id(), &membership_id)
        .await
        .map_err(ApiError::from)?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /v1/teams/{team_id}/transfer
pub async fn transfer_captaincy(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(team_id): Path<String>,
    Json(request): Json<TransferCaptaincyRequest>,
) -> Result<Json<Team>, ApiError> {
    let team_id: TeamId = team_id.parse()?;
    let new_captain_id: UserId = request.new_captain_id.parse()?;

    let team = state
        .team_service
        .transfer_captaincy(user.id(), &team_id, &new_captain_id)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(team))
}

/// GET /v1/teams/{team_id}/invitations
pub async fn sent_invitations(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(team_id): Path<String>,
) -> Result<Json<ListResponse<TeamInvitation>>, ApiError> {
    let team_id: TeamId = team_id.parse()?;

    let invitations = state
        .team_service
        .sent_invitations(user.id(), &team_id)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(invitations.into()))
}

/// POST /v1/teams/{team_id}/invitations
pub async fn send_invitation(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(team_id): Path<String>,
    Json(request): Json<SendInvitationRequest>,
) -> Result<(StatusCode, Json<TeamInvitation>), ApiError> {
    let team_id: TeamId = team_id.parse()?;
    debug!(team_id = %team_id, "Sending team invitation");

    let invitation = state
        .team_service
        .send_invitation(user.id(), &team_id, &request.email, &request.message)
        .await
        .map_err(ApiError::from)?;

    Ok((StatusCode::CREATED, Json(invitation)))
}

/// GET /v1/invitations
pub async fn my_invitations(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<ListResponse<TeamInvitation>>, ApiError> {
    let invitations = state
        .team_service
        .list_invitations(user.id())
        .await
        .map_err(ApiError::from)?;

    Ok(Json(invitations.into()))
}

/// POST /v1/invitations/{invitation_id}/accept
pub async fn accept_invitation(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(invitation_id): Path<String>,
) -> Result<Json<TeamMembership>, ApiError> {
    let invitation_id: InvitationId = invitation_id.parse()?;

    let membership = state
        .team_service
        .accept_invitation(user.id(), &invitation_id)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(membership))
}

/// POST /v1/invitations/{invitation_id}/decline
pub async fn decline_invitation(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(invitation_id): Path<String>,
) -> Result<Json<TeamInvitation>, ApiError> {
    let invitation_id: InvitationId = invitation_id.parse()?;

    let invitation = state
        .team_service
        .decline_invitation(user.id(), &invitation_id)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(invitation))
}

/// DELETE /v1/invitations/{invitation_id}
pub async fn cancel_invitation(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(invitation_id): Path<String>,
) -> Result<Json<TeamInvitation>, ApiError> {
    let invitation_id: InvitationId = invitation_id.parse()?;

    let invitation = state
        .team_service
        .cancel_invitation(user.id(), &invitation_id)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(invitation))
}
