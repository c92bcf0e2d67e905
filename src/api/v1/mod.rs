//! Player API endpoints

pub mod challenges;
pub mod chat;
pub mod group;
pub mod profile;
pub mod teams;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use super::state::AppState;

/// Create v1 API router
pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        // Individual competition
        .route("/challenges", get(challenges::list_challenges))
        .route("/challenges/{challenge_id}", get(challenges::get_challenge))
        .route("/challenges/{challenge_id}/submit", post(challenges::submit_flag))
        .route("/challenges/{challenge_id}/hints", get(challenges::list_hints))
        .route("/hints/{hint_id}/unlock", post(challenges::unlock_hint))
        .route("/submissions", get(challenges::list_submissions))
        .route("/leaderboard", get(challenges::leaderboard))
        // Profiles
        .route("/profile", get(profile::my_profile).put(profile::update_profile))
        .route("/users/{user_id}/profile", get(profile::user_profile))
        // Teams
        .route("/teams", get(teams::list_teams).post(teams::create_team))
        .route("/teams/mine", get(teams::my_team))
        .route("/teams/mine/leave", post(teams::leave_team))
        .route("/teams/leaderboard", get(teams::team_leaderboard))
        .route("/teams/{team_id}", get(teams::get_team).put(teams::update_team))
        .route("/teams/{team_id}/join", post(teams::request_join))
        .route("/teams/{team_id}/requests", get(teams::pending_requests))
        .route("/teams/{team_id}/transfer", post(teams::transfer_captaincy))
        .route(
            "/teams/{team_id}/invitations",
            get(teams::sent_invitations).post(teams::send_invitation),
        )
        .route("/join-requests", delete(teams::cancel_join_requests))
        .route("/memberships/{membership_id}", delete(teams::remove_member))
        .route("/memberships/{membership_id}/approve", post(teams::approve_request))
        .route("/memberships/{membership_id}/reject", post(teams::reject_request))
        .route("/invitations", get(teams::my_invitations))
        .route("/invitations/{invitation_id}", delete(teams::cancel_invitation))
        .route("/invitations/{invitation_id}/accept", post(teams::accept_invitation))
        .route("/invitations/{invitation_id}/decline", post(teams::decline_invitation))
        // Team chat
        .route(
            "/teams/{team_id}/chat",
            get(chat::list_messages).post(chat::post_message),
        )
        .route("/teams/{team_id}/chat/read", post(chat::mark_all_read))
        .route("/teams/{team_id}/chat/unread", get(chat::unread_count))
        .route(
            "/messages/{message_id}",
            put(chat::edit_message).delete(chat::delete_message),
        )
        .route("/messages/{message_id}/read", post(chat::mark_read))
        .route("/messages/{message_id}/reactions", post(chat::react))
        .route("/messages/{message_id}/reactions/{emoji}", delete(chat::unreact))
        // Group competition
        .route("/group/status", get(group::status))
        .route("/group/access", get(group::check_access))
        .route("/group/challenges", get(group::list_challenges))
        .route("/group/challenges/{challenge_id}/submit", post(group::submit_flag))
        .route("/group/challenges/{challenge_id}/stats", get(group::challenge_stats))
        .route("/group/leaderboard", get(group::leaderboard))
        .route("/group/ranking", get(group::team_ranking))
        .route("/group/submissions", get(group::team_submissions))
        .route("/group/events/{event_id}", get(group::event_info))
}
