//! Admin API endpoints for managing the competition

pub mod broadcasts;
pub mod challenges;
pub mod events;
pub mod lifecycle;
pub mod users;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use super::state::AppState;

/// Create admin API router
pub fn create_admin_router() -> Router<AppState> {
    Router::new()
        // Challenge catalog
        .route("/challenges", get(challenges::list_challenges))
        .route("/challenges", post(challenges::create_challenge))
        .route("/challenges/{challenge_id}", get(challenges::get_challenge))
        .route("/challenges/{challenge_id}", put(challenges::update_challenge))
        .route("/challenges/{challenge_id}", delete(challenges::delete_challenge))
        .route("/challenges/{challenge_id}/hints", post(challenges::add_hint))
        .route("/hints/{hint_id}", delete(challenges::delete_hint))
        // Users
        .route("/users", get(users::list_users))
        .route("/users/recalculate-scores", post(users::recalculate_scores))
        .route("/users/{user_id}/suspend", post(users::suspend_user))
        .route("/users/{user_id}/activate", post(users::activate_user))
        // Group events
        .route("/events", get(events::list_events))
        .route("/events", post(events::create_event))
        .route("/events/{event_id}", get(events::get_event))
        .route("/events/{event_id}", put(events::update_event))
        .route("/events/{event_id}", delete(events::delete_event))
        .route("/events/{event_id}/activate", post(events::activate_event))
        .route("/events/{event_id}/deactivate", post(events::deactivate_event))
        .route("/events/{event_id}/status", get(lifecycle::event_status))
        .route("/events/{event_id}/results", get(lifecycle::event_results))
        .route("/events/{event_id}/challenges", get(events::list_event_challenges))
        .route("/events/{event_id}/challenges", post(events::create_event_challenge))
        .route("/group-challenges/{challenge_id}", get(events::get_group_challenge))
        .route("/group-challenges/{challenge_id}", put(events::update_group_challenge))
        .route("/group-challenges/{challenge_id}", delete(events::delete_group_challenge))
        .route("/platform-mode", get(events::platform_mode))
        // Lifecycle
        .route("/lifecycle/summary", get(lifecycle::summary))
        .route("/lifecycle/run", post(lifecycle::run))
        .route("/lifecycle/cleanup", post(lifecycle::cleanup))
        .route("/lifecycle/history", get(lifecycle::history))
        // Broadcasts
        .route("/broadcasts", get(broadcasts::list_broadcasts))
        .route("/broadcasts/{broadcast_id}/recipients", get(broadcasts::recipients))
        .route("/broadcasts/{broadcast_id}/sent", post(broadcasts::mark_sent))
}
