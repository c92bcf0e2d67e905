use axum::{middleware, routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::infrastructure::observability::{create_metrics_router, PrometheusMetrics};

use super::admin;
use super::auth;
use super::health;
use super::middleware::{
    logging_middleware, metrics_middleware, request_validation_middleware,
    security_headers_middleware,
};
use super::state::AppState;
use super::v1;

/// Create the full router with application state and middleware
pub fn create_router(state: AppState, metrics: Option<PrometheusMetrics>) -> Router {
    let metrics_path = state.config.observability.metrics.path.clone();

    let mut router = Router::new()
        // Health endpoints
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::ready_check))
        .route("/health/live", get(health::live_check))
        // Registration and login
        .nest("/auth", auth::create_auth_router())
        // Player API
        .nest("/v1", v1::create_v1_router())
        // Admin API
        .nest("/admin", admin::create_admin_router())
        .with_state(state)
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(request_validation_middleware))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive());

    if let Some(m) = metrics {
        router = router.merge(create_metrics_router(m, &metrics_path));
    }

    router
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::infrastructure::services::BootstrapAdminRequest;

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    async fn register_and_login(app: &Router, username: &str) -> String {
        let (status, _) = send(
            app,
            Method::POST,
            "/auth/register",
            None,
            Some(json!({
                "username": username,
                "email": format!("{}@ctf.local", username),
                "password": "correct-horse"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        login(app, username, "correct-horse").await
    }

    async fn login(app: &Router, username: &str, password: &str) -> String {
        let (status, body) = send(
            app,
            Method::POST,
            "/auth/login",
            None,
            Some(json!({"username": username, "password": password})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }

    async fn admin_token(state: &AppState, app: &Router) -> String {
        state
            .user_service
            .bootstrap_admin(BootstrapAdminRequest {
                username: "root".to_string(),
                email: "root@ctf.local".to_string(),
                password: Some("admin-password".to_string()),
            })
            .await
            .unwrap();
        login(app, "root", "admin-password").await
    }

    #[tokio::test]
    async fn test_health_sets_security_headers() {
        let app = create_router(AppState::in_memory(), None);

        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-content-type-options"], "nosniff");
        assert_eq!(response.headers()["x-frame-options"], "DENY");
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_readiness_reports_storage() {
        let app = create_router(AppState::in_memory(), None);

        let (status, body) = send(&app, Method::GET, "/health/ready", None, None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["checks"][0]["name"], "storage");
        assert_eq!(body["checks"][0]["status"], "healthy");
    }

    #[tokio::test]
    async fn test_register_login_and_me() {
        let app = create_router(AppState::in_memory(), None);
        let token = register_and_login(&app, "alice").await;

        let (status, body) = send(&app, Method::GET, "/auth/me", Some(&token), None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "alice");
        assert_eq!(body["role"], "player");
        assert!(body.get("password_hash").is_none());
    }

    #[tokio::test]
    async fn test_duplicate_registration_conflicts() {
        let app = create_router(AppState::in_memory(), None);
        register_and_login(&app, "alice").await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/auth/register",
            None,
            Some(json!({
                "username": "alice",
                "email": "other@ctf.local",
                "password": "correct-horse"
            })),
        )
        .await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["type"], "conflict_error");
    }

    #[tokio::test]
    async fn test_player_routes_require_token() {
        let app = create_router(AppState::in_memory(), None);

        let (status, body) = send(&app, Method::GET, "/v1/challenges", None, None).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["type"], "authentication_error");
    }

    #[tokio::test]
    async fn test_admin_routes_reject_players() {
        let app = create_router(AppState::in_memory(), None);
        let token = register_and_login(&app, "alice").await;

        let (status, body) = send(&app, Method::GET, "/admin/users", Some(&token), None).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["message"], "Admin access required");
    }

    #[tokio::test]
    async fn test_malformed_json_uses_error_envelope() {
        let app = create_router(AppState::in_memory(), None);

        let response = app
            .oneshot(
                Request::post("/auth/login")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "json_parse_error");
    }

    #[tokio::test]
    async fn test_group_access_denial_carries_code() {
        let app = create_router(AppState::in_memory(), None);
        let token = register_and_login(&app, "solo").await;

        let (status, body) = send(&app, Method::GET, "/v1/group/challenges", Some(&token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["code"], "not_in_team");

        let (status, body) = send(&app, Method::GET, "/v1/group/access", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["has_access"], false);
        assert_eq!(body["denial"]["reason"], "not_authenticated");
    }

    #[tokio::test]
    async fn test_challenge_publish_and_solve_flow() {
        let state = AppState::in_memory();
        let app = create_router(state.clone(), None);
        let admin = admin_token(&state, &app).await;
        let player = register_and_login(&app, "alice").await;

        let (status, challenge) = send(
            &app,
            Method::POST,
            "/admin/challenges",
            Some(&admin),
            Some(json!({
                "title": "Cookie Monster",
                "description": "Find the cookie",
                "category": "web",
                "difficulty": "easy",
                "points": 100,
                "flag": "flag{cookie}"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(challenge.get("flag").is_none());
        let challenge_id = challenge["id"].as_str().unwrap().to_string();

        let (_, broadcasts) = send(&app, Method::GET, "/admin/broadcasts", Some(&admin), None).await;
        assert_eq!(broadcasts["total"], 1);

        let submit_uri = format!("/v1/challenges/{}/submit", challenge_id);
        let (status, result) = send(
            &app,
            Method::POST,
            &submit_uri,
            Some(&player),
            Some(json!({"flag": "flag{nope}"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(result["correct"], false);
        assert_eq!(result["message"], "Incorrect flag. Try again!");

        let (_, result) = send(
            &app,
            Method::POST,
            &submit_uri,
            Some(&player),
            Some(json!({"flag": "flag{cookie}"})),
        )
        .await;
        assert_eq!(result["correct"], true);
        assert_eq!(result["message"], "Correct! You earned 100 points!");

        let (_, listing) = send(&app, Method::GET, "/v1/challenges", Some(&player), None).await;
        assert_eq!(listing["items"][0]["solved"], true);

        let (_, board) = send(&app, Method::GET, "/v1/leaderboard", None, None).await;
        assert_eq!(board["items"][0]["competitor"]["username"], "alice");
        assert_eq!(board["items"][0]["rank"], 1);
        assert_eq!(board["items"][0]["score"], 100);
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let app = create_router(AppState::in_memory(), None);

        let (status, _) = send(&app, Method::GET, "/v1//challenges", None, None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_invalid_path_id_is_bad_request() {
        let app = create_router(AppState::in_memory(), None);
        let token = register_and_login(&app, "alice").await;

        let (status, body) =
            send(&app, Method::GET, "/v1/challenges/not%20an%20id", Some(&token), None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["param"], "id");
    }
}
