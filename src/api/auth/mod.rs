//! Authentication API endpoints
//!
//! Registration, login and the current user for JWT-based authentication.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, MessageResponse, UserResponse};
use crate::domain::user::{Department, EducationLevel, PersonalDetails, Sex};
use crate::infrastructure::services::RegisterUserRequest;

/// Create the authentication router
pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(get_current_user))
}

/// Registration request
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub sex: Option<Sex>,
    #[serde(default)]
    pub education_level: Option<EducationLevel>,
    #[serde(default)]
    pub department: Option<Department>,
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
    pub expires_at: DateTime<Utc>,
}

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    debug!(username = %request.username, "Registering user");

    let user = state
        .user_service
        .register(RegisterUserRequest {
            username: request.username,
            email: request.email,
            password: request.password,
            first_name: request.first_name,
            last_name: request.last_name,
            details: PersonalDetails {
                sex: request.sex,
                education_level: request.education_level,
                department: request.department,
            },
        })
        .await
        .map_err(ApiError::from)?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// POST /auth/login
///
/// Returns a JWT token on successful authentication.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let result = state
        .user_service
        .login(&request.username, &request.password)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(LoginResponse {
        token: result.token,
        user: UserResponse::from(&result.user),
        expires_at: result.expires_at,
    }))
}

/// POST /auth/logout
///
/// Tokens are stateless; the client discards its copy.
pub async fn logout(_user: RequireUser) -> Result<Json<MessageResponse>, ApiError> {
    Ok(Json(MessageResponse::new("Logged out successfully")))
}

/// GET /auth/me
pub async fn get_current_user(
    RequireUser(user): RequireUser,
) -> Result<Json<UserResponse>, ApiError> {
    Ok(Json(UserResponse::from(&user)))
}
