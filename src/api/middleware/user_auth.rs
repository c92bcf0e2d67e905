//! User authentication extractors using JWT bearer tokens

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::user::User;

/// Authenticated, active user; rejects with 401 otherwise
#[derive(Debug, Clone)]
pub struct RequireUser(pub User);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_jwt_token(&parts.headers)?;

        debug!(route = %parts.uri.path(), "Authenticating bearer token");

        let user = state
            .user_service
            .authenticate_token(&token)
            .await
            .map_err(ApiError::from)?;

        Ok(RequireUser(user))
    }
}

/// Extractor for endpoints that also answer anonymous callers
///
/// A missing or invalid token yields `None` instead of a rejection.
#[derive(Debug, Clone)]
pub struct OptionalUser(pub Option<User>);

impl FromRequestParts<AppState> for OptionalUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(OptionalUser(try_jwt_auth(&parts.headers, state).await))
    }
}

/// Bearer token from the `Authorization` header
pub fn extract_jwt_token(headers: &HeaderMap) -> Result<String, ApiError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Err(ApiError::unauthorized("Login required: send 'Authorization: Bearer <token>'"));
    };

    let value = value
        .to_str()
        .map_err(|_| ApiError::bad_request("Authorization header is not valid ASCII"))?;

    value
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::unauthorized("Authorization header must use the Bearer scheme"))
}

/// Resolves the caller when a valid token is present
pub async fn try_jwt_auth(headers: &HeaderMap, state: &AppState) -> Option<User> {
    let token = extract_jwt_token(headers).ok()?;
    state.user_service.authenticate_token(&token).await.ok()
}
