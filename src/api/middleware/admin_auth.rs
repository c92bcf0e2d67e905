//! Admin authentication extractor

use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::{debug, warn};

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::user::User;

use super::user_auth::RequireUser;

/// Extractor that requires an authenticated administrator
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub User);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireUser(user) = RequireUser::from_request_parts(parts, state).await?;

        if !user.is_admin() {
            warn!(user_id = %user.id(), "Non-admin attempted admin access");
            return Err(ApiError::forbidden("Admin access required"));
        }

        debug!(user_id = %user.id(), "Admin access granted");
        Ok(RequireAdmin(user))
    }
}
