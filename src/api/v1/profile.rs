//! Player profile endpoints

use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, UserResponse};
use crate::domain::user::{Department, EducationLevel, PersonalDetails, Sex, UserId};
use crate::infrastructure::services::{CategorySolves, UpdateProfileRequest, UserProfile};

/// Profile with rank and per-category solves
#[derive(Debug, Clone, Serialize)]
pub struct ProfileResponse {
    pub user: UserResponse,
    pub rank: usize,
    pub categories: Vec<CategorySolves>,
}

impl From<&UserProfile> for ProfileResponse {
    fn from(profile: &UserProfile) -> Self {
        Self {
            user: UserResponse::from(&profile.user),
            rank: profile.rank,
            categories: profile.categories.clone(),
        }
    }
}

/// Profile update body; omitted fields keep their value
#[derive(Debug, Deserialize)]
pub struct UpdateProfileApiRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub sex: Option<Sex>,
    pub education_level: Option<EducationLevel>,
    pub department: Option<Department>,
}

/// GET /v1/profile
pub async fn my_profile(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<ProfileResponse>, ApiError> {
    let profile = state
        .user_service
        .profile(user.id())
        .await
        .map_err(ApiError::from)?;

    Ok(Json(ProfileResponse::from(&profile)))
}

/// PUT /v1/profile
pub async fn update_profile(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(request): Json<UpdateProfileApiRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    debug!(user_id = %user.id(), "Updating own profile");

    let details = if request.sex.is_some()
        || request.education_level.is_some()
        || request.department.is_some()
    {
        let current = user.details();
        Some(PersonalDetails {
            sex: request.sex.or(current.sex),
            education_level: request.education_level.or(current.education_level),
            department: request.department.or(current.department),
        })
    } else {
        None
    };

    let updated = state
        .user_service
        .update_profile(
            user.id(),
            UpdateProfileRequest {
                first_name: request.first_name,
                last_name: request.last_name,
                details,
            },
        )
        .await
        .map_err(ApiError::from)?;

    Ok(Json(UserResponse::from(&updated)))
}

/// GET /v1/users/{user_id}/profile
pub async fn user_profile(
    State(state): State<AppState>,
    RequireUser(_): RequireUser,
    Path(user_id): Path<String>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user_id: UserId = user_id.parse()?;

    let profile = state
        .user_service
        .profile(&user_id)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(ProfileResponse::from(&profile)))
}
