//! Shared API types

pub mod error;
pub mod json;
pub mod resources;

pub use error::{ApiError, ApiErrorResponse, ApiErrorType};
pub use json::Json;
pub use resources::{
    ChallengeResponse, GroupChallengeResponse, ListResponse, MessageResponse, UserResponse,
};
