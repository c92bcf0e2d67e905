//! API error envelope

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Error categories reported in the `type` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorType {
    InvalidRequestError,
    AuthenticationError,
    PermissionError,
    NotFoundError,
    ConflictError,
    ServerError,
}

impl std::fmt::Display for ApiErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRequestError => write!(f, "invalid_request_error"),
            Self::AuthenticationError => write!(f, "authentication_error"),
            Self::PermissionError => write!(f, "permission_error"),
            Self::NotFoundError => write!(f, "not_found_error"),
            Self::ConflictError => write!(f, "conflict_error"),
            Self::ServerError => write!(f, "server_error"),
        }
    }
}

/// Error response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

/// Error detail structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: ApiErrorType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// API error with status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ApiErrorResponse,
}

impl ApiError {
    pub fn new(
        status: StatusCode,
        error_type: ApiErrorType,
        message: impl Into<String>,
    ) -> Self {
        Self {
            status,
            response: ApiErrorResponse {
                error: ApiErrorDetail {
                    message: message.into(),
                    error_type,
                    param: None,
                    code: None,
                },
            },
        }
    }

    /// Add parameter info
    pub fn with_param(mut self, param: impl Into<String>) -> Self {
        self.response.error.param = Some(param.into());
        self
    }

    /// Add error code
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.response.error.code = Some(code.into());
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ApiErrorType::InvalidRequestError, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, ApiErrorType::AuthenticationError, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, ApiErrorType::PermissionError, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, ApiErrorType::NotFoundError, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, ApiErrorType::ConflictError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, ApiErrorType::ServerError, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match &err {
            DomainError::NotFound { message } => Self::not_found(message),
            DomainError::Validation { message } => Self::bad_request(message),
            DomainError::InvalidId { message } => Self::bad_request(message).with_param("id"),
            DomainError::Conflict { message } => Self::conflict(message),
            DomainError::Forbidden { message } => Self::forbidden(message),
            DomainError::Unauthorized { message } => Self::unauthorized(message),
            DomainError::AccessDenied { message, code } => {
                Self::forbidden(message).with_code(*code)
            }
            DomainError::Configuration { message }
            | DomainError::Internal { message }
            | DomainError::Storage { message } => {
                tracing::error!(error = %err, "Request failed with server error");
                Self::internal(message)
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}",
            self.response.error.error_type, self.response.error.message
        )
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_with_param() {
        let err = ApiError::bad_request("Invalid value")
            .with_param("points")
            .with_code("invalid_type");

        assert_eq!(err.response.error.param, Some("points".to_string()));
        assert_eq!(err.response.error.code, Some("invalid_type".to_string()));
    }

    #[test]
    fn test_domain_error_conversion() {
        let cases = [
            (DomainError::not_found("Challenge not found"), StatusCode::NOT_FOUND),
            (DomainError::validation("Flag is required"), StatusCode::BAD_REQUEST),
            (DomainError::invalid_id("bad id"), StatusCode::BAD_REQUEST),
            (DomainError::conflict("Username taken"), StatusCode::CONFLICT),
            (DomainError::forbidden("Captain only"), StatusCode::FORBIDDEN),
            (DomainError::unauthorized("Invalid token"), StatusCode::UNAUTHORIZED),
            (DomainError::storage("disk"), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (domain_err, status) in cases {
            let api_err: ApiError = domain_err.into();
            assert_eq!(api_err.status, status);
        }
    }

    #[test]
    fn test_access_denied_keeps_code() {
        let api_err: ApiError =
            DomainError::access_denied("You must be part of a team", "no_team").into();

        assert_eq!(api_err.status, StatusCode::FORBIDDEN);
        assert_eq!(api_err.response.error.error_type, ApiErrorType::PermissionError);
        assert_eq!(api_err.response.error.code.as_deref(), Some("no_team"));
        assert_eq!(api_err.response.error.message, "You must be part of a team");
    }

    #[test]
    fn test_error_serialization() {
        let err = ApiError::conflict("Team name already exists");
        let json = serde_json::to_value(&err.response).unwrap();

        assert_eq!(json["error"]["type"], "conflict_error");
        assert_eq!(json["error"]["message"], "Team name already exists");
        assert!(json["error"].get("param").is_none());
    }

    #[test]
    fn test_error_type_display_matches_wire_name() {
        let types = [
            ApiErrorType::InvalidRequestError,
            ApiErrorType::AuthenticationError,
            ApiErrorType::PermissionError,
            ApiErrorType::NotFoundError,
            ApiErrorType::ConflictError,
            ApiErrorType::ServerError,
        ];

        for error_type in types {
            let wire = serde_json::to_value(error_type).unwrap();
            assert_eq!(wire, error_type.to_string());
        }
    }
}
