use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid ID format: {message}")]
    InvalidId { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// A typed refusal with a stable machine-readable code
    #[error("Access denied: {message}")]
    AccessDenied { message: String, code: &'static str },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Joins a list of collected validation failures into one error
    pub fn validation_list(errors: &[String]) -> Self {
        Self::validation(errors.join("; "))
    }

    pub fn invalid_id(message: impl Into<String>) -> Self {
        Self::InvalidId {
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    pub fn access_denied(message: impl Into<String>, code: &'static str) -> Self {
        Self::AccessDenied {
            message: message.into(),
            code,
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Message without the variant prefix, suitable for API responses
    pub fn message(&self) -> &str {
        match self {
            Self::NotFound { message }
            | Self::Validation { message }
            | Self::InvalidId { message }
            | Self::Conflict { message }
            | Self::Forbidden { message }
            | Self::Unauthorized { message }
            | Self::AccessDenied { message, .. }
            | Self::Configuration { message }
            | Self::Internal { message }
            | Self::Storage { message } => message,
        }
    }
}
