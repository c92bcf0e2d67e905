//! Identifier newtypes shared by every entity

use thiserror::Error;

/// Errors that can occur during identifier validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum IdValidationError {
    #[error("{0} cannot be empty")]
    Empty(&'static str),

    #[error("{0} exceeds maximum length of {1} characters")]
    TooLong(&'static str, usize),

    #[error("{0} contains invalid character: '{1}'. Only alphanumeric characters, hyphens and underscores are allowed")]
    InvalidCharacter(&'static str, char),
}

const MAX_ID_LENGTH: usize = 64;

/// Validate an entity identifier
///
/// Generated identifiers are UUID v4 strings; anything alphanumeric with
/// hyphens or underscores up to 64 characters is accepted.
pub fn validate_id(kind: &'static str, id: &str) -> Result<(), IdValidationError> {
    if id.is_empty() {
        return Err(IdValidationError::Empty(kind));
    }

    if id.len() > MAX_ID_LENGTH {
        return Err(IdValidationError::TooLong(kind, MAX_ID_LENGTH));
    }

    if let Some(c) = id
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && *c != '-' && *c != '_')
    {
        return Err(IdValidationError::InvalidCharacter(kind, c));
    }

    Ok(())
}

/// Declares a validated string identifier usable as a storage key
macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord,
            serde::Serialize, serde::Deserialize,
        )]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Create an identifier after validation
            pub fn new(
                id: impl Into<String>,
            ) -> Result<Self, $crate::domain::id::IdValidationError> {
                let id = id.into();
                $crate::domain::id::validate_id(stringify!($name), &id)?;
                Ok(Self(id))
            }

            /// Generate a fresh random identifier
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = $crate::domain::id::IdValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::domain::DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s).map_err(|e| $crate::domain::DomainError::invalid_id(e.to_string()))
            }
        }

        impl $crate::domain::storage::StorageKey for $name {
            fn as_str(&self) -> &str {
                &self.0
            }
        }
    };
}

pub(crate) use entity_id;
