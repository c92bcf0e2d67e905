//! User validation utilities

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use validator::ValidateEmail;

/// Errors that can occur during user validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UserValidationError {
    #[error("Username cannot be empty")]
    EmptyUsername,

    #[error("Username is too short. Minimum length is {0} characters")]
    UsernameTooShort(usize),

    #[error("Username exceeds maximum length of {0} characters")]
    UsernameTooLong(usize),

    #[error("Username cannot contain '@'")]
    UsernameContainsAt,

    #[error("Username can only contain letters, numbers, and underscores")]
    InvalidUsernameCharacter,

    #[error("Enter a valid email address")]
    InvalidEmail,

    #[error("{0} is required")]
    EmptyName(&'static str),

    #[error("{0} exceeds maximum length of {1} characters")]
    NameTooLong(&'static str, usize),

    #[error("{0} can only contain letters")]
    InvalidNameCharacter(&'static str),

    #[error("Password is too short. Minimum length is {0} characters")]
    PasswordTooShort(usize),

    #[error("Password exceeds maximum length of {0} characters")]
    PasswordTooLong(usize),
}

const MIN_USERNAME_LENGTH: usize = 3;
const MAX_USERNAME_LENGTH: usize = 150;
const MAX_NAME_LENGTH: usize = 30;
const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_PASSWORD_LENGTH: usize = 128;

static USERNAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9_]+$").expect("username pattern is valid")
});

static NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z]+$").expect("name pattern is valid"));

/// Validate a username
///
/// Rules:
/// - 3 to 150 characters
/// - Letters, numbers and underscores only
/// - Never an email address
pub fn validate_username(username: &str) -> Result<(), UserValidationError> {
    if username.is_empty() {
        return Err(UserValidationError::EmptyUsername);
    }

    if username.contains('@') {
        return Err(UserValidationError::UsernameContainsAt);
    }

    if username.len() < MIN_USERNAME_LENGTH {
        return Err(UserValidationError::UsernameTooShort(MIN_USERNAME_LENGTH));
    }

    if username.len() > MAX_USERNAME_LENGTH {
        return Err(UserValidationError::UsernameTooLong(MAX_USERNAME_LENGTH));
    }

    if !USERNAME_PATTERN.is_match(username) {
        return Err(UserValidationError::InvalidUsernameCharacter);
    }

    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), UserValidationError> {
    if !email.validate_email() {
        return Err(UserValidationError::InvalidEmail);
    }

    Ok(())
}

/// Validate a first or last name: required, letters only, at most 30 characters
pub fn validate_person_name(field: &'static str, name: &str) -> Result<(), UserValidationError> {
    if name.is_empty() {
        return Err(UserValidationError::EmptyName(field));
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(UserValidationError::NameTooLong(field, MAX_NAME_LENGTH));
    }

    if !NAME_PATTERN.is_match(name) {
        return Err(UserValidationError::InvalidNameCharacter(field));
    }

    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), UserValidationError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(UserValidationError::PasswordTooShort(MIN_PASSWORD_LENGTH));
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(UserValidationError::PasswordTooLong(MAX_PASSWORD_LENGTH));
    }

    Ok(())
}
