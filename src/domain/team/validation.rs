//! Team validation

use thiserror::Error;

/// Errors that can occur during team validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TeamValidationError {
    #[error("Team name is required")]
    EmptyName,

    #[error("Team name cannot exceed {0} characters")]
    NameTooLong(usize),

    #[error("Team description cannot exceed {0} characters")]
    DescriptionTooLong(usize),

    #[error("Invitation message cannot exceed {0} characters")]
    MessageTooLong(usize),

    #[error("Team size must be between {0} and {1} members")]
    InvalidMaxMembers(u32, u32),
}

const MAX_TEAM_NAME_LENGTH: usize = 100;
const MAX_DESCRIPTION_LENGTH: usize = 500;
const MAX_INVITATION_MESSAGE_LENGTH: usize = 200;
const MIN_MAX_MEMBERS: u32 = 2;
const MAX_MAX_MEMBERS: u32 = 50;

/// Validate a team name (already trimmed)
pub fn validate_team_name(name: &str) -> Result<(), TeamValidationError> {
    if name.is_empty() {
        return Err(TeamValidationError::EmptyName);
    }

    if name.chars().count() > MAX_TEAM_NAME_LENGTH {
        return Err(TeamValidationError::NameTooLong(MAX_TEAM_NAME_LENGTH));
    }

    Ok(())
}

pub fn validate_team_description(description: &str) -> Result<(), TeamValidationError> {
    if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(TeamValidationError::DescriptionTooLong(MAX_DESCRIPTION_LENGTH));
    }

    Ok(())
}

pub fn validate_invitation_message(message: &str) -> Result<(), TeamValidationError> {
    if message.chars().count() > MAX_INVITATION_MESSAGE_LENGTH {
        return Err(TeamValidationError::MessageTooLong(
            MAX_INVITATION_MESSAGE_LENGTH,
        ));
    }

    Ok(())
}

pub fn validate_max_members(max_members: u32) -> Result<(), TeamValidationError> {
    if !(MIN_MAX_MEMBERS..=MAX_MAX_MEMBERS).contains(&max_members) {
        return Err(TeamValidationError::InvalidMaxMembers(
            MIN_MAX_MEMBERS,
            MAX_MAX_MEMBERS,
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_name() {
        assert!(validate_team_name("Segfaults").is_ok());
        assert_eq!(validate_team_name(""), Err(TeamValidationError::EmptyName));
        assert_eq!(
            validate_team_name(&"n".repeat(101)),
            Err(TeamValidationError::NameTooLong(100))
        );
    }

    #[test]
    fn test_description_and_message() {
        assert!(validate_team_description(&"d".repeat(500)).is_ok());
        assert!(validate_team_description(&"d".repeat(501)).is_err());
        assert!(validate_invitation_message(&"m".repeat(200)).is_ok());
        assert_eq!(
            validate_invitation_message(&"m".repeat(201)),
            Err(TeamValidationError::MessageTooLong(200))
        );
    }

    #[test]
    fn test_max_members() {
        assert!(validate_max_members(5).is_ok());
        assert!(validate_max_members(1).is_err());
        assert!(validate_max_members(51).is_err());
    }
}
