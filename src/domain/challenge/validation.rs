//! Challenge validation

use thiserror::Error;

/// Errors that can occur during challenge validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ChallengeValidationError {
    #[error("Title is required")]
    EmptyTitle,

    #[error("Title cannot exceed {0} characters")]
    TitleTooLong(usize),

    #[error("Description is required")]
    EmptyDescription,

    #[error("Flag is required")]
    EmptyFlag,

    #[error("Points must be greater than zero")]
    ZeroPoints,

    #[error("Points cannot exceed {0}")]
    PointsTooLarge(u32),

    #[error("Minimum team size must be at least 1")]
    ZeroTeamSize,

    #[error("Minimum team size ({0}) cannot exceed maximum team size ({1})")]
    InvertedTeamSize(u32, u32),

    #[error("Team points multiplier must be a positive number")]
    InvalidMultiplier,

    #[error("Hint content is required")]
    EmptyHint,
}

const MAX_TITLE_LENGTH: usize = 200;
pub const MAX_POINTS: u32 = i32::MAX as u32;

pub fn validate_title(title: &str) -> Result<(), ChallengeValidationError> {
    if title.trim().is_empty() {
        return Err(ChallengeValidationError::EmptyTitle);
    }

    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(ChallengeValidationError::TitleTooLong(MAX_TITLE_LENGTH));
    }

    Ok(())
}

pub fn validate_description(description: &str) -> Result<(), ChallengeValidationError> {
    if description.trim().is_empty() {
        return Err(ChallengeValidationError::EmptyDescription);
    }

    Ok(())
}

pub fn validate_flag(flag: &str) -> Result<(), ChallengeValidationError> {
    if flag.trim().is_empty() {
        return Err(ChallengeValidationError::EmptyFlag);
    }

    Ok(())
}

pub fn validate_points(points: u32) -> Result<(), ChallengeValidationError> {
    if points == 0 {
        return Err(ChallengeValidationError::ZeroPoints);
    }

    if points > MAX_POINTS {
        return Err(ChallengeValidationError::PointsTooLarge(MAX_POINTS));
    }

    Ok(())
}

pub fn validate_team_size(min: u32, max: u32) -> Result<(), ChallengeValidationError> {
    if min == 0 {
        return Err(ChallengeValidationError::ZeroTeamSize);
    }

    if min > max {
        return Err(ChallengeValidationError::InvertedTeamSize(min, max));
    }

    Ok(())
}

pub fn validate_multiplier(multiplier: f64) -> Result<(), ChallengeValidationError> {
    if !multiplier.is_finite() || multiplier <= 0.0 {
        return Err(ChallengeValidationError::InvalidMultiplier);
    }

    Ok(())
}

pub fn validate_hint_content(content: &str) -> Result<(), ChallengeValidationError> {
    if content.trim().is_empty() {
        return Err(ChallengeValidationError::EmptyHint);
    }

    Ok(())
}
