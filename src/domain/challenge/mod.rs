//! Challenge domain
//!
//! The individual challenge catalog, hashed flags and hints.

mod entity;
mod flag;
mod hint;
mod validation;

pub use entity::{
    Category, Challenge, ChallengeId, ChallengeType, Difficulty, DEFAULT_MAX_TEAM_SIZE,
    DEFAULT_MIN_TEAM_SIZE,
};
pub use flag::HashedFlag;
pub use hint::{Hint, HintId, HintUnlock, HintUnlockId};
pub use validation::{
    validate_description, validate_flag, validate_hint_content, validate_multiplier,
    validate_points, validate_team_size, validate_title, ChallengeValidationError,
};
