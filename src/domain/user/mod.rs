//! User domain
//!
//! Accounts, roles and the individual competition profile.

mod entity;
mod validation;

pub use entity::{
    Department, EducationLevel, PersonalDetails, Profile, Sex, User, UserId, UserRole, UserStatus,
};
pub use validation::{
    validate_email, validate_password, validate_person_name, validate_username,
    UserValidationError,
};
