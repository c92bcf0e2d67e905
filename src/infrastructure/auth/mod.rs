//! Authentication infrastructure module
//!
//! Password hashing and JWT bearer tokens.

mod jwt;
mod password;

pub use jwt::{JwtClaims, JwtConfig, JwtGenerator, JwtService};
pub use password::{Argon2Hasher, PasswordHasher};
