//! Infrastructure layer - Storage, authentication and application services

pub mod auth;
pub mod logging;
pub mod observability;
pub mod services;
pub mod storage;
