//! Domain layer - Core business logic and entities

pub mod broadcast;
pub mod challenge;
pub mod chat;
pub mod clock;
pub mod error;
pub mod group_event;
pub mod id;
pub mod leaderboard;
pub mod storage;
pub mod submission;
pub mod team;
pub mod user;

pub use clock::{Clock, SystemClock};
pub use error::DomainError;
pub use storage::{Storage, StorageEntity, StorageExt, StorageKey};
