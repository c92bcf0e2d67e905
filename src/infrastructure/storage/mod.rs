//! Storage infrastructure - Storage implementations

mod factory;
mod in_memory;
mod postgres;

pub use factory::{StorageFactory, StorageType, Stores};
pub use in_memory::InMemoryStorage;
pub use postgres::{PostgresConfig, PostgresStorage};
