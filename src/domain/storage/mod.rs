//! Storage domain - Generic storage abstraction layer

use std::fmt::Debug;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use crate::domain::DomainError;

/// Trait for types that can be used as storage keys
pub trait StorageKey: Clone + Debug + Send + Sync + Eq + std::hash::Hash {
    /// Returns the key as a string for storage backends that require string keys
    fn as_str(&self) -> &str;
}

/// Trait for types that can be stored
pub trait StorageEntity: Clone + Debug + Send + Sync + Serialize + DeserializeOwned {
    type Key: StorageKey;

    fn key(&self) -> &Self::Key;
}

/// Generic storage trait for CRUD operations on any entity type
#[async_trait]
pub trait Storage<E>: Send + Sync + Debug
where
    E: StorageEntity + 'static,
{
    /// Retrieves an entity by its key
    async fn get(&self, key: &E::Key) -> Result<Option<E>, DomainError>;

    /// Retrieves all entities
    async fn list(&self) -> Result<Vec<E>, DomainError>;

    /// Creates a new entity, returns error if already exists
    async fn create(&self, entity: E) -> Result<E, DomainError>;

    /// Updates an existing entity, returns error if not found
    async fn update(&self, entity: E) -> Result<E, DomainError>;

    /// Saves an entity (creates if not exists, updates if exists)
    async fn save(&self, entity: E) -> Result<E, DomainError> {
        if self.exists(entity.key()).await? {
            self.update(entity).await
        } else {
            self.create(entity).await
        }
    }

    /// Deletes an entity by its key, returns true if deleted
    async fn delete(&self, key: &E::Key) -> Result<bool, DomainError>;

    async fn exists(&self, key: &E::Key) -> Result<bool, DomainError> {
        Ok(self.get(key).await?.is_some())
    }

    async fn count(&self) -> Result<usize, DomainError> {
        Ok(self.list().await?.len())
    }

    /// Clears all entities (use with caution)
    async fn clear(&self) -> Result<(), DomainError>;
}

/// Predicate queries layered over any [`Storage`]
#[async_trait]
pub trait StorageExt<E>: Storage<E>
where
    E: StorageEntity + 'static,
{
    /// Returns every entity matching the predicate
    async fn find_all<F>(&self, predicate: F) -> Result<Vec<E>, DomainError>
    where
        F: Fn(&E) -> bool + Send + Sync,
    {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|entity| predicate(entity))
            .collect())
    }

    /// Returns the first entity matching the predicate
    async fn find_one<F>(&self, predicate: F) -> Result<Option<E>, DomainError>
    where
        F: Fn(&E) -> bool + Send + Sync,
    {
        Ok(self.list().await?.into_iter().find(|entity| predicate(entity)))
    }

    /// Fetches an entity or fails with a not-found error naming it
    async fn require(&self, key: &E::Key, what: &str) -> Result<E, DomainError> {
        self.get(key)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("{} '{}' not found", what, key.as_str())))
    }
}

impl<E, S> StorageExt<E> for S
where
    E: StorageEntity + 'static,
    S: Storage<E> + ?Sized,
{
}
