//! In-memory storage implementation

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::storage::{Storage, StorageEntity, StorageKey};
use crate::domain::DomainError;

#[derive(Debug)]
struct Entries<E> {
    next_seq: u64,
    by_key: HashMap<String, (u64, E)>,
}

/// Thread-safe in-memory storage implementation
///
/// Entities are listed in creation order, matching the PostgreSQL backend.
/// Data is lost when the process terminates.
#[derive(Debug)]
pub struct InMemoryStorage<E>
where
    E: StorageEntity,
{
    entries: RwLock<Entries<E>>,
}

impl<E> Default for InMemoryStorage<E>
where
    E: StorageEntity,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E> InMemoryStorage<E>
where
    E: StorageEntity,
{
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Entries {
                next_seq: 0,
                by_key: HashMap::new(),
            }),
        }
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Entries<E>>, DomainError> {
        self.entries
            .read()
            .map_err(|e| DomainError::storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Entries<E>>, DomainError> {
        self.entries
            .write()
            .map_err(|e| DomainError::storage(format!("Failed to acquire write lock: {}", e)))
    }
}

#[async_trait]
impl<E> Storage<E> for InMemoryStorage<E>
where
    E: StorageEntity + 'static,
{
    async fn get(&self, key: &E::Key) -> Result<Option<E>, DomainError> {
        Ok(self
            .read()?
            .by_key
            .get(key.as_str())
            .map(|(_, entity)| entity.clone()))
    }

    async fn list(&self) -> Result<Vec<E>, DomainError> {
        let entries = self.read()?;
        let mut items: Vec<&(u64, E)> = entries.by_key.values().collect();
        items.sort_by_key(|(seq, _)| *seq);

        Ok(items.into_iter().map(|(_, entity)| entity.clone()).collect())
    }

    async fn create(&self, entity: E) -> Result<E, DomainError> {
        let key = entity.key().as_str().to_string();
        let mut entries = self.write()?;

        if entries.by_key.contains_key(&key) {
            return Err(DomainError::conflict(format!(
                "Entity with key '{}' already exists",
                key
            )));
        }

        let seq = entries.next_seq;
        entries.next_seq += 1;
        entries.by_key.insert(key, (seq, entity.clone()));
        Ok(entity)
    }

    async fn update(&self, entity: E) -> Result<E, DomainError> {
        let key = entity.key().as_str().to_string();
        let mut entries = self.write()?;

        match entries.by_key.get_mut(&key) {
            Some((_, stored)) => {
                *stored = entity.clone();
                Ok(entity)
            }
            None => Err(DomainError::not_found(format!(
                "Entity with key '{}' not found",
                key
            ))),
        }
    }

    async fn delete(&self, key: &E::Key) -> Result<bool, DomainError> {
        Ok(self.write()?.by_key.remove(key.as_str()).is_some())
    }

    async fn exists(&self, key: &E::Key) -> Result<bool, DomainError> {
        Ok(self.read()?.by_key.contains_key(key.as_str()))
    }

    async fn count(&self) -> Result<usize, DomainError> {
        Ok(self.read()?.by_key.len())
    }

    async fn clear(&self) -> Result<(), DomainError> {
        self.write()?.by_key.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::storage::StorageExt;
    use crate::domain::team::Team;
    use crate::domain::user::UserId;

    fn team(name: &str) -> Team {
        Team::new(name, "", UserId::generate(), 5)
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let storage = InMemoryStorage::<Team>::new();
        let created = storage.create(team("Owls")).await.unwrap();

        let fetched = storage.get(created.id()).await.unwrap().unwrap();
        assert_eq!(fetched.name(), "Owls");
    }

    #[tokio::test]
    async fn test_create_conflict() {
        let storage = InMemoryStorage::<Team>::new();
        let created = storage.create(team("Owls")).await.unwrap();

        let result = storage.create(created).await;
        assert!(matches!(result, Err(DomainError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_update_missing_entity() {
        let storage = InMemoryStorage::<Team>::new();

        let result = storage.update(team("Ghosts")).await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_list_keeps_creation_order_across_updates() {
        let storage = InMemoryStorage::<Team>::new();
        let mut first = storage.create(team("First")).await.unwrap();
        storage.create(team("Second")).await.unwrap();
        storage.create(team("Third")).await.unwrap();

        first.set_description("updated");
        storage.update(first).await.unwrap();

        let names: Vec<String> = storage
            .list()
            .await
            .unwrap()
            .iter()
            .map(|t| t.name().to_string())
            .collect();
        assert_eq!(names, vec!["First", "Second", "Third"]);
    }

    #[tokio::test]
    async fn test_delete_and_count() {
        let storage = InMemoryStorage::<Team>::new();
        let created = storage.create(team("Owls")).await.unwrap();
        storage.create(team("Bats")).await.unwrap();

        assert_eq!(storage.count().await.unwrap(), 2);
        assert!(storage.delete(created.id()).await.unwrap());
        assert!(!storage.delete(created.id()).await.unwrap());
        assert_eq!(storage.count().await.unwrap(), 1);

        storage.clear().await.unwrap();
        assert_eq!(storage.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_save_creates_then_updates() {
        let storage = InMemoryStorage::<Team>::new();
        let mut owls = storage.save(team("Owls")).await.unwrap();

        owls.set_open(false);
        storage.save(owls.clone()).await.unwrap();

        assert_eq!(storage.count().await.unwrap(), 1);
        assert!(!storage.get(owls.id()).await.unwrap().unwrap().is_open());
    }

    #[tokio::test]
    async fn test_find_helpers() {
        let storage = InMemoryStorage::<Team>::new();
        storage.create(team("Owls")).await.unwrap();
        storage.create(team("Bats")).await.unwrap();

        let found = storage.find_one(|t| t.name() == "Bats").await.unwrap();
        assert!(found.is_some());

        let all = storage.find_all(|t| t.name().starts_with('O')).await.unwrap();
        assert_eq!(all.len(), 1);

        let missing = storage.require(&crate::domain::team::TeamId::generate(), "Team").await;
        assert!(matches!(missing, Err(DomainError::NotFound { .. })));
    }
}
