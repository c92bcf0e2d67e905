//! Storage factory for runtime backend selection

use std::sync::Arc;

use serde::Deserialize;
use sqlx::postgres::PgPool;
use tokio::sync::{Mutex, MutexGuard};
use tracing::info;

use crate::domain::broadcast::Broadcast;
use crate::domain::challenge::{Challenge, Hint, HintUnlock};
use crate::domain::chat::{MessageReaction, MessageRead, TeamMessage};
use crate::domain::group_event::{GroupChallenge, GroupEvent, GroupSubmission, PlatformMode};
use crate::domain::storage::{Storage, StorageEntity};
use crate::domain::submission::Submission;
use crate::domain::team::{Team, TeamInvitation, TeamMembership};
use crate::domain::user::User;
use crate::domain::DomainError;

use super::in_memory::InMemoryStorage;
use super::postgres::{PostgresConfig, PostgresStorage};

/// Supported storage backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    /// Process memory; for development and tests
    #[default]
    Memory,
    Postgres,
}

impl StorageType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "memory" | "inmemory" | "in-memory" | "in_memory" => Some(Self::Memory),
            "postgres" | "postgresql" | "pg" => Some(Self::Postgres),
            _ => None,
        }
    }
}

/// Storage handles for every entity the platform persists
#[derive(Debug, Clone)]
pub struct Stores {
    pub users: Arc<dyn Storage<User>>,
    pub challenges: Arc<dyn Storage<Challenge>>,
    pub hints: Arc<dyn Storage<Hint>>,
    pub hint_unlocks: Arc<dyn Storage<HintUnlock>>,
    pub submissions: Arc<dyn Storage<Submission>>,
    pub teams: Arc<dyn Storage<Team>>,
    pub memberships: Arc<dyn Storage<TeamMembership>>,
    pub invitations: Arc<dyn Storage<TeamInvitation>>,
    pub events: Arc<dyn Storage<GroupEvent>>,
    pub group_challenges: Arc<dyn Storage<GroupChallenge>>,
    pub group_submissions: Arc<dyn Storage<GroupSubmission>>,
    pub platform_mode: Arc<dyn Storage<PlatformMode>>,
    pub messages: Arc<dyn Storage<TeamMessage>>,
    pub message_reads: Arc<dyn Storage<MessageRead>>,
    pub reactions: Arc<dyn Storage<MessageReaction>>,
    pub broadcasts: Arc<dyn Storage<Broadcast>>,
    write_lock: Arc<Mutex<()>>,
}

impl Stores {
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryStorage::new()),
            challenges: Arc::new(InMemoryStorage::new()),
            hints: Arc::new(InMemoryStorage::new()),
            hint_unlocks: Arc::new(InMemoryStorage::new()),
            submissions: Arc::new(InMemoryStorage::new()),
            teams: Arc::new(InMemoryStorage::new()),
            memberships: Arc::new(InMemoryStorage::new()),
            invitations: Arc::new(InMemoryStorage::new()),
            events: Arc::new(InMemoryStorage::new()),
            group_challenges: Arc::new(InMemoryStorage::new()),
            group_submissions: Arc::new(InMemoryStorage::new()),
            platform_mode: Arc::new(InMemoryStorage::new()),
            messages: Arc::new(InMemoryStorage::new()),
            message_reads: Arc::new(InMemoryStorage::new()),
            reactions: Arc::new(InMemoryStorage::new()),
            broadcasts: Arc::new(InMemoryStorage::new()),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Builds PostgreSQL-backed stores on a shared pool, creating tables as needed
    pub async fn postgres(pool: PgPool) -> Result<Self, DomainError> {
        Ok(Self {
            users: StorageFactory::postgres_table(&pool, "ctf_users").await?,
            challenges: StorageFactory::postgres_table(&pool, "ctf_challenges").await?,
            hints: StorageFactory::postgres_table(&pool, "ctf_hints").await?,
            hint_unlocks: StorageFactory::postgres_table(&pool, "ctf_hint_unlocks").await?,
            submissions: StorageFactory::postgres_table(&pool, "ctf_submissions").await?,
            teams: StorageFactory::postgres_table(&pool, "ctf_teams").await?,
            memberships: StorageFactory::postgres_table(&pool, "ctf_team_memberships").await?,
            invitations: StorageFactory::postgres_table(&pool, "ctf_team_invitations").await?,
            events: StorageFactory::postgres_table(&pool, "ctf_group_events").await?,
            group_challenges: StorageFactory::postgres_table(&pool, "ctf_group_challenges")
                .await?,
            group_submissions: StorageFactory::postgres_table(&pool, "ctf_group_submissions")
                .await?,
            platform_mode: StorageFactory::postgres_table(&pool, "ctf_platform_mode").await?,
            messages: StorageFactory::postgres_table(&pool, "ctf_team_messages").await?,
            message_reads: StorageFactory::postgres_table(&pool, "ctf_message_reads").await?,
            reactions: StorageFactory::postgres_table(&pool, "ctf_message_reactions").await?,
            broadcasts: StorageFactory::postgres_table(&pool, "ctf_broadcasts").await?,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Serializes multi-record check-then-write sequences across all services.
    ///
    /// Hold the guard from the first read that a decision depends on until the
    /// last write; clones of `Stores` share the same lock.
    pub async fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().await
    }
}

/// Factory for creating storage instances
#[derive(Debug)]
pub struct StorageFactory;

impl StorageFactory {
    /// Creates every store for the selected backend
    pub async fn create_stores(
        storage_type: StorageType,
        postgres: Option<&PostgresConfig>,
    ) -> Result<Stores, DomainError> {
        match storage_type {
            StorageType::Memory => {
                info!("Using in-memory storage");
                Ok(Stores::in_memory())
            }
            StorageType::Postgres => {
                let config = postgres.ok_or_else(|| {
                    DomainError::configuration(
                        "storage.postgres.url is required for the postgres backend",
                    )
                })?;
                info!("Using PostgreSQL storage");
                let pool = config.connect().await?;
                Stores::postgres(pool).await
            }
        }
    }

    async fn postgres_table<E>(
        pool: &PgPool,
        table_name: &str,
    ) -> Result<Arc<dyn Storage<E>>, DomainError>
    where
        E: StorageEntity + 'static,
    {
        let storage = PostgresStorage::<E>::new(pool.clone(), table_name);
        storage.ensure_table().await?;
        Ok(Arc::new(storage))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::User;

    #[test]
    fn test_storage_type_parse() {
        assert_eq!(StorageType::parse("memory"), Some(StorageType::Memory));
        assert_eq!(StorageType::parse("In-Memory"), Some(StorageType::Memory));
        assert_eq!(StorageType::parse("postgresql"), Some(StorageType::Postgres));
        assert_eq!(StorageType::parse("pg"), Some(StorageType::Postgres));
        assert_eq!(StorageType::parse("redis"), None);
    }

    #[tokio::test]
    async fn test_in_memory_stores_are_independent() {
        let stores = StorageFactory::create_stores(StorageType::Memory, None)
            .await
            .unwrap();

        stores
            .users
            .create(User::new("alice", "alice@ctf.local", "hash"))
            .await
            .unwrap();

        assert_eq!(stores.users.count().await.unwrap(), 1);
        assert_eq!(stores.teams.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_postgres_requires_config() {
        let result = StorageFactory::create_stores(StorageType::Postgres, None).await;
        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }
}
