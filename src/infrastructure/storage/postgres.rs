//! PostgreSQL storage implementation
//!
//! Every entity type lives in its own table of JSONB documents keyed by the
//! entity id. All tables share one connection pool.

use std::fmt::Debug;
use std::marker::PhantomData;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;

use crate::domain::storage::{Storage, StorageEntity, StorageKey};
use crate::domain::DomainError;

/// PostgreSQL connection settings
#[derive(Debug, Clone, Deserialize)]
pub struct PostgresConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connect_timeout_secs() -> u64 {
    30
}

impl PostgresConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }

    /// Opens the shared connection pool
    pub async fn connect(&self) -> Result<PgPool, DomainError> {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(Duration::from_secs(self.connect_timeout_secs))
            .connect(&self.url)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to connect to PostgreSQL: {}", e)))
    }
}

/// SQL statements for one document table, rendered once per table
#[derive(Debug, Clone)]
struct Statements {
    create_table: String,
    select_one: String,
    select_all: String,
    insert: String,
    update: String,
    upsert: String,
    delete: String,
    exists: String,
    count: String,
    clear: String,
}

impl Statements {
    fn for_table(table: &str) -> Self {
        Self {
            create_table: format!(
                "CREATE TABLE IF NOT EXISTS {table} (\
                 key VARCHAR(64) PRIMARY KEY, \
                 data JSONB NOT NULL, \
                 created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(), \
                 updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW())"
            ),
            select_one: format!("SELECT data FROM {table} WHERE key = $1"),
            select_all: format!("SELECT data FROM {table} ORDER BY created_at, key"),
            insert: format!("INSERT INTO {table} (key, data) VALUES ($1, $2)"),
            update: format!("UPDATE {table} SET data = $2, updated_at = NOW() WHERE key = $1"),
            upsert: format!(
                "INSERT INTO {table} (key, data) VALUES ($1, $2) \
                 ON CONFLICT (key) DO UPDATE SET data = EXCLUDED.data, updated_at = NOW()"
            ),
            delete: format!("DELETE FROM {table} WHERE key = $1"),
            exists: format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE key = $1) AS found"),
            count: format!("SELECT COUNT(*) AS total FROM {table}"),
            clear: format!("DELETE FROM {table}"),
        }
    }
}

fn db_error(action: &'static str) -> impl FnOnce(sqlx::Error) -> DomainError {
    move |e| DomainError::storage(format!("Failed to {}: {}", action, e))
}

/// JSONB document table for one entity type
pub struct PostgresStorage<E>
where
    E: StorageEntity,
{
    pool: PgPool,
    table_name: String,
    sql: Statements,
    _entity: PhantomData<E>,
}

impl<E> Debug for PostgresStorage<E>
where
    E: StorageEntity,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresStorage")
            .field("table_name", &self.table_name)
            .finish()
    }
}

impl<E> PostgresStorage<E>
where
    E: StorageEntity,
{
    pub fn new(pool: PgPool, table_name: impl Into<String>) -> Self {
        let table_name = table_name.into();
        Self {
            pool,
            sql: Statements::for_table(&table_name),
            table_name,
            _entity: PhantomData,
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Creates the backing table when it does not exist yet
    pub async fn ensure_table(&self) -> Result<(), DomainError> {
        sqlx::query(&self.sql.create_table)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DomainError::storage(format!("Failed to create table '{}': {}", self.table_name, e))
            })?;
        Ok(())
    }

    fn decode(row: &PgRow) -> Result<E, DomainError> {
        serde_json::from_value(row.get("data"))
            .map_err(|e| DomainError::storage(format!("Corrupt document: {}", e)))
    }

    fn encode(entity: &E) -> Result<(String, serde_json::Value), DomainError> {
        let data = serde_json::to_value(entity)
            .map_err(|e| DomainError::storage(format!("Unserializable document: {}", e)))?;
        Ok((entity.key().as_str().to_string(), data))
    }
}

#[async_trait]
impl<E> Storage<E> for PostgresStorage<E>
where
    E: StorageEntity + 'static,
{
    async fn get(&self, key: &E::Key) -> Result<Option<E>, DomainError> {
        sqlx::query(&self.sql.select_one)
            .bind(key.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("load document"))?
            .as_ref()
            .map(Self::decode)
            .transpose()
    }

    async fn list(&self) -> Result<Vec<E>, DomainError> {
        sqlx::query(&self.sql.select_all)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("list documents"))?
            .iter()
            .map(Self::decode)
            .collect()
    }

    async fn create(&self, entity: E) -> Result<E, DomainError> {
        let (key, data) = Self::encode(&entity)?;

        sqlx::query(&self.sql.insert)
            .bind(&key)
            .bind(&data)
            .execute(&self.pool)
            .await
            .map_err(|e| match e.as_database_error() {
                Some(db) if db.is_unique_violation() => {
                    DomainError::conflict(format!("Document '{}' already exists", key))
                }
                _ => DomainError::storage(format!("Failed to insert document: {}", e)),
            })?;

        Ok(entity)
    }

    async fn update(&self, entity: E) -> Result<E, DomainError> {
        let (key, data) = Self::encode(&entity)?;

        let updated = sqlx::query(&self.sql.update)
            .bind(&key)
            .bind(&data)
            .execute(&self.pool)
            .await
            .map_err(db_error("update document"))?
            .rows_affected();

        if updated == 0 {
            return Err(DomainError::not_found(format!("Document '{}' not found", key)));
        }
        Ok(entity)
    }

    async fn save(&self, entity: E) -> Result<E, DomainError> {
        let (key, data) = Self::encode(&entity)?;

        sqlx::query(&self.sql.upsert)
            .bind(&key)
            .bind(&data)
            .execute(&self.pool)
            .await
            .map_err(db_error("upsert document"))?;

        Ok(entity)
    }

    async fn delete(&self, key: &E::Key) -> Result<bool, DomainError> {
        let deleted = sqlx::query(&self.sql.delete)
            .bind(key.as_str())
            .execute(&self.pool)
            .await
            .map_err(db_error("delete document"))?
            .rows_affected();

        Ok(deleted > 0)
    }

    async fn exists(&self, key: &E::Key) -> Result<bool, DomainError> {
        let row = sqlx::query(&self.sql.exists)
            .bind(key.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("check document"))?;

        Ok(row.get("found"))
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let row = sqlx::query(&self.sql.count)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("count documents"))?;

        let total: i64 = row.get("total");
        Ok(total as usize)
    }

    async fn clear(&self) -> Result<(), DomainError> {
        sqlx::query(&self.sql.clear)
            .execute(&self.pool)
            .await
            .map_err(db_error("clear table"))?;
        Ok(())
    }
}
