//! CTF Platform API
//!
//! Capture-the-flag competition backend with support for:
//! - Individual challenges with flags, hints and a score leaderboard
//! - Teams with join requests, invitations and a team chat
//! - Scheduled group events with per-team attempt limits
//! - Admin broadcasts announcing new challenges

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use tracing::{info, warn};

use api::state::AppState;
use domain::SystemClock;
use infrastructure::{
    auth::{Argon2Hasher, JwtConfig, JwtService},
    services::BootstrapAdminRequest,
    storage::StorageFactory,
};

/// Create the application state from configuration
///
/// Builds the stores for the configured backend and, when enabled, makes
/// sure an admin account exists.
pub async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let storage_type = config.storage.storage_type()?;
    info!(backend = ?storage_type, "Initializing storage");

    let stores =
        StorageFactory::create_stores(storage_type, config.storage.postgres.as_ref()).await?;

    let jwt = JwtService::new(JwtConfig::new(
        config.auth.jwt_secret.clone(),
        config.auth.jwt_expiration_hours,
    ));

    let state = AppState::new(
        stores,
        Arc::new(SystemClock),
        Arc::new(Argon2Hasher::new()),
        Arc::new(jwt),
        config.clone(),
    );

    let bootstrap = &config.auth.bootstrap_admin;
    if bootstrap.enabled {
        let created = state
            .user_service
            .bootstrap_admin(BootstrapAdminRequest {
                username: bootstrap.username.clone(),
                email: bootstrap.email.clone(),
                password: bootstrap.password.clone(),
            })
            .await?;

        if let Some(admin) = created {
            info!(username = %admin.user.username(), "Created bootstrap admin account");
            if let Some(password) = admin.generated_password {
                warn!(
                    username = %admin.user.username(),
                    password = %password,
                    "Generated admin password; change it after first login"
                );
            }
        }
    }

    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_app_state_bootstraps_admin_once() {
        let mut config = AppConfig::default();
        config.auth.bootstrap_admin.password = Some("bootstrap-password".to_string());

        let state = create_app_state(&config).await.unwrap();

        let users = state.stores.users.list().await.unwrap();
        assert_eq!(users.len(), 1);
        assert!(users[0].is_admin());
        assert_eq!(users[0].username(), "admin");
    }

    #[tokio::test]
    async fn test_create_app_state_without_bootstrap() {
        let mut config = AppConfig::default();
        config.auth.bootstrap_admin.enabled = false;

        let state = create_app_state(&config).await.unwrap();

        assert_eq!(state.stores.users.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_create_app_state_rejects_unknown_backend() {
        let mut config = AppConfig::default();
        config.storage.backend = "redis".to_string();

        assert!(create_app_state(&config).await.is_err());
    }
}
