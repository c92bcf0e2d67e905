use serde::Deserialize;

use crate::domain::team::{validate_max_members, DEFAULT_MAX_MEMBERS};
use crate::infrastructure::observability::ObservabilityConfig;
use crate::infrastructure::storage::{PostgresConfig, StorageType};

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub competition: CompetitionConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// `memory` or `postgres`
    #[serde(default = "default_storage_backend")]
    pub backend: String,
    pub postgres: Option<PostgresConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    #[serde(default = "default_jwt_expiration_hours")]
    pub jwt_expiration_hours: u64,
    /// Admin account created when the user store is empty
    #[serde(default)]
    pub bootstrap_admin: BootstrapAdminConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapAdminConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_admin_username")]
    pub username: String,
    #[serde(default = "default_admin_email")]
    pub email: String,
    /// A random password is generated and logged when unset
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompetitionConfig {
    /// Seconds between event lifecycle checks; 0 disables the scheduler
    #[serde(default = "default_lifecycle_interval_secs")]
    pub lifecycle_interval_secs: u64,
    #[serde(default = "default_max_members")]
    pub default_max_members: u32,
    #[serde(default = "default_leaderboard_limit")]
    pub leaderboard_limit: usize,
}

fn default_storage_backend() -> String {
    "memory".to_string()
}

fn default_jwt_expiration_hours() -> u64 {
    24
}

fn default_true() -> bool {
    true
}

fn default_admin_username() -> String {
    "admin".to_string()
}

fn default_admin_email() -> String {
    "admin@ctf.local".to_string()
}

fn default_lifecycle_interval_secs() -> u64 {
    60
}

fn default_max_members() -> u32 {
    DEFAULT_MAX_MEMBERS
}

fn default_leaderboard_limit() -> usize {
    50
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_storage_backend(),
            postgres: None,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "change-me-in-production".to_string(),
            jwt_expiration_hours: default_jwt_expiration_hours(),
            bootstrap_admin: BootstrapAdminConfig::default(),
        }
    }
}

impl Default for BootstrapAdminConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            username: default_admin_username(),
            email: default_admin_email(),
            password: None,
        }
    }
}

impl Default for CompetitionConfig {
    fn default() -> Self {
        Self {
            lifecycle_interval_secs: default_lifecycle_interval_secs(),
            default_max_members: default_max_members(),
            leaderboard_limit: default_leaderboard_limit(),
        }
    }
}

impl StorageConfig {
    pub fn storage_type(&self) -> Result<StorageType, config::ConfigError> {
        StorageType::parse(&self.backend).ok_or_else(|| {
            config::ConfigError::Message(format!(
                "Unknown storage backend '{}' (expected memory or postgres)",
                self.backend
            ))
        })
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let app_config: Self = config.try_deserialize()?;
        app_config.validate()?;
        Ok(app_config)
    }

    /// Rejects settings the services cannot run with
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        self.storage.storage_type()?;

        validate_max_members(self.competition.default_max_members).map_err(|e| {
            config::ConfigError::Message(format!("competition.default_max_members: {}", e))
        })?;

        if self.competition.leaderboard_limit == 0 {
            return Err(config::ConfigError::Message(
                "competition.leaderboard_limit must be greater than 0".to_string(),
            ));
        }

        if self.auth.jwt_secret.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "auth.jwt_secret is required".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.storage_type().unwrap(), StorageType::Memory);
        assert_eq!(config.competition.leaderboard_limit, 50);
        assert!(config.auth.bootstrap_admin.enabled);
    }

    #[test]
    fn test_partial_sections_fill_defaults() {
        let config: AppConfig = serde_json::from_str(
            r#"{
                "logging": {"level": "debug", "format": "json"},
                "competition": {"lifecycle_interval_secs": 5}
            }"#,
        )
        .unwrap();

        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.competition.lifecycle_interval_secs, 5);
        assert_eq!(config.competition.default_max_members, DEFAULT_MAX_MEMBERS);
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.storage.backend = "sqlite".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.competition.default_max_members = 1;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.competition.leaderboard_limit = 0;
        assert!(config.validate().is_err());
    }
}
