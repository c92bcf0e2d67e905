//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, AuthConfig, BootstrapAdminConfig, CompetitionConfig, LogFormat, LoggingConfig,
    ServerConfig, StorageConfig,
};
