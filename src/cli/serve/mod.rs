//! Serve command - runs the HTTP API and the event lifecycle scheduler

use std::net::SocketAddr;
use std::time::Duration;

use clap::Args;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};

use crate::api::create_router;
use crate::config::AppConfig;
use crate::infrastructure::logging;
use crate::infrastructure::observability::init_metrics;
use crate::infrastructure::services::spawn_lifecycle_task;

/// Overrides applied on top of the loaded configuration
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Address to bind
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long, short)]
    pub port: Option<u16>,

    /// Storage backend (memory or postgres)
    #[arg(long)]
    pub storage: Option<String>,
}

/// Run the API server until Ctrl+C or SIGTERM
pub async fn run(args: ServeArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let mut config = AppConfig::load()?;
    apply_overrides(&mut config, args);
    config.validate()?;

    logging::init_logging(&config.logging);

    let state = crate::create_app_state(&config).await?;
    let metrics = init_metrics(&config.observability.metrics);

    let lifecycle = match config.competition.lifecycle_interval_secs {
        0 => {
            info!("Event lifecycle scheduler disabled");
            None
        }
        secs => Some(spawn_lifecycle_task(
            state.lifecycle_service.clone(),
            Duration::from_secs(secs),
        )),
    };

    let app = create_router(state, metrics);

    let addr = build_socket_addr(&config)?;
    info!("Starting CTF platform on {}", addr);

    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = lifecycle {
        handle.abort();
    }

    info!("Server shutdown complete");

    Ok(())
}

fn apply_overrides(config: &mut AppConfig, args: ServeArgs) {
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(storage) = args.storage {
        config.storage.backend = storage;
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

fn build_socket_addr(config: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_replace_loaded_values() {
        let mut config = AppConfig::default();

        apply_overrides(
            &mut config,
            ServeArgs {
                host: Some("127.0.0.1".to_string()),
                port: Some(3000),
                storage: None,
            },
        );

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.storage.backend, "memory");
    }

    #[test]
    fn test_build_socket_addr() {
        let mut config = AppConfig::default();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = 8088;

        let addr = build_socket_addr(&config).unwrap();
        assert_eq!(addr.to_string(), "127.0.0.1:8088");

        config.server.host = "not-an-ip".to_string();
        assert!(build_socket_addr(&config).is_err());
    }
}
