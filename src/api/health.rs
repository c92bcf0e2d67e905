//! Liveness and readiness probes

use std::future::Future;
use std::time::Instant;

use axum::{extract::State, http::StatusCode};
use serde::Serialize;

use crate::api::types::Json;
use crate::domain::DomainError;

use super::state::AppState;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Probe body; `checks` is only present on readiness
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub checks: Vec<ComponentCheck>,
}

/// Result of probing one dependency
#[derive(Debug, Serialize)]
pub struct ComponentCheck {
    pub name: &'static str,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub latency_ms: u64,
}

impl HealthResponse {
    fn from_checks(checks: Vec<ComponentCheck>) -> Self {
        let status = if checks.iter().all(|c| c.status == HealthStatus::Healthy) {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unhealthy
        };

        Self {
            status,
            version: VERSION,
            checks,
        }
    }
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::from_checks(Vec::new()))
}

/// GET /health/ready
///
/// 503 when storage or the platform mode record cannot be read.
pub async fn ready_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let checks = vec![
        probe("storage", state.stores.users.count()).await,
        probe("platform_mode", state.group_event_service.platform_mode()).await,
    ];

    let response = HealthResponse::from_checks(checks);
    let code = match response.status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (code, Json(response))
}

/// GET /health/live
pub async fn live_check() -> StatusCode {
    StatusCode::OK
}

async fn probe<T>(
    name: &'static str,
    check: impl Future<Output = Result<T, DomainError>>,
) -> ComponentCheck {
    let start = Instant::now();
    let result = check.await;
    let latency_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(_) => ComponentCheck {
            name,
            status: HealthStatus::Healthy,
            error: None,
            latency_ms,
        },
        Err(e) => ComponentCheck {
            name,
            status: HealthStatus::Unhealthy,
            error: Some(e.to_string()),
            latency_ms,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_probe_reports_failure() {
        let check = probe("storage", async {
            Err::<(), _>(DomainError::storage("connection refused"))
        })
        .await;

        assert_eq!(check.status, HealthStatus::Unhealthy);
        assert!(check.error.unwrap().contains("connection refused"));
    }

    #[test]
    fn test_any_failed_check_is_unhealthy() {
        let response = HealthResponse::from_checks(vec![
            ComponentCheck {
                name: "storage",
                status: HealthStatus::Healthy,
                error: None,
                latency_ms: 1,
            },
            ComponentCheck {
                name: "platform_mode",
                status: HealthStatus::Unhealthy,
                error: Some("boom".to_string()),
                latency_ms: 1,
            },
        ]);

        assert_eq!(response.status, HealthStatus::Unhealthy);
    }

    #[test]
    fn test_liveness_body_omits_checks() {
        let json = serde_json::to_value(HealthResponse::from_checks(Vec::new())).unwrap();

        assert_eq!(json["status"], "healthy");
        assert_eq!(json["version"], VERSION);
        assert!(json.get("checks").is_none());
    }
}
