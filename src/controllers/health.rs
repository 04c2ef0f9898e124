//! Health check endpoints
//!
//! Provides endpoints for monitoring service liveness and database readiness

use actix_web::web::{Data, Json};
use actix_web::{HttpResponse, Responder, get};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::DatabaseManager;

/// Liveness health check response (simple)
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LivenessResponse {
    /// Service status
    pub status: String,
    /// Timestamp of the check
    pub timestamp: DateTime<Utc>,
}

/// Readiness health check response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadinessResponse {
    /// Service readiness status
    pub status: String,
    /// Timestamp of the check
    pub timestamp: DateTime<Utc>,
    /// Connection manager state
    pub database: String,
}

/// Liveness check endpoint
///
/// Simple check that returns 200 OK if service is running.
/// This endpoint should ALWAYS return 200 OK (no dependencies checked).
/// Used for Kubernetes liveness probes.
#[get("/health")]
pub async fn health() -> impl Responder {
    let response = LivenessResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
    };

    ::tracing::debug!("Liveness check: healthy");
    Json(response)
}

/// Readiness probe
///
/// For Kubernetes readiness probes - checks if service is ready to accept
/// traffic. Reports the connection manager state without touching the pool;
/// readiness is amortized into the manager's flag, not probed per request.
#[get("/ready")]
pub async fn ready(manager: Data<DatabaseManager>) -> impl Responder {
    let is_ready = manager.is_ready();
    let status = if is_ready { "ready" } else { "not_ready" };

    let response = ReadinessResponse {
        status: status.to_string(),
        timestamp: Utc::now(),
        database: manager.state().to_string(),
    };

    ::tracing::debug!(
        status = %response.status,
        database = %response.database,
        "Readiness check performed"
    );

    if is_ready {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}
