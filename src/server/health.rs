//! Health check endpoint for liveness probes.
//!
//! Always answers 200 with a fixed payload. Used by the hosting platform to
//! decide whether the container is up.

use axum::Json;
use serde::{Deserialize, Serialize};

/// Body returned by `GET /`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub service: String,
}

/// Health check handler.
///
/// # Example
///
/// ```ignore
/// GET / HTTP/1.1
///
/// HTTP/1.1 200 OK
/// Content-Type: application/json
///
/// {"status":"healthy","service":"EAFC SBC Solver"}
/// ```
pub async fn health_handler() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "healthy".to_string(),
        service: "EAFC SBC Solver".to_string(),
    })
}
