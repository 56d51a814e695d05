//! Service status endpoint.

use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub message: &'static str,
    pub status: &'static str,
}

/// `GET /` — liveness check.
pub async fn root() -> Json<StatusResponse> {
    Json(StatusResponse {
        message: "GlowMetrics Analysis API",
        status: "running",
    })
}
