//! API endpoint handlers.
//!
//! Handlers parse the JSON body, then run the blocking pipeline (downloads,
//! assistant round trip, PDF rendering) on the blocking pool.

pub mod analyze;
pub mod health;
pub mod report;

use axum::extract::rejection::JsonRejection;
use axum::Json;

use crate::api::error::ApiError;

/// Unwrap a JSON body, turning axum's rejection into our error shape.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

/// Run blocking work off the async runtime.
pub(crate) async fn run_blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError::Internal(format!("blocking task failed: {e}")))?
}
