//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::analysis::AnalysisError;
use crate::fetch::FetchError;
use crate::report::ReportError;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Upstream service failed: {0}")]
    UpstreamFailed(String),
    #[error("Upstream service timed out: {0}")]
    UpstreamTimeout(String),
    #[error("Unparseable upstream response: {0}")]
    Unparseable(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::BadRequest(detail) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail),
            ApiError::UpstreamFailed(detail) => {
                tracing::warn!(detail, "Upstream failure");
                (StatusCode::BAD_GATEWAY, "UPSTREAM_FAILED", detail)
            }
            ApiError::UpstreamTimeout(detail) => {
                tracing::warn!(detail, "Upstream timeout");
                (StatusCode::GATEWAY_TIMEOUT, "UPSTREAM_TIMEOUT", detail)
            }
            ApiError::Unparseable(detail) => {
                tracing::warn!(detail, "Unparseable assistant response");
                (StatusCode::BAD_GATEWAY, "UNPARSEABLE_RESPONSE", detail)
            }
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };
        (status, Json(body)).into_response()
    }
}

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::ExternalService(detail) => ApiError::UpstreamFailed(detail),
            e @ AnalysisError::Timeout { .. } => ApiError::UpstreamTimeout(e.to_string()),
            AnalysisError::Parse(detail) => ApiError::Unparseable(detail),
            AnalysisError::Io(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<FetchError> for ApiError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Validation(detail) => ApiError::BadRequest(detail),
            FetchError::Http(detail) => ApiError::UpstreamFailed(detail),
            FetchError::Io(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), 4096).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn bad_request_returns_400_with_detail() {
        let response = ApiError::BadRequest("URL is empty".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
        assert_eq!(json["error"]["message"], "URL is empty");
    }

    #[tokio::test]
    async fn internal_hides_detail() {
        let response = ApiError::Internal("disk on fire".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "INTERNAL");
        assert_eq!(json["error"]["message"], "An internal error occurred");
    }

    #[tokio::test]
    async fn analysis_errors_map_to_status() {
        let cases = [
            (AnalysisError::ExternalService("x".into()), StatusCode::BAD_GATEWAY, "UPSTREAM_FAILED"),
            (AnalysisError::Timeout { waited_secs: 300 }, StatusCode::GATEWAY_TIMEOUT, "UPSTREAM_TIMEOUT"),
            (AnalysisError::Parse("x".into()), StatusCode::BAD_GATEWAY, "UNPARSEABLE_RESPONSE"),
            (
                AnalysisError::Io(std::io::Error::from(std::io::ErrorKind::NotFound)),
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL",
            ),
        ];
        for (err, status, code) in cases {
            let response = ApiError::from(err).into_response();
            assert_eq!(response.status(), status);
            assert_eq!(body_json(response).await["error"]["code"], code);
        }
    }

    #[tokio::test]
    async fn fetch_errors_map_to_status() {
        let response = ApiError::from(FetchError::Validation("empty".into())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = ApiError::from(FetchError::Http("404".into())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn report_errors_are_internal() {
        let err = ReportError::Pdf("save error".into());
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
