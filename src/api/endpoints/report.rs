//! `POST /api/generate-pdf` — render a report from a finished analysis.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisResult;
use crate::api::endpoints::{json_body, run_blocking};
use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::fetch::download_image;
use crate::report::render_report;

#[derive(Debug, Deserialize)]
pub struct GeneratePdfRequest {
    pub before_url: String,
    pub after_url: String,
    pub analysis_results: AnalysisResult,
}

#[derive(Debug, Serialize)]
pub struct GeneratePdfResponse {
    pub success: bool,
    pub pdf_base64: String,
}

pub async fn generate_pdf(
    State(ctx): State<ApiContext>,
    payload: Result<Json<GeneratePdfRequest>, JsonRejection>,
) -> Result<Json<GeneratePdfResponse>, ApiError> {
    let request = json_body(payload)?;
    let pdf = run_blocking(move || {
        let _span = tracing::info_span!("generate_pdf_request").entered();
        let http = ctx
            .download_client()
            .map_err(|e| ApiError::Internal(format!("HTTP client: {e}")))?;
        let before = download_image(&http, &request.before_url)?;
        let after = download_image(&http, &request.after_url)?;
        Ok(render_report(before.path(), after.path(), &request.analysis_results)?)
    })
    .await?;

    tracing::info!(size = pdf.len(), "Report generated");

    Ok(Json(GeneratePdfResponse {
        success: true,
        pdf_base64: base64::engine::general_purpose::STANDARD.encode(pdf),
    }))
}
