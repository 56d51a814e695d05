//! `POST /api/analyze` — download the pair, ask the assistant, normalize.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::analysis::{analyze_images, normalize_response, AnalysisResult};
use crate::api::endpoints::{json_body, run_blocking};
use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::fetch::download_image;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub before_image_url: String,
    pub after_image_url: String,
    #[serde(default)]
    pub procedures: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub analysis: AnalysisResult,
    pub raw_response: String,
}

pub async fn analyze(
    State(ctx): State<ApiContext>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let request = json_body(payload)?;
    let response = run_blocking(move || run_analysis(&ctx, &request)).await?;
    Ok(Json(response))
}

fn run_analysis(ctx: &ApiContext, request: &AnalyzeRequest) -> Result<AnalyzeResponse, ApiError> {
    let _span = tracing::info_span!("analyze_request", procedures = request.procedures.len())
        .entered();

    let http = ctx
        .download_client()
        .map_err(|e| ApiError::Internal(format!("HTTP client: {e}")))?;
    let before = download_image(&http, &request.before_image_url)?;
    let after = download_image(&http, &request.after_image_url)?;

    let assistant = ctx.assistants.create(&ctx.config)?;
    let raw_response = analyze_images(
        assistant.as_ref(),
        &ctx.config.assistant_id,
        before.path(),
        after.path(),
        &request.procedures,
        ctx.poll,
    )?;

    let analysis = normalize_response(&raw_response)?;
    tracing::info!(regions = ?analysis.areas.keys(), "Analysis complete");

    Ok(AnalyzeResponse {
        success: true,
        analysis,
        raw_response,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::analysis::RunStatus;
    use crate::api::router::api_router;
    use crate::api::types::test_support::{mock_context, serve_fixture_images, MockAssistantFactory};

    const REPLY: &str = "```json\n{\"areas\":{\"nose\":{\"score\":\"b\",\"metrics\":{\"texture_improvement\":12}}},\"global\":{\"harmony\":90}}\n```";

    async fn post(ctx: ApiContext, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/api/analyze")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = api_router(ctx).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), 1 << 20).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn analyze_returns_normalized_result() {
        let base = serve_fixture_images().await;
        let ctx = mock_context(MockAssistantFactory::replying(REPLY));

        let (status, json) = post(
            ctx,
            serde_json::json!({
                "before_image_url": format!("{base}/before.png"),
                "after_image_url": format!("{base}/after.png"),
                "procedures": ["Botox"],
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
        assert_eq!(json["raw_response"], REPLY);
        assert_eq!(json["analysis"]["areas"]["nose"]["score"], "B");
        assert_eq!(json["analysis"]["areas"]["nose"]["overall_score"], 12.0);
        assert!(json["analysis"]["areas"].get("forehead").is_none());
        assert_eq!(json["analysis"]["global"]["symmetry"]["after"], 90.0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn empty_url_is_bad_request() {
        let ctx = mock_context(MockAssistantFactory::replying(REPLY));
        let (status, json) = post(
            ctx,
            serde_json::json!({"before_image_url": "", "after_image_url": "http://x/a.png"}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn missing_field_is_bad_request() {
        let ctx = mock_context(MockAssistantFactory::replying(REPLY));
        let (status, json) = post(ctx, serde_json::json!({"before_image_url": "x"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn unreachable_image_is_upstream_failure() {
        let base = serve_fixture_images().await;
        let ctx = mock_context(MockAssistantFactory::replying(REPLY));
        let (status, json) = post(
            ctx,
            serde_json::json!({
                "before_image_url": format!("{base}/before.png"),
                "after_image_url": format!("{base}/nowhere.png"),
            }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(json["error"]["code"], "UPSTREAM_FAILED");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn unparseable_reply_is_502() {
        let base = serve_fixture_images().await;
        let ctx = mock_context(MockAssistantFactory::replying("Sorry, I can't help with that."));
        let (status, json) = post(
            ctx,
            serde_json::json!({
                "before_image_url": format!("{base}/before.png"),
                "after_image_url": format!("{base}/after.png"),
            }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(json["error"]["code"], "UNPARSEABLE_RESPONSE");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn stuck_run_is_gateway_timeout() {
        let base = serve_fixture_images().await;
        let mut factory = MockAssistantFactory::replying(REPLY);
        factory.final_status = RunStatus::InProgress;
        let ctx = mock_context(factory);

        let (status, json) = post(
            ctx,
            serde_json::json!({
                "before_image_url": format!("{base}/before.png"),
                "after_image_url": format!("{base}/after.png"),
            }),
        )
        .await;

        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(json["error"]["code"], "UPSTREAM_TIMEOUT");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn missing_token_is_upstream_failure() {
        let base = serve_fixture_images().await;
        let ctx = ApiContext::new(crate::config::ServiceConfig::default());
        let (status, json) = post(
            ctx,
            serde_json::json!({
                "before_image_url": format!("{base}/before.png"),
                "after_image_url": format!("{base}/after.png"),
            }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(json["error"]["message"], "OpenAI token not configured");
    }
}
