//! Shared state for the HTTP layer.

use std::sync::Arc;
use std::time::Duration;

use crate::analysis::{AnalysisError, AssistantClient, OpenAiAssistantClient, PollPolicy};
use crate::config::ServiceConfig;

// ═══════════════════════════════════════════════════════════
// Assistant construction
// ═══════════════════════════════════════════════════════════

/// Builds an assistant client per request.
///
/// Clients are blocking and must be created and dropped on the blocking pool,
/// so handlers call this from inside `spawn_blocking`.
pub trait AssistantFactory: Send + Sync {
    fn create(&self, config: &ServiceConfig) -> Result<Box<dyn AssistantClient>, AnalysisError>;
}

/// Production factory: OpenAI Assistants API with the configured token.
pub struct OpenAiAssistantFactory;

impl AssistantFactory for OpenAiAssistantFactory {
    fn create(&self, config: &ServiceConfig) -> Result<Box<dyn AssistantClient>, AnalysisError> {
        let api_key = config
            .openai_api_key
            .as_deref()
            .ok_or_else(|| AnalysisError::ExternalService("OpenAI token not configured".into()))?;
        let client = OpenAiAssistantClient::new(
            &config.openai_base_url,
            api_key,
            config.http_timeout_secs,
        )?;
        Ok(Box::new(client))
    }
}

// ═══════════════════════════════════════════════════════════
// API context
// ═══════════════════════════════════════════════════════════

/// Shared context for all API routes.
#[derive(Clone)]
pub struct ApiContext {
    pub config: Arc<ServiceConfig>,
    pub assistants: Arc<dyn AssistantFactory>,
    pub poll: PollPolicy,
}

impl ApiContext {
    pub fn new(config: ServiceConfig) -> Self {
        Self::with_factory(config, Arc::new(OpenAiAssistantFactory))
    }

    pub fn with_factory(config: ServiceConfig, assistants: Arc<dyn AssistantFactory>) -> Self {
        Self {
            config: Arc::new(config),
            assistants,
            poll: PollPolicy::default(),
        }
    }

    /// Blocking HTTP client for image downloads, bounded by the configured timeout.
    pub fn download_client(&self) -> Result<reqwest::blocking::Client, reqwest::Error> {
        reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(self.config.http_timeout_secs))
            .build()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::analysis::{MockAssistantClient, RunStatus};

    /// Hands out scripted mock clients.
    pub struct MockAssistantFactory {
        pub reply: String,
        pub final_status: RunStatus,
    }

    impl MockAssistantFactory {
        pub fn replying(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                final_status: RunStatus::Completed,
            }
        }
    }

    impl AssistantFactory for MockAssistantFactory {
        fn create(&self, _config: &ServiceConfig) -> Result<Box<dyn AssistantClient>, AnalysisError> {
            Ok(Box::new(
                MockAssistantClient::new(&self.reply)
                    .with_statuses(vec![RunStatus::Queued], self.final_status),
            ))
        }
    }

    pub fn fast_poll() -> PollPolicy {
        PollPolicy {
            interval: Duration::from_millis(1),
            max_wait: Duration::from_millis(50),
        }
    }

    pub fn mock_context(factory: MockAssistantFactory) -> ApiContext {
        let mut ctx = ApiContext::with_factory(ServiceConfig::default(), Arc::new(factory));
        ctx.poll = fast_poll();
        ctx
    }

    /// Serve generated PNGs at `/{name}` on an ephemeral port; unknown paths 404.
    pub async fn serve_fixture_images() -> String {
        use axum::routing::get;

        async fn png() -> impl axum::response::IntoResponse {
            let img = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
                24,
                32,
                image::Rgb([210, 170, 160]),
            ));
            let mut buf = std::io::Cursor::new(Vec::new());
            img.write_to(&mut buf, image::ImageOutputFormat::Png).unwrap();
            buf.into_inner()
        }

        let app = axum::Router::new()
            .route("/before.png", get(png))
            .route("/after.png", get(png));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openai_factory_requires_token() {
        let result = OpenAiAssistantFactory.create(&ServiceConfig::default());
        match result {
            Err(AnalysisError::ExternalService(msg)) => {
                assert_eq!(msg, "OpenAI token not configured")
            }
            Err(other) => panic!("expected ExternalService, got {other:?}"),
            Ok(_) => panic!("expected missing-token error"),
        }
    }

    #[test]
    fn openai_factory_builds_with_token() {
        let config = ServiceConfig {
            openai_api_key: Some("sk-test".into()),
            ..ServiceConfig::default()
        };
        assert!(OpenAiAssistantFactory.create(&config).is_ok());
    }

    #[test]
    fn context_uses_default_poll_policy() {
        let ctx = ApiContext::new(ServiceConfig::default());
        assert_eq!(ctx.poll, PollPolicy::default());
    }
}
