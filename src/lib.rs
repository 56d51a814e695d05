pub mod analysis; // Assistant round trip + response normalization
pub mod api; // HTTP routes, errors, server lifecycle
pub mod config;
pub mod fetch; // Image download to temp files
pub mod report; // Single-page PDF report

use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();
}

/// Run the HTTP service until Ctrl-C.
pub async fn run(config: config::ServiceConfig) -> Result<(), api::ServerError> {
    tracing::info!(
        "{} starting v{}",
        config::APP_NAME,
        config::APP_VERSION
    );
    tracing::info!(
        assistant_id = %config.assistant_id,
        base_url = %config.openai_base_url,
        token_configured = config.openai_api_key.is_some(),
        "Assistant configuration"
    );
    if config.openai_api_key.is_none() {
        tracing::warn!("No OpenAI token configured; analysis requests will fail");
    }

    let host = config.host.clone();
    let port = config.port;
    api::serve_until_ctrl_c(api::ApiContext::new(config), &host, port).await
}
