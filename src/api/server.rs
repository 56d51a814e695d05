//! API server lifecycle: bind, spawn the axum server in a background task,
//! hand back a handle with a shutdown channel.

use std::net::SocketAddr;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::api::router::api_router;
use crate::api::types::ApiContext;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    #[error("Server task failed: {0}")]
    Task(String),
}

/// Handle to a running API server.
pub struct ApiServer {
    pub addr: SocketAddr,
    pub started_at: String,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl ApiServer {
    /// Ask the server to stop accepting connections. Safe to call twice.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            tracing::info!("API server shutdown signal sent");
        }
    }

    /// Wait for the server task to finish draining.
    pub async fn wait(self) -> Result<(), ServerError> {
        self.task
            .await
            .map_err(|e| ServerError::Task(e.to_string()))
    }
}

// ═══════════════════════════════════════════════════════════
// Server lifecycle
// ═══════════════════════════════════════════════════════════

/// Bind `host:port` and start serving in the background.
///
/// Port 0 binds an ephemeral port; the actual address is in the handle.
pub async fn start_api_server(
    ctx: ApiContext,
    host: &str,
    port: u16,
) -> Result<ApiServer, ServerError> {
    let bind_addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: bind_addr.clone(),
            source,
        })?;
    let addr = listener.local_addr().map_err(|source| ServerError::Bind {
        addr: bind_addr,
        source,
    })?;

    let app = api_router(ctx);
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
            tracing::info!("API server received shutdown signal");
        };

        tracing::info!(%addr, "API server started");

        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
        {
            tracing::error!("API server error: {e}");
        }

        tracing::info!("API server stopped");
    });

    Ok(ApiServer {
        addr,
        started_at: chrono::Utc::now().to_rfc3339(),
        shutdown_tx: Some(shutdown_tx),
        task,
    })
}

/// Serve until Ctrl-C, then shut down gracefully.
pub async fn serve_until_ctrl_c(ctx: ApiContext, host: &str, port: u16) -> Result<(), ServerError> {
    let mut server = start_api_server(ctx, host, port).await?;

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {e}");
    }
    server.shutdown();
    server.wait().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::test_support::{mock_context, MockAssistantFactory};

    async fn start() -> ApiServer {
        start_api_server(mock_context(MockAssistantFactory::replying("{}")), "127.0.0.1", 0)
            .await
            .expect("server should start")
    }

    #[tokio::test]
    async fn start_serves_root_and_stops() {
        let mut server = start().await;
        assert!(server.addr.port() > 0);
        assert!(!server.started_at.is_empty());

        let url = format!("http://{}/", server.addr);
        let json: serde_json::Value = reqwest::get(&url).await.unwrap().json().await.unwrap();
        assert_eq!(json["status"], "running");

        server.shutdown();
        server.wait().await.unwrap();
    }

    #[tokio::test]
    async fn unknown_route_returns_404() {
        let mut server = start().await;
        let url = format!("http://{}/nonexistent", server.addr);
        let resp = reqwest::get(&url).await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);
        server.shutdown();
    }

    #[tokio::test]
    async fn shutdown_is_idempotent() {
        let mut server = start().await;
        server.shutdown();
        server.shutdown();
        server.wait().await.unwrap();
    }

    #[tokio::test]
    async fn bind_conflict_is_error() {
        let mut first = start().await;
        let result = start_api_server(
            mock_context(MockAssistantFactory::replying("{}")),
            "127.0.0.1",
            first.addr.port(),
        )
        .await;
        assert!(matches!(result, Err(ServerError::Bind { .. })));
        first.shutdown();
    }
}
