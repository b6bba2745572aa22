//! Gateway server lifecycle: binds the listener, serves `api_router()`,
//! and stops gracefully on request.
//!
//! bind → spawn background task → return handle with shutdown channel.

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::api::router::api_router;
use crate::config::ConfigError;
use crate::core_state::CoreState;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),

    #[error("Server task failed: {0}")]
    Task(String),
}

// ═══════════════════════════════════════════════════════════
// Public types
// ═══════════════════════════════════════════════════════════

/// Handle to a running gateway server.
pub struct GatewayServer {
    pub addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<Result<(), std::io::Error>>,
}

impl GatewayServer {
    /// Signal the server to stop accepting connections.
    ///
    /// In-flight requests are allowed to finish.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            tracing::info!("Gateway shutdown signal sent");
        }
    }

    /// Wait for the server task to finish.
    pub async fn wait(self) -> Result<(), ServerError> {
        match self.task.await {
            Ok(result) => result.map_err(ServerError::Serve),
            Err(e) => Err(ServerError::Task(e.to_string())),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Server lifecycle
// ═══════════════════════════════════════════════════════════

/// Bind `addr` and serve the gateway router in a background task.
///
/// Port 0 picks an ephemeral port; the bound address is on the handle.
pub async fn start_server(
    core: Arc<CoreState>,
    addr: SocketAddr,
) -> Result<GatewayServer, ServerError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;

    let addr = listener
        .local_addr()
        .map_err(|source| ServerError::Bind { addr, source })?;

    let app = api_router(core);
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
            tracing::info!("Gateway received shutdown signal");
        };

        tracing::info!(%addr, "Gateway listening");

        let result = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await;

        match &result {
            Ok(()) => tracing::info!("Gateway stopped"),
            Err(e) => tracing::error!("Gateway server error: {e}"),
        }
        result
    });

    Ok(GatewayServer {
        addr,
        shutdown_tx: Some(shutdown_tx),
        task,
    })
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
pub async fn termination_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GatewayConfig;
    use crate::core_state::GatewayClients;

    fn test_core() -> Arc<CoreState> {
        Arc::new(CoreState::new(
            GatewayConfig::default(),
            GatewayClients::default(),
        ))
    }

    fn loopback() -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], 0))
    }

    #[tokio::test]
    async fn start_serve_health_and_stop() {
        let mut server = start_server(test_core(), loopback())
            .await
            .expect("server should start");
        assert!(server.addr.port() > 0);

        let url = format!("http://{}/health", server.addr);
        let resp = reqwest::get(&url).await.unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.text().await.unwrap(), "OK");

        server.shutdown();
        server.wait().await.expect("server should stop cleanly");
    }

    #[tokio::test]
    async fn unavailable_services_answer_503_over_http() {
        let mut server = start_server(test_core(), loopback()).await.unwrap();

        let url = format!("http://{}/api/status/abc123", server.addr);
        let resp = reqwest::get(&url).await.unwrap();
        assert_eq!(resp.status(), 503);
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["code"], "SERVICE_UNAVAILABLE");

        server.shutdown();
    }

    #[tokio::test]
    async fn bind_conflict_is_reported() {
        let mut first = start_server(test_core(), loopback()).await.unwrap();
        let err = start_server(test_core(), first.addr).await;
        assert!(matches!(err, Err(ServerError::Bind { .. })));
        first.shutdown();
    }
}
