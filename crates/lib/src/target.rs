//! The SSRF target.
//!
//! A tiny HTTP service meant to be bound to loopback only. It is unreachable
//! from outside the host, so players can only read its secret by making the
//! public app fetch it for them.

use std::net::SocketAddr;

use axum::{
    Router,
    http::{StatusCode, Uri, header},
    response::IntoResponse,
    routing::get,
};
use tokio::sync::oneshot;

use crate::{
    Result,
    constants::{SSRF_FLAG, TARGET_HINT, TARGET_SECRET_PATH},
};

/// Create the target's router.
pub fn router() -> Router {
    Router::new()
        .route(TARGET_SECRET_PATH, get(handle_secret))
        .fallback(handle_other)
}

/// Handler for GET /secret - returns the SSRF flag
async fn handle_secret() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/plain")], SSRF_FLAG)
}

/// Handler for every other path
async fn handle_other(uri: Uri) -> impl IntoResponse {
    tracing::debug!("Target miss: {uri}");
    (StatusCode::NOT_FOUND, TARGET_HINT)
}

/// A running target listener.
///
/// Dropping the handle without calling [`TargetServer::stop`] leaves the
/// listener running until the runtime shuts down.
#[derive(Debug)]
pub struct TargetServer {
    address: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TargetServer {
    /// Bind `addr` and start serving in a background task.
    ///
    /// Port 0 picks a free port; see [`TargetServer::address`].
    pub async fn start(addr: SocketAddr) -> Result<Self> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        let address = listener.local_addr()?;
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            let result = axum::serve(listener, router())
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await;
            if let Err(e) = result {
                tracing::error!("SSRF target stopped with error: {e}");
            }
        });

        tracing::info!("SSRF target listening on {address}");
        Ok(Self {
            address,
            shutdown: Some(shutdown_tx),
        })
    }

    /// The bound address.
    pub fn address(&self) -> SocketAddr {
        self.address
    }

    /// URL of the secret path on this listener.
    pub fn secret_url(&self) -> String {
        format!("http://{}{TARGET_SECRET_PATH}", self.address)
    }

    /// Signal the listener to shut down.
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }

    pub fn is_running(&self) -> bool {
        self.shutdown.is_some()
    }
}
