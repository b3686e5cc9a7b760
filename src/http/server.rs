//! Status API server setup.
//!
//! # Responsibilities
//! - Create the Axum router with the status and trigger handlers
//! - Wire up request tracing
//! - Serve until the shutdown token fires

use std::sync::Arc;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

use crate::http::handlers::{get_status, not_found, trigger_ping};
use crate::scheduler::RoundRunner;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub runner: Arc<RoundRunner>,
}

/// HTTP server for the status API.
pub struct StatusServer {
    router: Router,
}

impl StatusServer {
    pub fn new(runner: Arc<RoundRunner>) -> Self {
        let router = Self::build_router(AppState { runner });
        Self { router }
    }

    /// Build the Axum router with its middleware layers.
    pub fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/", get(get_status))
            .route("/health", get(get_status))
            .route("/ping", get(trigger_ping))
            .fallback(not_found)
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until `shutdown` is cancelled.
    pub async fn run(self, listener: TcpListener, shutdown: CancellationToken) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Health server running");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await?;

        tracing::info!("Health server stopped");
        Ok(())
    }
}
