// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{extract::DefaultBodyLimit, routing::post, Router};
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::detect::detect_handler;
use crate::vision::{AllowList, ObjectDetector};

/// Shared state handed to every request
#[derive(Clone)]
pub struct AppState {
    pub detector: Arc<dyn ObjectDetector>,
    pub allow_list: Arc<AllowList>,
}

impl AppState {
    pub fn new(detector: Arc<dyn ObjectDetector>) -> Self {
        Self {
            detector,
            allow_list: Arc::new(AllowList::new()),
        }
    }
}

/// Build the router: POST /detect only
pub fn create_app(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/detect", post(detect_handler))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl-C / SIGTERM
pub async fn start_server(
    addr: SocketAddr,
    state: AppState,
    max_body_bytes: usize,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    serve(listener, state, max_body_bytes, shutdown_signal()).await
}

/// Serve on an already-bound listener until `shutdown` resolves
pub async fn serve<F>(
    listener: TcpListener,
    state: AppState,
    max_body_bytes: usize,
    shutdown: F,
) -> anyhow::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let app = create_app(state, max_body_bytes);

    info!("Detection server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Detection server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
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
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl-C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
