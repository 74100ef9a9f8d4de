use axum::{routing::get, Router};
use log::{error, info};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::core::shared::state::AppState;

use super::{health_check, shutdown_signal};

/// Webhook, image endpoints and health check on one router.
pub fn build_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(crate::line::configure(&app_state.config.server.callback_path))
        .merge(crate::thumbnail::configure())
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
}

pub async fn run_axum_server(app_state: Arc<AppState>) -> std::io::Result<()> {
    let addr = format!(
        "{}:{}",
        app_state.config.server.host, app_state.config.server.port
    );
    let app = build_router(app_state);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            error!(
                "Failed to bind to {}: {} - is another instance running?",
                addr, e
            );
            return Err(e);
        }
    };
    info!("HTTP server listening on {}", listener.local_addr()?);
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(std::io::Error::other)
}
