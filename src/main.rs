use dotenvy::dotenv;
use log::{error, info};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use face_linebot::main_module::run_axum_server;
use face_linebot::{AppConfig, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {:#}", e);
            return Err(e);
        }
    };
    info!(
        "Starting {} {} (locale {}, callback {})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        config.locale,
        config.server.callback_path
    );

    let state = Arc::new(AppState::from_config(config)?);
    run_axum_server(state).await?;

    info!("Server stopped");
    Ok(())
}
