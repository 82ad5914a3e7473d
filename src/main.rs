//! Predictive Maintenance Inference Server
//!
//! Loads the fitted artifacts once, then serves predictions over HTTP.
//! Startup fails if either artifact cannot be loaded.

use std::net::SocketAddr;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use maintenance_predictor::config::{Config, LogFormat};
use maintenance_predictor::{create_router, AppState, InferenceService};

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "maintenance_predictor=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    init_tracing(config.log_format);

    tracing::info!("Maintenance predictor starting ({})", config.environment);
    tracing::info!("Scaler: {}", config.scaler_path.display());
    tracing::info!("Classifier: {}", config.classifier_path.display());

    let service = InferenceService::load(&config.artifact_paths()).map_err(|e| {
        tracing::error!("Failed to load model artifacts: {}", e);
        e
    })?;

    let addr = SocketAddr::from((config.host, config.port));
    let state = AppState::new(service, config);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("🚀 Server listening on http://{}", addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
