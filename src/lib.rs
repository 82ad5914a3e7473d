//! Predictive Maintenance Inference Server
//!
//! Predicts machine failure from a machine's type and five sensor readings
//! using a pre-fitted scaler and classifier.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 MAINTENANCE PREDICTOR                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌───────────┐  ┌─────────────────────────┐ │
//! │  │  API      │  │  Dataset  │  │  Insights               │ │
//! │  │  (Axum)   │  │  (CSV)    │  │  (stats, correlation)   │ │
//! │  └─────┬─────┘  └─────┬─────┘  └─────────────────────────┘ │
//! │        └──────────────┤                                     │
//! │                       ▼                                     │
//! │   ┌──────────┐   ┌──────────┐   ┌────────────────────────┐ │
//! │   │ Features │ → │  Scaler  │ → │ Classifier (JSON/ONNX) │ │
//! │   └──────────┘   └──────────┘   └────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod dataset;
pub mod error;
pub mod features;
pub mod handlers;
pub mod insights;
pub mod model;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use config::Config;
pub use error::{AppError, AppResult};
pub use model::InferenceService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<InferenceService>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(service: InferenceService, config: Config) -> Self {
        Self {
            service: Arc::new(service),
            config: Arc::new(config),
        }
    }
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    let info_routes = Router::new()
        .route("/", get(handlers::about::index))
        .route("/health", get(handlers::health::check))
        .route("/api/v1/model", get(handlers::model::info))
        .route("/api/v1/sample", get(handlers::sample::generate))
        .route("/api/v1/sample/template", get(handlers::sample::template));

    let prediction_routes = Router::new()
        .route("/api/v1/predict", post(handlers::predict::single))
        .route("/api/v1/predict/batch", post(handlers::predict::batch))
        .route("/api/v1/insights", post(handlers::insights::analyze))
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes));

    Router::new()
        .merge(info_routes)
        .merge(prediction_routes)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
