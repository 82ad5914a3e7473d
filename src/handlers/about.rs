//! Home/About handler
//!
//! Index of the service's sections, in the order the dashboard menu
//! listed them.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::features::layout::PREDICTION_COLUMN;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct Section {
    pub name: &'static str,
    pub method: &'static str,
    pub path: &'static str,
    pub description: &'static str,
}

/// Figures reported for the fitted model at training time; not measured
/// by this service.
#[derive(Debug, Serialize)]
pub struct ReportedPerformance {
    pub accuracy: f32,
    pub precision: f32,
    pub recall: f32,
}

#[derive(Debug, Serialize)]
pub struct AboutResponse {
    pub name: &'static str,
    pub version: &'static str,
    pub description: &'static str,
    pub environment: String,
    pub output_column: &'static str,
    pub sections: Vec<Section>,
    pub reported_performance: ReportedPerformance,
}

const SECTIONS: [Section; 5] = [
    Section {
        name: "Home",
        method: "GET",
        path: "/",
        description: "Service overview",
    },
    Section {
        name: "Single Prediction",
        method: "POST",
        path: "/api/v1/predict",
        description: "Predict failure for one machine's readings",
    },
    Section {
        name: "Batch Prediction",
        method: "POST",
        path: "/api/v1/predict/batch",
        description: "Upload a CSV or xlsx file and receive it back with a Failure_Prediction column",
    },
    Section {
        name: "Visual Insights",
        method: "POST",
        path: "/api/v1/insights",
        description: "Summary statistics, correlations and chart data for a CSV or xlsx file",
    },
    Section {
        name: "About",
        method: "GET",
        path: "/api/v1/model",
        description: "Loaded model, feature layout and engine counters",
    },
];

pub async fn index(State(state): State<AppState>) -> Json<AboutResponse> {
    Json(AboutResponse {
        name: "Predictive Maintenance for Industrial Equipment",
        version: env!("CARGO_PKG_VERSION"),
        description: "Predict failures before they happen from machine type and sensor readings",
        environment: state.config.environment.clone(),
        output_column: PREDICTION_COLUMN,
        sections: SECTIONS.into_iter().collect(),
        reported_performance: ReportedPerformance {
            accuracy: 0.963,
            precision: 0.951,
            recall: 0.978,
        },
    })
}
