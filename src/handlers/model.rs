//! Model status handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::features::LayoutInfo;
use crate::model::{EngineStatus, ModelMetadata};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ModelResponse {
    pub status: EngineStatus,
    pub metadata: ModelMetadata,
    pub layout: LayoutInfo,
}

pub async fn info(State(state): State<AppState>) -> Json<ModelResponse> {
    Json(ModelResponse {
        status: state.service.status(),
        metadata: state.service.metadata().clone(),
        layout: LayoutInfo::current(),
    })
}
