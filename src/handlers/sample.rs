//! Sample data handlers

use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;

use super::csv_attachment;
use crate::dataset::sample;
use crate::{AppError, AppResult, AppState};

#[derive(Debug, Deserialize)]
pub struct SampleQuery {
    pub rows: Option<usize>,
    pub seed: Option<u64>,
}

const DEFAULT_SAMPLE_ROWS: usize = 100;

/// Synthetic dataset in the batch input layout
pub async fn generate(
    State(state): State<AppState>,
    Query(query): Query<SampleQuery>,
) -> AppResult<impl IntoResponse> {
    let rows = query.rows.unwrap_or(DEFAULT_SAMPLE_ROWS);
    if rows > state.config.max_sample_rows {
        return Err(AppError::InvalidInput(format!(
            "rows must be at most {}",
            state.config.max_sample_rows
        )));
    }

    let bytes = sample::generate_table(rows, query.seed).to_csv()?;
    Ok((csv_attachment("sample_data.csv"), bytes))
}

/// One-row template showing the expected columns
pub async fn template() -> AppResult<impl IntoResponse> {
    let bytes = sample::template().to_csv()?;
    Ok((csv_attachment("sample_input.csv"), bytes))
}
