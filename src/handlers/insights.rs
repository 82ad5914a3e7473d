//! Visual insights handler

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, Query, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;

use super::read_table;
use crate::insights::{self, InsightsReport};
use crate::{AppError, AppResult, AppState};

#[derive(Debug, Deserialize)]
pub struct InsightsQuery {
    pub bins: Option<usize>,
}

pub async fn analyze(
    State(state): State<AppState>,
    Query(query): Query<InsightsQuery>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> AppResult<Json<InsightsReport>> {
    if let Some(bins) = query.bins {
        if bins > state.config.max_histogram_bins {
            return Err(AppError::InvalidInput(format!(
                "bins must be at most {}",
                state.config.max_histogram_bins
            )));
        }
    }

    let table = read_table(&headers, body)?;
    let options = state.config.insights_options(query.bins);

    let report = tokio::task::spawn_blocking(move || insights::analyze(&table, &options)).await?;
    tracing::debug!(
        "Insights over {} rows, {} numeric columns",
        report.rows,
        report.numeric_columns.len()
    );

    Ok(Json(report))
}
