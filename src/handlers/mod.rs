//! HTTP handlers

pub mod about;
pub mod health;
pub mod insights;
pub mod model;
pub mod predict;
pub mod sample;

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::http::{header, HeaderMap, StatusCode};

use crate::dataset::Table;
use crate::AppError;

/// Content type of an Excel 2007+ workbook
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

fn is_xlsx(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().starts_with(XLSX_CONTENT_TYPE))
        .unwrap_or(false)
}

/// Turn a raw upload (CSV, or xlsx by content type) into a table, keeping
/// body-limit rejections as 413
pub(crate) fn read_table(
    headers: &HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Table, AppError> {
    let bytes = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(rejection.body_text())
        } else {
            AppError::InvalidInput(rejection.body_text())
        }
    })?;

    if bytes.is_empty() {
        return Err(AppError::InvalidBatch("empty upload".to_string()));
    }

    if is_xlsx(headers) {
        Ok(Table::from_xlsx(&bytes)?)
    } else {
        Ok(Table::from_csv(&bytes)?)
    }
}

/// `text/csv` download response parts
pub(crate) fn csv_attachment(filename: &str) -> [(header::HeaderName, String); 2] {
    [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        ),
    ]
}
