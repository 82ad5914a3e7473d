//! Insights Module - data behind the exploratory charts
//!
//! Produces the numbers a client needs to draw a correlation heatmap,
//! the failure pie chart, histograms and box plots. Drawing them is the
//! client's job.

pub mod correlation;
pub mod stats;

use serde::Serialize;

use crate::dataset::{Preview, Table};
use crate::features::layout::{sensor_columns, FEATURE_COLUMNS, GROUND_TRUTH_COLUMN};
use crate::features::MachineType;
pub use correlation::CorrelationMatrix;
pub use stats::{BoxStats, ColumnSummary, Histogram};

#[derive(Debug, Clone)]
pub struct InsightsOptions {
    pub histogram_bins: usize,
    pub preview_rows: usize,
}

impl Default for InsightsOptions {
    fn default() -> Self {
        Self { histogram_bins: 20, preview_rows: 5 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FailureDistribution {
    #[serde(rename = "No Failure")]
    pub no_failure: usize,
    #[serde(rename = "Failure")]
    pub failure: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct InsightsReport {
    pub rows: usize,
    pub preview: Preview,
    pub numeric_columns: Vec<String>,
    pub summary: Vec<ColumnSummary>,
    pub correlation: CorrelationMatrix,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_distribution: Option<FailureDistribution>,
    pub histograms: Vec<Histogram>,
    pub box_plots: Vec<BoxStats>,
}

/// Numeric view of a column: `None` for empty or unmapped cells.
/// `Type` is mapped to its codes only when it holds L/M/H tokens; an
/// already encoded column is read as plain numbers.
fn numeric_column(table: &Table, index: usize) -> Option<Vec<Option<f64>>> {
    let tokens = table.headers[index] == FEATURE_COLUMNS[0]
        && table.column(index).any(|cell| MachineType::from_token(cell).is_ok());
    let mut seen_value = false;
    let mut values = Vec::with_capacity(table.len());

    for cell in table.column(index) {
        if cell.is_empty() {
            values.push(None);
            continue;
        }
        if tokens {
            let code = MachineType::from_token(cell).ok().map(|t| f64::from(t.code()));
            seen_value |= code.is_some();
            values.push(code);
            continue;
        }
        match cell.parse::<f64>() {
            Ok(v) if v.is_finite() => {
                seen_value = true;
                values.push(Some(v));
            }
            _ => return None,
        }
    }

    seen_value.then_some(values)
}

fn present(values: &[Option<f64>]) -> Vec<f64> {
    values.iter().flatten().copied().collect()
}

fn failure_distribution(table: &Table) -> Option<FailureDistribution> {
    let index = table.column_index(GROUND_TRUTH_COLUMN)?;
    let mut distribution = FailureDistribution { no_failure: 0, failure: 0 };

    for cell in table.column(index) {
        match cell.parse::<f64>() {
            Ok(v) if v == 0.0 => distribution.no_failure += 1,
            Ok(v) if v == 1.0 => distribution.failure += 1,
            _ => {}
        }
    }
    Some(distribution)
}

pub fn analyze(table: &Table, options: &InsightsOptions) -> InsightsReport {
    let numeric: Vec<(String, Vec<Option<f64>>)> = (0..table.headers.len())
        .filter_map(|i| numeric_column(table, i).map(|values| (table.headers[i].clone(), values)))
        .collect();

    let summary = numeric
        .iter()
        .map(|(name, values)| stats::describe(name, &present(values)))
        .collect();

    let sensors: Vec<(&str, Vec<f64>)> = sensor_columns()
        .iter()
        .filter_map(|column| {
            numeric
                .iter()
                .find(|(name, _)| name == column)
                .map(|(_, values)| (*column, present(values)))
        })
        .collect();

    let histograms = sensors
        .iter()
        .map(|(name, values)| stats::histogram(name, values, options.histogram_bins))
        .collect();

    let box_plots = sensors
        .iter()
        .filter_map(|(name, values)| stats::box_stats(name, values))
        .collect();

    InsightsReport {
        rows: table.len(),
        preview: table.preview(options.preview_rows),
        numeric_columns: numeric.iter().map(|(name, _)| name.clone()).collect(),
        summary,
        correlation: correlation::correlation_matrix(&numeric),
        failure_distribution: failure_distribution(table),
        histograms,
        box_plots,
    }
}
