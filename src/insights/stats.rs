//! Descriptive statistics over one numeric column

use serde::Serialize;

/// Percentile with linear interpolation between closest ranks.
/// `sorted` must be ascending and non-empty; `q` in [0, 1].
pub fn percentile(sorted: &[f64], q: f64) -> f64 {
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

fn sorted_values(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1)
pub fn std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(variance.sqrt())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub column: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    #[serde(rename = "25%")]
    pub q25: Option<f64>,
    #[serde(rename = "50%")]
    pub median: Option<f64>,
    #[serde(rename = "75%")]
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

pub fn describe(column: &str, values: &[f64]) -> ColumnSummary {
    let sorted = sorted_values(values);
    let quantile = |q: f64| (!sorted.is_empty()).then(|| percentile(&sorted, q));

    ColumnSummary {
        column: column.to_string(),
        count: values.len(),
        mean: mean(values),
        std: std_dev(values),
        min: sorted.first().copied(),
        q25: quantile(0.25),
        median: quantile(0.5),
        q75: quantile(0.75),
        max: sorted.last().copied(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub column: String,
    /// `counts.len() + 1` bin edges; the last bin includes its right edge
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

/// Upper bound on bins regardless of what the caller asks for
pub const MAX_BINS: usize = 1000;

pub fn histogram(column: &str, values: &[f64], bins: usize) -> Histogram {
    let bins = bins.clamp(1, MAX_BINS);
    let (min, max) = match (
        values.iter().copied().reduce(f64::min),
        values.iter().copied().reduce(f64::max),
    ) {
        (Some(min), Some(max)) => (min, max),
        _ => {
            return Histogram { column: column.to_string(), edges: Vec::new(), counts: Vec::new() };
        }
    };

    if min == max {
        return Histogram {
            column: column.to_string(),
            edges: vec![min - 0.5, max + 0.5],
            counts: vec![values.len()],
        };
    }

    let width = (max - min) / bins as f64;
    let edges = (0..=bins).map(|i| min + width * i as f64).collect();
    let mut counts = vec![0usize; bins];
    for v in values {
        let bin = (((v - min) / width) as usize).min(bins - 1);
        counts[bin] += 1;
    }

    Histogram { column: column.to_string(), edges, counts }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxStats {
    pub column: String,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    /// Lowest value within q1 - 1.5 IQR
    pub lower_whisker: f64,
    /// Highest value within q3 + 1.5 IQR
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

pub fn box_stats(column: &str, values: &[f64]) -> Option<BoxStats> {
    if values.is_empty() {
        return None;
    }
    let sorted = sorted_values(values);

    let q1 = percentile(&sorted, 0.25);
    let median = percentile(&sorted, 0.5);
    let q3 = percentile(&sorted, 0.75);
    let iqr = q3 - q1;
    let lower_fence = q1 - 1.5 * iqr;
    let upper_fence = q3 + 1.5 * iqr;

    let inside = || sorted.iter().copied().filter(|v| *v >= lower_fence && *v <= upper_fence);

    Some(BoxStats {
        column: column.to_string(),
        q1,
        median,
        q3,
        lower_whisker: inside().next().unwrap_or(q1),
        upper_whisker: inside().last().unwrap_or(q3),
        outliers: sorted
            .iter()
            .copied()
            .filter(|v| *v < lower_fence || *v > upper_fence)
            .collect(),
    })
}
