//! In-memory table read from a CSV or xlsx upload
//!
//! Cells are kept as trimmed strings; interpretation is left to the batch
//! and insights code.

use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};
use serde::Serialize;

use crate::model::InferenceError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// The first rows of a table, for display
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Preview {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Parse CSV bytes with a header row
    pub fn from_csv(bytes: &[u8]) -> Result<Self, InferenceError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(bytes);

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| InferenceError::MalformedTable(e.to_string()))?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| InferenceError::MalformedTable(e.to_string()))?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Self::checked(headers, rows)
    }

    /// Read the first worksheet of an xlsx workbook; its first row is the
    /// header
    pub fn from_xlsx(bytes: &[u8]) -> Result<Self, InferenceError> {
        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))
            .map_err(|e| InferenceError::MalformedTable(format!("unreadable workbook: {}", e)))?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| InferenceError::MalformedTable("workbook has no sheets".to_string()))?
            .map_err(|e| InferenceError::MalformedTable(e.to_string()))?;

        let mut rows = range.rows().map(|row| row.iter().map(cell_text).collect::<Vec<_>>());
        let headers = rows.next().unwrap_or_default();

        Self::checked(headers, rows.collect())
    }

    fn checked(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, InferenceError> {
        if headers.is_empty() || headers.iter().all(String::is_empty) {
            return Err(InferenceError::MalformedTable("missing header row".to_string()));
        }

        for (i, header) in headers.iter().enumerate() {
            if headers[..i].contains(header) {
                return Err(InferenceError::MalformedTable(format!(
                    "duplicate column '{}'",
                    header
                )));
            }
        }

        Ok(Self { headers, rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cells of one column, top to bottom
    pub fn column(&self, index: usize) -> impl Iterator<Item = &str> + '_ {
        self.rows
            .iter()
            .map(move |row| row.get(index).map(String::as_str).unwrap_or(""))
    }

    pub fn preview(&self, rows: usize) -> Preview {
        Preview {
            columns: self.headers.clone(),
            rows: self.rows.iter().take(rows).cloned().collect(),
        }
    }

    pub fn to_csv(&self) -> Result<Vec<u8>, InferenceError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record(&self.headers)
            .map_err(|e| InferenceError::MalformedTable(e.to_string()))?;
        for row in &self.rows {
            writer
                .write_record(row)
                .map_err(|e| InferenceError::MalformedTable(e.to_string()))?;
        }
        writer
            .into_inner()
            .map_err(|e| InferenceError::MalformedTable(e.to_string()))
    }
}

/// Spreadsheet cell as the text a CSV export would hold
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        other => other.to_string().trim().to_string(),
    }
}
