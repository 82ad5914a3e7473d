//! Dataset Module - tabular uploads and downloads
//!
//! CSV parsing, batch prediction over a table and sample data.

pub mod batch;
pub mod sample;
pub mod table;

pub use batch::{predict_table, output_table, BatchOptions, BatchOutcome, BatchSummary, RejectedRow};
pub use table::{Preview, Table};
