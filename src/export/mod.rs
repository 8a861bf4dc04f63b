//! Report rows and structured export.
//!
//! The report view is derived from the in-memory roster without mutating it.
//! Medication lists are re-joined into one cell and timestamps are rendered
//! as RFC 3339, matching what the backing store holds.
//!
//! # Supported Formats
//!
//! - **CSV**: UTF-8, header row of canonical field names, one resident per
//!   line
//! - **JSONL**: one JSON object per line, including the review status

mod csv;
mod filter;
mod jsonl;
mod model;

pub use self::csv::write_csv;
pub use filter::ReportFilter;
pub use jsonl::write_jsonl;
pub use model::{ExportFormat, ReportRow};
