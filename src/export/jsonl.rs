//! JSONL (JSON Lines) formatter for report rows.
//!
//! Generates machine-readable output with one JSON object per line.

use std::io::Write;

use crate::error::{ReviewError, io_error};

use super::model::ReportRow;

/// Writes report rows in JSONL format to the given writer.
///
/// Each row is serialized as a single JSON object on its own line with
/// camelCase keys and a `status` field.
///
/// # Errors
///
/// Returns [`ReviewError::Io`] if writing to the output fails.
pub fn write_jsonl<W: Write>(writer: &mut W, rows: &[ReportRow]) -> Result<(), ReviewError> {
    for row in rows {
        serde_json::to_writer(&mut *writer, row).map_err(|e| ReviewError::Io {
            message: format!("JSON serialization failed: {e}"),
        })?;
        writeln!(writer).map_err(|e| io_error(&e))?;
    }
    Ok(())
}
