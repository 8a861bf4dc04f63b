//! CSV formatter for report rows.

use std::io::Write;

use crate::error::ReviewError;
use crate::roster::canonical_headers;

use super::model::ReportRow;

/// Writes report rows as UTF-8 CSV with a canonical header row.
///
/// The header is written even when there are no rows, so an empty report is
/// still a valid table.
///
/// # Errors
///
/// Returns [`ReviewError::Io`] if writing to the output fails.
pub fn write_csv<W: Write>(writer: W, rows: &[ReportRow]) -> Result<(), ReviewError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer
        .write_record(canonical_headers())
        .map_err(|e| csv_error(&e))?;
    for row in rows {
        csv_writer
            .write_record(row.cells())
            .map_err(|e| csv_error(&e))?;
    }
    csv_writer.flush().map_err(|e| ReviewError::Io {
        message: format!("failed to flush CSV output: {e}"),
    })
}

fn csv_error(error: &csv::Error) -> ReviewError {
    ReviewError::Io {
        message: format!("failed to write CSV report: {error}"),
    }
}
