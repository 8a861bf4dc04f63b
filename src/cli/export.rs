//! Report export as CSV or JSONL.

use std::fs::File;
use std::io::{self, BufWriter, Write};

use smartmeds::error::io_error;
use smartmeds::export::{ExportFormat, ReportRow, write_csv, write_jsonl};
use smartmeds::{ReviewError, SmartMedsConfig};

use super::session;

/// Loads the roster, optionally annotates it, and writes the filtered report
/// to `--output` or stdout.
///
/// # Errors
///
/// Returns [`ReviewError::Configuration`] for an unsupported format,
/// [`ReviewError::DataSource`] when the roster cannot be read, and
/// [`ReviewError::Io`] when the output cannot be written.
pub fn run(config: &SmartMedsConfig) -> Result<(), ReviewError> {
    let format = config.export_format()?;
    let rows = report_rows(config)?;

    if let Some(path) = config.output.as_deref() {
        let file = File::create(path).map_err(|error| ReviewError::Io {
            message: format!("failed to create export file '{path}': {error}"),
        })?;
        let mut writer = BufWriter::new(file);
        write_rows(&mut writer, format, &rows)?;
        writer.flush().map_err(|e| io_error(&e))?;
        tracing::info!(rows = rows.len(), path, %format, "report exported");
        return Ok(());
    }

    let mut stdout = io::stdout().lock();
    write_rows(&mut stdout, format, &rows)
}

fn report_rows(config: &SmartMedsConfig) -> Result<Vec<ReportRow>, ReviewError> {
    let mut workflow = session::start(config)?;
    if config.annotate {
        let report = workflow.annotate_all()?;
        if !report.is_clean() {
            tracing::warn!(
                failed = report.failures.len(),
                "exporting with incomplete AI annotations"
            );
        }
    }
    workflow.report(&config.report_filter())
}

/// Writes report rows in the requested format.
///
/// # Errors
///
/// Returns [`ReviewError::Io`] when writing fails.
pub fn write_rows<W: Write>(
    writer: &mut W,
    format: ExportFormat,
    rows: &[ReportRow],
) -> Result<(), ReviewError> {
    match format {
        ExportFormat::Csv => write_csv(writer, rows),
        ExportFormat::Jsonl => write_jsonl(writer, rows),
    }
}
