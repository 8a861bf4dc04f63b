//! Output formatting utilities for CLI operations.

use std::io::Write;

use smartmeds::ReviewError;
use smartmeds::error::io_error;
use smartmeds::roster::{ResidentRecord, format_timestamp};
use smartmeds::workflow::{AnnotationReport, SummaryEntry};

/// Writes the roster overview, one resident per line.
pub fn write_summary_to<W: Write>(
    writer: &mut W,
    store: &str,
    entries: &[SummaryEntry],
) -> Result<(), ReviewError> {
    writeln!(writer, "Roster from {store}: {} residents", entries.len())
        .map_err(|e| io_error(&e))?;

    for entry in entries {
        let interactions = if entry.has_interactions {
            "interactions flagged"
        } else {
            "no interactions flagged"
        };
        writeln!(
            writer,
            "  {} ({}) [{}] {} medications, {interactions}",
            entry.name,
            entry.age,
            entry.status.label(),
            entry.medication_count
        )
        .map_err(|e| io_error(&e))?;
    }
    Ok(())
}

/// Writes the advisor results for every resident followed by the failures.
pub fn write_annotations_to<'a, W: Write>(
    writer: &mut W,
    records: impl IntoIterator<Item = &'a ResidentRecord>,
    report: &AnnotationReport,
) -> Result<(), ReviewError> {
    for record in records {
        writeln!(writer, "{} [{}]", record.name, record.status.label())
            .map_err(|e| io_error(&e))?;
        writeln!(writer, "  Risk: {}", or_dash(&record.ai_risk)).map_err(|e| io_error(&e))?;
        writeln!(writer, "  Interactions: {}", or_dash(&record.ai_interactions))
            .map_err(|e| io_error(&e))?;
    }

    writeln!(
        writer,
        "Annotated {} residents, {} advisor calls failed",
        report.annotated,
        report.failures.len()
    )
    .map_err(|e| io_error(&e))?;

    for failure in &report.failures {
        writeln!(
            writer,
            "  {} ({}): {}",
            failure.resident, failure.advisor, failure.message
        )
        .map_err(|e| io_error(&e))?;
    }
    Ok(())
}

/// Writes the confirmation for a stored review.
pub fn write_review_confirmation_to<W: Write>(
    writer: &mut W,
    record: &ResidentRecord,
) -> Result<(), ReviewError> {
    let level = record
        .reviewer_risk_level
        .map_or("-", smartmeds::RiskLevel::label);
    let reviewed_at = record
        .reviewed_at
        .map(format_timestamp)
        .unwrap_or_default();
    writeln!(
        writer,
        "Recorded review of {} by {}: risk {level} at {reviewed_at}",
        record.name, record.reviewer
    )
    .map_err(|e| io_error(&e))?;

    if !record.correction_note.is_empty() {
        writeln!(writer, "  Note: {}", record.correction_note).map_err(|e| io_error(&e))?;
    }
    Ok(())
}

fn or_dash(text: &str) -> &str {
    if text.trim().is_empty() { "-" } else { text }
}
