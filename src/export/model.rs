//! Export data models for report output.
//!
//! This module defines the serializable report row and the format selection
//! enum for CLI integration.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::ReviewError;
use crate::roster::{ResidentRecord, format_timestamp, join_medications};

/// One resident prepared for the report view.
///
/// Every field is plain text so CSV and JSONL output agree cell for cell.
/// It is constructed from a [`ResidentRecord`] via the [`From`] trait
/// implementation.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    /// Resident name.
    pub name: String,
    /// Age in years.
    pub age: String,
    /// Chronic conditions.
    pub conditions: String,
    /// Medications joined with `", "`.
    pub medications: String,
    /// AI risk summary.
    pub ai_risk: String,
    /// AI interaction summary.
    pub ai_interactions: String,
    /// Reviewing pharmacist.
    pub reviewer: String,
    /// Reviewer risk level label.
    pub reviewer_risk_level: String,
    /// Reviewer correction note.
    pub correction_note: String,
    /// Review timestamp (RFC 3339).
    pub reviewed_at: String,
    /// Review status within the session.
    pub status: String,
}

impl ReportRow {
    /// Cells in canonical column order, status excluded.
    #[must_use]
    pub fn cells(&self) -> [&str; 10] {
        [
            &self.name,
            &self.age,
            &self.conditions,
            &self.medications,
            &self.ai_risk,
            &self.ai_interactions,
            &self.reviewer,
            &self.reviewer_risk_level,
            &self.correction_note,
            &self.reviewed_at,
        ]
    }
}

impl From<&ResidentRecord> for ReportRow {
    fn from(record: &ResidentRecord) -> Self {
        Self {
            name: record.name.clone(),
            age: record.age.to_string(),
            conditions: record.conditions.clone(),
            medications: join_medications(&record.medications),
            ai_risk: record.ai_risk.clone(),
            ai_interactions: record.ai_interactions.clone(),
            reviewer: record.reviewer.clone(),
            reviewer_risk_level: record
                .reviewer_risk_level
                .map(|level| level.label().to_owned())
                .unwrap_or_default(),
            correction_note: record.correction_note.clone(),
            reviewed_at: record.reviewed_at.map(format_timestamp).unwrap_or_default(),
            status: record.status.label().to_owned(),
        }
    }
}

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// Comma-separated values with a header row.
    #[default]
    Csv,
    /// Machine-readable JSON Lines (one object per line).
    Jsonl,
}

impl FromStr for ExportFormat {
    type Err = ReviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "jsonl" | "json-lines" | "jsonlines" => Ok(Self::Jsonl),
            _ => Err(ReviewError::configuration(format!(
                "unsupported export format '{s}': valid options are 'csv' or 'jsonl'"
            ))),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv => write!(f, "csv"),
            Self::Jsonl => write!(f, "jsonl"),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rstest::rstest;

    use super::*;
    use crate::roster::{ReviewStatus, RiskLevel};

    #[rstest]
    fn from_record_renders_every_field_as_text() {
        let mut record = ResidentRecord::new(
            "陳伯伯",
            82,
            "高血壓",
            vec!["Aspirin".to_owned(), "Warfarin".to_owned()],
        );
        record.ai_interactions = "出血風險增加".to_owned();
        record.reviewer = "林藥師".to_owned();
        record.reviewer_risk_level = Some(RiskLevel::High);
        record.reviewed_at = Utc.with_ymd_and_hms(2025, 7, 1, 9, 30, 0).single();
        record.status = ReviewStatus::Reviewed;

        let row = ReportRow::from(&record);

        assert_eq!(row.age, "82");
        assert_eq!(row.medications, "Aspirin, Warfarin");
        assert_eq!(row.reviewer_risk_level, "High");
        assert_eq!(row.reviewed_at, "2025-07-01T09:30:00Z");
        assert_eq!(row.status, "reviewed");
        assert_eq!(row.cells().first(), Some(&"陳伯伯"));
    }

    #[rstest]
    fn unreviewed_record_has_blank_audit_fields() {
        let row = ReportRow::from(&ResidentRecord::new("Wang", 75, "", Vec::new()));

        assert_eq!(row.medications, "");
        assert_eq!(row.reviewer_risk_level, "");
        assert_eq!(row.reviewed_at, "");
        assert_eq!(row.status, "unreviewed");
    }

    #[rstest]
    #[case("csv", ExportFormat::Csv)]
    #[case("CSV", ExportFormat::Csv)]
    #[case("jsonl", ExportFormat::Jsonl)]
    #[case("json-lines", ExportFormat::Jsonl)]
    fn export_format_parses_valid_values(#[case] input: &str, #[case] expected: ExportFormat) {
        assert_eq!(input.parse::<ExportFormat>(), Ok(expected));
    }

    #[rstest]
    #[case("xml")]
    #[case("markdown")]
    #[case("")]
    fn export_format_rejects_invalid_values(#[case] input: &str) {
        let err = input
            .parse::<ExportFormat>()
            .expect_err("should reject invalid format");
        assert!(
            matches!(err, ReviewError::Configuration { ref message } if message.contains("unsupported export format")),
            "expected Configuration error with 'unsupported export format', got {err:?}"
        );
    }

    #[rstest]
    fn export_format_display() {
        assert_eq!(ExportFormat::Csv.to_string(), "csv");
        assert_eq!(ExportFormat::Jsonl.to_string(), "jsonl");
    }
}
