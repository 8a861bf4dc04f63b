//! The roster: resident records keyed by name, in sheet order.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

use crate::advisor::normalize_interaction_answer;
use crate::error::ReviewError;

use super::columns::{Column, SheetRow, StoreRow};
use super::medications::{join_medications, parse_medications};
use super::model::{ResidentRecord, RiskLevel};

const NAIVE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// All resident records for one session.
///
/// The backing store is append-only, so a name may appear in many rows. The
/// last row for a name wins and the record keeps the position where the name
/// first appeared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    records: Vec<ResidentRecord>,
    positions: HashMap<String, usize>,
}

impl Roster {
    /// Parses store rows into a roster.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::DataSource`] naming the first malformed row;
    /// no partial roster is returned.
    pub fn from_rows(rows: &[SheetRow]) -> Result<Self, ReviewError> {
        let mut roster = Self::default();
        for (index, row) in rows.iter().enumerate() {
            // Row 1 is the header in every sheet.
            let row_number = row.source_row().unwrap_or(index + 2);
            let record = parse_record(row).map_err(|message| {
                ReviewError::data_source(format!("row {row_number} is malformed: {message}"))
            })?;
            roster.upsert(record);
        }
        Ok(roster)
    }

    /// Inserts a record, replacing any record with the same name in place.
    pub fn upsert(&mut self, record: ResidentRecord) {
        if let Some(existing) = self
            .positions
            .get(&record.name)
            .and_then(|position| self.records.get_mut(*position))
        {
            *existing = record;
            return;
        }

        self.positions
            .insert(record.name.clone(), self.records.len());
        self.records.push(record);
    }

    /// Looks up a record by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ResidentRecord> {
        self.positions
            .get(name)
            .and_then(|position| self.records.get(*position))
    }

    /// Looks up a record by name for mutation.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut ResidentRecord> {
        self.positions
            .get(name)
            .and_then(|position| self.records.get_mut(*position))
    }

    /// Records in sheet order.
    pub fn iter(&self) -> impl Iterator<Item = &ResidentRecord> {
        self.records.iter()
    }

    /// Records in sheet order, for mutation.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ResidentRecord> {
        self.records.iter_mut()
    }

    /// Resident names in sheet order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|record| record.name.as_str())
    }

    /// Number of residents.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true when the roster has no residents.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Parses one store row into a record.
///
/// # Errors
///
/// Returns a description of the first invalid cell.
pub fn parse_record(row: &SheetRow) -> Result<ResidentRecord, String> {
    let name = row.text(Column::Name);
    if name.is_empty() {
        return Err("resident name is blank".to_owned());
    }

    let age_text = row.text(Column::Age);
    let age = age_text
        .parse::<u32>()
        .map_err(|_| format!("age '{age_text}' for '{name}' is not a whole number"))?;

    let reviewer_risk_level = parse_optional_risk_level(&row.text(Column::ReviewerRiskLevel))
        .map_err(|error| format!("{error} (resident '{name}')"))?;
    let reviewed_at = parse_timestamp(&row.text(Column::ReviewedAt))
        .map_err(|error| format!("{error} (resident '{name}')"))?;

    let mut record = ResidentRecord {
        conditions: row.text(Column::Conditions),
        ai_risk: row.text(Column::AiRisk),
        ai_interactions: normalize_interaction_answer(&row.text(Column::AiInteractions)),
        reviewer: row.text(Column::Reviewer),
        reviewer_risk_level,
        correction_note: row.text(Column::CorrectionNote),
        reviewed_at,
        ..ResidentRecord::new(
            name,
            age,
            String::new(),
            parse_medications(row.get(Column::Medications)),
        )
    };
    record.status = record.derived_status();
    Ok(record)
}

/// Renders a record's full current field set as a store row.
#[must_use]
pub fn to_store_row(record: &ResidentRecord) -> StoreRow {
    StoreRow::new([
        record.name.clone(),
        record.age.to_string(),
        record.conditions.clone(),
        join_medications(&record.medications),
        record.ai_risk.clone(),
        record.ai_interactions.clone(),
        record.reviewer.clone(),
        record
            .reviewer_risk_level
            .map(|level| level.label().to_owned())
            .unwrap_or_default(),
        record.correction_note.clone(),
        record.reviewed_at.map(format_timestamp).unwrap_or_default(),
    ])
}

/// Formats a review timestamp the way it is stored.
#[must_use]
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn parse_optional_risk_level(text: &str) -> Result<Option<RiskLevel>, String> {
    if text.is_empty() {
        return Ok(None);
    }
    text.parse::<RiskLevel>()
        .map(Some)
        .map_err(|error| error.to_string())
}

fn parse_timestamp(text: &str) -> Result<Option<DateTime<Utc>>, String> {
    if text.is_empty() {
        return Ok(None);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(text) {
        return Ok(Some(timestamp.with_timezone(&Utc)));
    }
    NaiveDateTime::parse_from_str(text, NAIVE_TIMESTAMP_FORMAT)
        .map(|naive| Some(naive.and_utc()))
        .map_err(|_| format!("review timestamp '{text}' is not RFC 3339 or '{NAIVE_TIMESTAMP_FORMAT}'"))
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rstest::rstest;

    use super::{Roster, parse_record, to_store_row};
    use crate::error::ReviewError;
    use crate::roster::{Column, ReviewStatus, RiskLevel, SheetRow};

    fn row(pairs: &[(&str, &str)]) -> SheetRow {
        SheetRow::from_pairs(pairs.iter().copied())
    }

    #[test]
    fn parses_legacy_headers() {
        let record = parse_record(&row(&[
            ("姓名", "陳伯伯"),
            ("年齡", "82"),
            ("疾病", "高血壓"),
            ("用藥", "Aspirin, Warfarin"),
            ("用藥風險", "高風險"),
        ]))
        .expect("row should parse");

        assert_eq!(record.name, "陳伯伯");
        assert_eq!(record.age, 82);
        assert_eq!(record.conditions, "高血壓");
        assert_eq!(record.medications, vec!["Aspirin", "Warfarin"]);
        assert_eq!(record.status, ReviewStatus::Annotated);
    }

    #[rstest]
    #[case::blank_name(&[("name", " "), ("age", "80")], "name is blank")]
    #[case::bad_age(&[("name", "Chen"), ("age", "eighty")], "not a whole number")]
    #[case::missing_age(&[("name", "Chen")], "not a whole number")]
    #[case::bad_level(&[("name", "Chen"), ("age", "80"), ("reviewerRiskLevel", "severe")], "unsupported risk level")]
    #[case::bad_timestamp(&[("name", "Chen"), ("age", "80"), ("reviewedAt", "yesterday")], "review timestamp")]
    fn rejects_malformed_rows(#[case] pairs: &[(&str, &str)], #[case] expected: &str) {
        let error = parse_record(&row(pairs)).expect_err("row should be rejected");

        assert!(error.contains(expected), "unexpected message: {error}");
    }

    #[test]
    fn accepts_naive_timestamps_as_utc() {
        let record = parse_record(&row(&[
            ("name", "Chen"),
            ("age", "80"),
            ("reviewer", "Lin"),
            ("reviewerRiskLevel", "高"),
            ("reviewedAt", "2025-07-01 09:30:00"),
        ]))
        .expect("row should parse");

        assert_eq!(
            record.reviewed_at,
            Some(Utc.with_ymd_and_hms(2025, 7, 1, 9, 30, 0).single().expect("valid date"))
        );
        assert_eq!(record.reviewer_risk_level, Some(RiskLevel::High));
        assert_eq!(record.status, ReviewStatus::Reviewed);
    }

    #[rstest]
    #[case::traditional("無")]
    #[case::simplified("无")]
    #[case::english("None.")]
    fn stored_no_interaction_answer_loads_as_empty(#[case] stored: &str) {
        let record = parse_record(&row(&[
            ("姓名", "Chen"),
            ("年齡", "80"),
            ("用藥", "A,B"),
            ("交互作用", stored),
        ]))
        .expect("row should parse");

        assert_eq!(record.ai_interactions, "");
        assert!(!record.has_interactions());
    }

    #[test]
    fn last_row_wins_for_duplicate_names() {
        let rows = vec![
            row(&[("name", "Chen"), ("age", "80"), ("medications", "A")]),
            row(&[("name", "Wang"), ("age", "75")]),
            row(&[("name", "Chen"), ("age", "81"), ("medications", "A,B")]),
        ];

        let roster = Roster::from_rows(&rows).expect("roster should load");

        assert_eq!(roster.len(), 2);
        assert_eq!(roster.names().collect::<Vec<_>>(), vec!["Chen", "Wang"]);
        let chen = roster.get("Chen").expect("Chen should exist");
        assert_eq!(chen.age, 81);
        assert_eq!(chen.medications, vec!["A", "B"]);
    }

    #[test]
    fn malformed_row_fails_whole_load() {
        let rows = vec![
            row(&[("name", "Chen"), ("age", "80")]),
            row(&[("name", "Wang"), ("age", "")]),
        ];

        let error = Roster::from_rows(&rows).expect_err("load should fail");

        assert!(
            matches!(&error, ReviewError::DataSource { message } if message.contains("row 3")),
            "expected DataSource error naming row 3, got {error:?}"
        );
    }

    #[test]
    fn store_row_follows_column_order() {
        let mut record = parse_record(&row(&[
            ("name", "Chen"),
            ("age", "80"),
            ("conditions", "CKD"),
            ("medications", "A，B"),
        ]))
        .expect("row should parse");
        record.reviewer = "Lin".to_owned();
        record.reviewer_risk_level = Some(RiskLevel::Medium);
        record.reviewed_at = Utc.with_ymd_and_hms(2025, 7, 1, 9, 30, 0).single();

        let store_row = to_store_row(&record);

        assert_eq!(store_row.value(Column::Name), "Chen");
        assert_eq!(store_row.value(Column::Age), "80");
        assert_eq!(store_row.value(Column::Medications), "A, B");
        assert_eq!(store_row.value(Column::ReviewerRiskLevel), "Medium");
        assert_eq!(store_row.value(Column::ReviewedAt), "2025-07-01T09:30:00Z");
    }
}
