//! Resident records and the review vocabulary shared by every phase.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Risk level assigned by a reviewing pharmacist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RiskLevel {
    /// High medication risk.
    High,
    /// Medium medication risk.
    Medium,
    /// Low medication risk.
    Low,
}

/// Keywords that mark a risk level inside free text, checked in order.
///
/// Longer phrases come first so `中高風險` style wording is not misread as a
/// bare `中`.
const RISK_KEYWORDS: [(&str, RiskLevel); 9] = [
    ("高風險", RiskLevel::High),
    ("中風險", RiskLevel::Medium),
    ("低風險", RiskLevel::Low),
    ("high risk", RiskLevel::High),
    ("medium risk", RiskLevel::Medium),
    ("moderate risk", RiskLevel::Medium),
    ("low risk", RiskLevel::Low),
    ("風險高", RiskLevel::High),
    ("風險低", RiskLevel::Low),
];

impl RiskLevel {
    /// Canonical label written to the backing store.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }

    /// Infers the risk level implied by advisor free text.
    ///
    /// Returns the level whose keyword appears earliest in the text, or
    /// `None` when the text names no level.
    #[must_use]
    pub fn infer_from_text(text: &str) -> Option<Self> {
        let lowered = text.to_lowercase();
        RISK_KEYWORDS
            .iter()
            .filter_map(|(keyword, level)| lowered.find(keyword).map(|position| (position, *level)))
            .min_by_key(|(position, _)| *position)
            .map(|(_, level)| level)
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.label())
    }
}

/// Parse error for [`RiskLevel`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported risk level '{value}': valid options are 'high', 'medium', or 'low'")]
pub struct RiskLevelParseError {
    value: String,
}

impl FromStr for RiskLevel {
    type Err = RiskLevelParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "high" | "h" | "高" | "高風險" => Ok(Self::High),
            "medium" | "m" | "中" | "中風險" => Ok(Self::Medium),
            "low" | "l" | "低" | "低風險" => Ok(Self::Low),
            _ => Err(RiskLevelParseError {
                value: value.to_owned(),
            }),
        }
    }
}

/// Review progress of one resident within a session.
///
/// Ordering follows the lifecycle so a status only ever moves forward with
/// [`ReviewStatus::advance_to`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ReviewStatus {
    /// Loaded with no AI fields and no review.
    Unreviewed,
    /// AI fields have been populated.
    Annotated,
    /// A pharmacist review has been submitted.
    Reviewed,
}

impl ReviewStatus {
    /// Returns the later of the current and requested status.
    #[must_use]
    pub fn advance_to(self, next: Self) -> Self {
        self.max(next)
    }

    /// Human-readable label used in CLI output and exports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Unreviewed => "unreviewed",
            Self::Annotated => "annotated",
            Self::Reviewed => "reviewed",
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.label())
    }
}

/// One resident's medication record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResidentRecord {
    /// Resident name; the join key within a roster.
    pub name: String,
    /// Age in years.
    pub age: u32,
    /// Free-text chronic conditions.
    pub conditions: String,
    /// Ordered medication names.
    pub medications: Vec<String>,
    /// AI risk summary.
    pub ai_risk: String,
    /// AI interaction summary; empty when fewer than two medications or no
    /// interaction was found.
    pub ai_interactions: String,
    /// Reviewing pharmacist.
    pub reviewer: String,
    /// Risk level chosen by the reviewer.
    pub reviewer_risk_level: Option<RiskLevel>,
    /// Reviewer correction to the AI judgment.
    pub correction_note: String,
    /// When the latest review was submitted.
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Review progress within the current session.
    pub status: ReviewStatus,
}

impl ResidentRecord {
    /// Creates an unreviewed record with empty AI and review fields.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        age: u32,
        conditions: impl Into<String>,
        medications: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            age,
            conditions: conditions.into(),
            medications,
            ai_risk: String::new(),
            ai_interactions: String::new(),
            reviewer: String::new(),
            reviewer_risk_level: None,
            correction_note: String::new(),
            reviewed_at: None,
            status: ReviewStatus::Unreviewed,
        }
    }

    /// Derives the status implied by the record's current fields.
    ///
    /// Used when a record is loaded from the store, where earlier sessions may
    /// already have annotated or reviewed it.
    #[must_use]
    pub fn derived_status(&self) -> ReviewStatus {
        if !self.reviewer.trim().is_empty() && self.reviewed_at.is_some() {
            ReviewStatus::Reviewed
        } else if !self.ai_risk.trim().is_empty() || !self.ai_interactions.trim().is_empty() {
            ReviewStatus::Annotated
        } else {
            ReviewStatus::Unreviewed
        }
    }

    /// Returns true when the AI interaction summary reports something.
    #[must_use]
    pub fn has_interactions(&self) -> bool {
        !self.ai_interactions.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{ResidentRecord, ReviewStatus, RiskLevel};

    #[rstest]
    #[case("high", Some(RiskLevel::High))]
    #[case("Medium", Some(RiskLevel::Medium))]
    #[case(" LOW ", Some(RiskLevel::Low))]
    #[case("高", Some(RiskLevel::High))]
    #[case("中", Some(RiskLevel::Medium))]
    #[case("低風險", Some(RiskLevel::Low))]
    #[case("severe", None)]
    #[case("", None)]
    fn parse_risk_level(#[case] value: &str, #[case] expected: Option<RiskLevel>) {
        let parsed = value.parse::<RiskLevel>();
        match expected {
            Some(level) => assert_eq!(parsed.ok(), Some(level)),
            None => assert!(parsed.is_err(), "expected parse error for {value:?}"),
        }
    }

    #[rstest]
    #[case("整體屬於低風險，建議持續觀察。", Some(RiskLevel::Low))]
    #[case("High risk of bleeding; low risk otherwise.", Some(RiskLevel::High))]
    #[case("Overall LOW RISK.", Some(RiskLevel::Low))]
    #[case("需注意腎功能", None)]
    fn infer_risk_level_from_text(#[case] text: &str, #[case] expected: Option<RiskLevel>) {
        assert_eq!(RiskLevel::infer_from_text(text), expected);
    }

    #[test]
    fn status_never_moves_backwards() {
        assert_eq!(
            ReviewStatus::Reviewed.advance_to(ReviewStatus::Annotated),
            ReviewStatus::Reviewed
        );
        assert_eq!(
            ReviewStatus::Unreviewed.advance_to(ReviewStatus::Annotated),
            ReviewStatus::Annotated
        );
    }

    #[test]
    fn derived_status_reflects_fields() {
        let mut record = ResidentRecord::new("Chen", 80, "", vec!["A".to_owned()]);
        assert_eq!(record.derived_status(), ReviewStatus::Unreviewed);

        record.ai_risk = "低風險".to_owned();
        assert_eq!(record.derived_status(), ReviewStatus::Annotated);

        record.reviewer = "Lin".to_owned();
        record.reviewed_at = Some(chrono::Utc::now());
        assert_eq!(record.derived_status(), ReviewStatus::Reviewed);
    }
}
