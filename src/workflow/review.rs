//! Review submissions and their validation.

use std::fmt;
use std::str::FromStr;

use crate::error::ReviewError;
use crate::roster::{ResidentRecord, RiskLevel};

/// When a correction note must accompany a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CorrectionNotePolicy {
    /// The note is never required.
    #[default]
    Optional,
    /// The note is required when the reviewer disagrees with the AI risk.
    RequiredOnDisagreement,
}

impl CorrectionNotePolicy {
    /// Maps the `require_correction_note` switch to a policy.
    #[must_use]
    pub const fn from_required(required: bool) -> Self {
        if required {
            Self::RequiredOnDisagreement
        } else {
            Self::Optional
        }
    }
}

impl FromStr for CorrectionNotePolicy {
    type Err = ReviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "optional" => Ok(Self::Optional),
            "required-on-disagreement" | "required" => Ok(Self::RequiredOnDisagreement),
            _ => Err(ReviewError::configuration(format!(
                "unsupported correction note policy '{s}': valid options are 'optional' or \
                 'required-on-disagreement'"
            ))),
        }
    }
}

impl fmt::Display for CorrectionNotePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Optional => write!(f, "optional"),
            Self::RequiredOnDisagreement => write!(f, "required-on-disagreement"),
        }
    }
}

/// A pharmacist's review of one resident.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewSubmission {
    /// Resident being reviewed.
    pub resident: String,
    /// Reviewing pharmacist.
    pub reviewer: String,
    /// Chosen risk level.
    pub risk_level: Option<RiskLevel>,
    /// Correction to the AI judgment.
    pub correction_note: String,
    /// Whether the reviewer agrees with the AI risk; inferred from the AI
    /// text when unset.
    pub agrees_with_ai: Option<bool>,
}

impl ReviewSubmission {
    /// Starts a submission for `resident` by `reviewer`.
    #[must_use]
    pub fn new(resident: impl Into<String>, reviewer: impl Into<String>) -> Self {
        Self {
            resident: resident.into(),
            reviewer: reviewer.into(),
            ..Self::default()
        }
    }

    /// Sets the risk level.
    #[must_use]
    pub const fn with_risk_level(mut self, level: RiskLevel) -> Self {
        self.risk_level = Some(level);
        self
    }

    /// Sets the correction note.
    #[must_use]
    pub fn with_correction_note(mut self, note: impl Into<String>) -> Self {
        self.correction_note = note.into();
        self
    }

    /// Records whether the reviewer agrees with the AI risk.
    #[must_use]
    pub const fn with_agreement(mut self, agrees: bool) -> Self {
        self.agrees_with_ai = Some(agrees);
        self
    }

    /// Returns true when the review disagrees with the AI risk for `record`.
    ///
    /// Without an explicit answer the AI risk text is scanned for a risk
    /// level; text naming no level never counts as disagreement.
    #[must_use]
    pub fn disagrees_with(&self, record: &ResidentRecord, level: RiskLevel) -> bool {
        self.agrees_with_ai.map_or_else(
            || RiskLevel::infer_from_text(&record.ai_risk).is_some_and(|ai| ai != level),
            |agrees| !agrees,
        )
    }

    /// Checks the submission against `record` and returns the risk level.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::Validation`] naming the field to correct.
    pub fn validate(
        &self,
        record: &ResidentRecord,
        policy: CorrectionNotePolicy,
    ) -> Result<RiskLevel, ReviewError> {
        if self.reviewer.trim().is_empty() {
            return Err(ReviewError::validation(
                "reviewer name is required; enter the reviewing pharmacist",
            ));
        }
        let Some(level) = self.risk_level else {
            return Err(ReviewError::validation(
                "risk level is required; choose high, medium, or low",
            ));
        };

        if policy == CorrectionNotePolicy::RequiredOnDisagreement
            && self.correction_note.trim().is_empty()
            && self.disagrees_with(record, level)
        {
            return Err(ReviewError::validation(format!(
                "correction note is required when the review ({level}) disagrees with the AI \
                 risk for '{}'",
                record.name
            )));
        }
        Ok(level)
    }
}
