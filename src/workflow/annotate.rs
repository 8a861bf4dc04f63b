//! Annotation of resident records with advisor output.

use crate::advisor::{AdvisorKind, InteractionAdvisor, RiskAdvisor, assess_risk, check_interactions};
use crate::roster::{ResidentRecord, ReviewStatus};

/// One advisor call that failed during annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationFailure {
    /// Resident whose record was being annotated.
    pub resident: String,
    /// Advisor that failed.
    pub advisor: AdvisorKind,
    /// Error reported by the advisor.
    pub message: String,
}

/// Outcome of an annotate pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationReport {
    /// Residents whose advisor calls all succeeded.
    pub annotated: usize,
    /// Failed advisor calls, in roster order.
    pub failures: Vec<AnnotationFailure>,
}

impl AnnotationReport {
    /// Returns true when no advisor call failed.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Names of residents with at least one failed call, without repeats.
    #[must_use]
    pub fn failed_residents(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for failure in &self.failures {
            if !names.contains(&failure.resident.as_str()) {
                names.push(failure.resident.as_str());
            }
        }
        names
    }

    pub(super) fn absorb(&mut self, failures: Vec<AnnotationFailure>) {
        if failures.is_empty() {
            self.annotated += 1;
        }
        self.failures.extend(failures);
    }
}

/// Refreshes a record's AI fields.
///
/// A failed call leaves that field's previous value in place and does not
/// stop the other advisor. The record only advances to
/// [`ReviewStatus::Annotated`] when both calls succeed.
pub(super) fn annotate_record(
    record: &mut ResidentRecord,
    risk_advisor: &dyn RiskAdvisor,
    interaction_advisor: &dyn InteractionAdvisor,
) -> Vec<AnnotationFailure> {
    let mut failures = Vec::new();

    match assess_risk(risk_advisor, &record.medications) {
        Ok(summary) => record.ai_risk = summary,
        Err(error) => failures.push(failure(record, AdvisorKind::Risk, &error)),
    }
    match check_interactions(interaction_advisor, &record.medications) {
        Ok(summary) => record.ai_interactions = summary,
        Err(error) => failures.push(failure(record, AdvisorKind::Interaction, &error)),
    }

    if failures.is_empty() {
        record.status = record.status.advance_to(ReviewStatus::Annotated);
    }
    failures
}

fn failure(
    record: &ResidentRecord,
    advisor: AdvisorKind,
    error: &crate::error::ReviewError,
) -> AnnotationFailure {
    tracing::warn!(
        resident = record.name.as_str(),
        advisor = advisor.label(),
        error = %error,
        "advisor call failed; keeping previous value"
    );
    AnnotationFailure {
        resident: record.name.clone(),
        advisor,
        message: error.to_string(),
    }
}
