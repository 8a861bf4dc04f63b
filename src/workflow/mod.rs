//! The medication review workflow.
//!
//! A [`ReviewWorkflow`] owns one session: the long-lived store handle, the
//! two advisors, and the roster loaded from the store. Phases run one at a
//! time on the caller's thread:
//!
//! 1. [`ReviewWorkflow::load`] replaces the roster with the store's rows.
//! 2. [`ReviewWorkflow::annotate_all`] refreshes AI fields in memory.
//! 3. [`ReviewWorkflow::submit_review`] records a review and appends one
//!    audit row.
//! 4. [`ReviewWorkflow::report`] builds the read-only report view.

mod annotate;
mod clock;
mod review;

use std::sync::Arc;

pub use annotate::{AnnotationFailure, AnnotationReport};
pub use clock::{Clock, FixedClock, SystemClock};
pub use review::{CorrectionNotePolicy, ReviewSubmission};

use crate::advisor::{InteractionAdvisor, RiskAdvisor};
use crate::error::ReviewError;
use crate::export::{ReportFilter, ReportRow};
use crate::roster::{ResidentRecord, ReviewStatus, Roster, to_store_row};
use crate::store::SpreadsheetStore;
use crate::telemetry::{NoopTelemetrySink, TelemetryEvent, TelemetrySink};

/// One line of the roster overview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryEntry {
    /// Resident name.
    pub name: String,
    /// Age in years.
    pub age: u32,
    /// Number of medications.
    pub medication_count: usize,
    /// Whether the AI reported interactions.
    pub has_interactions: bool,
    /// Review status.
    pub status: ReviewStatus,
}

impl From<&ResidentRecord> for SummaryEntry {
    fn from(record: &ResidentRecord) -> Self {
        Self {
            name: record.name.clone(),
            age: record.age,
            medication_count: record.medications.len(),
            has_interactions: record.has_interactions(),
            status: record.status,
        }
    }
}

/// Coordinates load, annotation, review, and reporting for one session.
pub struct ReviewWorkflow {
    store: Box<dyn SpreadsheetStore>,
    risk_advisor: Arc<dyn RiskAdvisor>,
    interaction_advisor: Arc<dyn InteractionAdvisor>,
    policy: CorrectionNotePolicy,
    clock: Box<dyn Clock>,
    telemetry: Arc<dyn TelemetrySink>,
    roster: Option<Roster>,
}

impl std::fmt::Debug for ReviewWorkflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReviewWorkflow")
            .field("store", &self.store.describe())
            .field("policy", &self.policy)
            .field("residents", &self.roster.as_ref().map(Roster::len))
            .finish_non_exhaustive()
    }
}

impl ReviewWorkflow {
    /// Creates a workflow with the optional correction-note policy, the
    /// system clock, and no telemetry.
    #[must_use]
    pub fn new(
        store: Box<dyn SpreadsheetStore>,
        risk_advisor: Arc<dyn RiskAdvisor>,
        interaction_advisor: Arc<dyn InteractionAdvisor>,
    ) -> Self {
        Self {
            store,
            risk_advisor,
            interaction_advisor,
            policy: CorrectionNotePolicy::default(),
            clock: Box::new(SystemClock),
            telemetry: Arc::new(NoopTelemetrySink),
            roster: None,
        }
    }

    /// Sets the correction-note policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: CorrectionNotePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replaces the clock used for review timestamps.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Replaces the telemetry sink.
    #[must_use]
    pub fn with_telemetry(mut self, telemetry: Arc<dyn TelemetrySink>) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Description of the backing store.
    #[must_use]
    pub fn store_description(&self) -> String {
        self.store.describe()
    }

    /// Reads the whole store and replaces the roster.
    ///
    /// The previous roster is discarded first, so a failed load leaves no
    /// roster behind.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::DataSource`] when the store cannot be read or a
    /// row is malformed.
    pub fn load(&mut self) -> Result<&Roster, ReviewError> {
        self.roster = None;
        let rows = self.store.read_all()?;
        let roster = Roster::from_rows(&rows)?;

        tracing::info!(
            rows = rows.len(),
            residents = roster.len(),
            store = %self.store.describe(),
            "loaded roster"
        );
        self.telemetry.record(TelemetryEvent::RosterLoaded {
            rows: rows.len(),
            residents: roster.len(),
        });
        Ok(self.roster.insert(roster))
    }

    /// The loaded roster.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::RosterNotLoaded`] before a successful load.
    pub fn roster(&self) -> Result<&Roster, ReviewError> {
        self.roster.as_ref().ok_or(ReviewError::RosterNotLoaded)
    }

    /// Refreshes the AI fields of every resident, in roster order.
    ///
    /// Nothing is written to the store. Advisor failures are collected in the
    /// report rather than returned.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::RosterNotLoaded`] before a successful load.
    pub fn annotate_all(&mut self) -> Result<AnnotationReport, ReviewError> {
        let roster = self.roster.as_mut().ok_or(ReviewError::RosterNotLoaded)?;
        let mut report = AnnotationReport::default();
        for record in roster.iter_mut() {
            report.absorb(annotate::annotate_record(
                record,
                self.risk_advisor.as_ref(),
                self.interaction_advisor.as_ref(),
            ));
        }

        tracing::info!(
            annotated = report.annotated,
            failed = report.failures.len(),
            "annotation finished"
        );
        self.telemetry.record(TelemetryEvent::AnnotationCompleted {
            annotated: report.annotated,
            failed: report.failures.len(),
        });
        Ok(report)
    }

    /// Refreshes the AI fields of one resident.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::RosterNotLoaded`] before a successful load and
    /// [`ReviewError::Validation`] when the resident is not in the roster.
    pub fn annotate_one(&mut self, name: &str) -> Result<AnnotationReport, ReviewError> {
        let roster = self.roster.as_mut().ok_or(ReviewError::RosterNotLoaded)?;
        let record = roster.get_mut(name).ok_or_else(|| unknown_resident(name))?;

        let mut report = AnnotationReport::default();
        report.absorb(annotate::annotate_record(
            record,
            self.risk_advisor.as_ref(),
            self.interaction_advisor.as_ref(),
        ));
        Ok(report)
    }

    /// Records a review and appends the resident's full row to the store.
    ///
    /// Validation runs before anything changes. Once valid, the in-memory
    /// record is updated and exactly one row is appended. A failed append is
    /// reported but does not undo the in-memory update.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::RosterNotLoaded`] before a successful load,
    /// [`ReviewError::Validation`] for an unknown resident or incomplete
    /// submission, and [`ReviewError::DataSource`] when the append fails.
    pub fn submit_review(
        &mut self,
        submission: &ReviewSubmission,
    ) -> Result<&ResidentRecord, ReviewError> {
        let roster = self.roster.as_mut().ok_or(ReviewError::RosterNotLoaded)?;
        let record = roster
            .get_mut(&submission.resident)
            .ok_or_else(|| unknown_resident(&submission.resident))?;
        let level = submission.validate(record, self.policy)?;

        record.reviewer = submission.reviewer.trim().to_owned();
        record.reviewer_risk_level = Some(level);
        record.correction_note = submission.correction_note.trim().to_owned();
        record.reviewed_at = Some(self.clock.now());
        record.status = record.status.advance_to(ReviewStatus::Reviewed);

        if let Err(error) = self.store.append(&to_store_row(record)) {
            tracing::warn!(
                resident = record.name.as_str(),
                error = %error,
                "review kept in memory but the store append failed"
            );
            return Err(error);
        }

        tracing::info!(
            resident = record.name.as_str(),
            risk_level = level.label(),
            "appended review"
        );
        self.telemetry.record(TelemetryEvent::ReviewAppended {
            resident: record.name.clone(),
            risk_level: level.label().to_owned(),
        });
        Ok(record)
    }

    /// Builds the report view in roster order.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::RosterNotLoaded`] before a successful load.
    pub fn report(&self, filter: &ReportFilter) -> Result<Vec<ReportRow>, ReviewError> {
        let rows = self.roster()?.iter().map(ReportRow::from).collect();
        Ok(filter.apply(rows))
    }

    /// One overview entry per resident, in roster order.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::RosterNotLoaded`] before a successful load.
    pub fn summary(&self) -> Result<Vec<SummaryEntry>, ReviewError> {
        Ok(self.roster()?.iter().map(SummaryEntry::from).collect())
    }
}

fn unknown_resident(name: &str) -> ReviewError {
    ReviewError::validation(format!(
        "resident '{name}' is not in the roster; choose one of the loaded residents"
    ))
}
