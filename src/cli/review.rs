//! Recording one pharmacist review.

use std::io::{self, Write};

use smartmeds::{ReviewError, ReviewSubmission, RiskLevel, SmartMedsConfig};

use super::output::write_review_confirmation_to;
use super::session;

/// Builds the submission from `--resident`, `--reviewer`, `--risk-level`,
/// `--correction-note`, and `--disagree`.
///
/// Missing fields are left empty so the workflow's validation names them.
///
/// # Errors
///
/// Returns [`ReviewError::Validation`] for an unrecognised risk level.
pub fn submission_from_config(config: &SmartMedsConfig) -> Result<ReviewSubmission, ReviewError> {
    let mut submission = ReviewSubmission::new(
        config.resident.clone().unwrap_or_default(),
        config.reviewer.clone().unwrap_or_default(),
    );

    if let Some(text) = config.risk_level.as_deref() {
        let level = text
            .parse::<RiskLevel>()
            .map_err(|error| ReviewError::validation(error.to_string()))?;
        submission = submission.with_risk_level(level);
    }
    if let Some(note) = config.correction_note.as_deref() {
        submission = submission.with_correction_note(note);
    }
    if config.disagree {
        submission = submission.with_agreement(false);
    }
    Ok(submission)
}

/// Loads the roster, optionally re-annotates the resident, and appends the
/// review.
///
/// # Errors
///
/// Returns [`ReviewError::Validation`] when the submission is rejected and
/// [`ReviewError::DataSource`] when the roster cannot be read or the review
/// row cannot be appended.
pub fn run(config: &SmartMedsConfig) -> Result<(), ReviewError> {
    let mut stdout = io::stdout().lock();
    run_to(config, &mut stdout)
}

/// Like [`run`], writing to `writer`.
///
/// # Errors
///
/// See [`run`].
pub fn run_to<W: Write>(config: &SmartMedsConfig, writer: &mut W) -> Result<(), ReviewError> {
    let submission = submission_from_config(config)?;
    let mut workflow = session::start(config)?;

    if config.annotate {
        let report = workflow.annotate_one(&submission.resident)?;
        if !report.is_clean() {
            tracing::warn!(
                resident = submission.resident.as_str(),
                failures = report.failures.len(),
                "reviewing with incomplete AI annotations"
            );
        }
    }

    let record = workflow.submit_review(&submission)?;
    write_review_confirmation_to(writer, record)
}
