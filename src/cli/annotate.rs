//! Whole-roster annotation.

use std::io::{self, Write};

use smartmeds::{ReviewError, ReviewWorkflow, SmartMedsConfig};

use super::output::write_annotations_to;
use super::session;

/// Loads and annotates the roster, then prints every resident's AI fields.
///
/// Individual advisor failures are listed in the output; they do not fail the
/// run.
///
/// # Errors
///
/// Returns [`ReviewError::Configuration`] for missing settings and
/// [`ReviewError::DataSource`] when the roster cannot be read.
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
    let mut workflow = session::start(config)?;
    annotate_and_write(&mut workflow, writer)
}

fn annotate_and_write<W: Write>(
    workflow: &mut ReviewWorkflow,
    writer: &mut W,
) -> Result<(), ReviewError> {
    let report = workflow.annotate_all()?;
    write_annotations_to(writer, workflow.roster()?.iter(), &report)
}
