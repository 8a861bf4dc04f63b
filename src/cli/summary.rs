//! Roster overview, the default operation mode.

use std::io::{self, Write};

use smartmeds::{ReviewError, SmartMedsConfig};

use super::output::write_summary_to;
use super::session;

/// Loads the roster and prints one line per resident.
///
/// # Errors
///
/// Returns [`ReviewError::Configuration`] for missing store settings and
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
    let workflow = session::start(config)?;
    let entries = workflow.summary()?;
    write_summary_to(writer, &workflow.store_description(), &entries)
}
