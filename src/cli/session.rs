//! Builds a review session from configuration.
//!
//! The store handle and the advisors are created once here and owned by the
//! workflow until the process exits.

use std::sync::Arc;

use smartmeds::advisor::{InteractionAdvisor, OpenAiAdvisor, RiskAdvisor};
use smartmeds::persistence::SqliteStore;
use smartmeds::store::{GoogleSheetsStore, SpreadsheetStore};
use smartmeds::telemetry::{NoopTelemetrySink, StderrJsonlTelemetrySink, TelemetrySink};
use smartmeds::{ReviewError, ReviewWorkflow, SmartMedsConfig, StoreKind};

/// Risk and interaction advisors for one session.
pub struct Advisors {
    /// Risk advisor.
    pub risk: Arc<dyn RiskAdvisor>,
    /// Interaction advisor.
    pub interactions: Arc<dyn InteractionAdvisor>,
}

/// Opens the configured backing store.
///
/// # Errors
///
/// Returns [`ReviewError::Configuration`] for missing settings and
/// [`ReviewError::DataSource`] when the store cannot be opened.
pub fn open_store(config: &SmartMedsConfig) -> Result<Box<dyn SpreadsheetStore>, ReviewError> {
    let store: Box<dyn SpreadsheetStore> = match config.store_kind()? {
        StoreKind::Sheets => Box::new(GoogleSheetsStore::open(config.sheets_config()?)?),
        StoreKind::Sqlite => Box::new(SqliteStore::open(config.require_database_url()?)?),
    };
    tracing::debug!(store = %store.describe(), "opened store");
    Ok(store)
}

/// Builds the advisors. One HTTP client serves both.
///
/// # Errors
///
/// Returns [`ReviewError::Configuration`] when no usable API key is
/// configured.
pub fn build_advisors(config: &SmartMedsConfig) -> Result<Advisors, ReviewError> {
    let advisor = Arc::new(OpenAiAdvisor::new(config.advisor_config()?)?);
    Ok(Advisors {
        risk: Arc::clone(&advisor) as Arc<dyn RiskAdvisor>,
        interactions: advisor,
    })
}

/// Telemetry sink selected by `--telemetry`.
#[must_use]
pub fn telemetry_sink(config: &SmartMedsConfig) -> Arc<dyn TelemetrySink> {
    if config.telemetry {
        Arc::new(StderrJsonlTelemetrySink)
    } else {
        Arc::new(NoopTelemetrySink)
    }
}

fn workflow_for(
    config: &SmartMedsConfig,
    store: Box<dyn SpreadsheetStore>,
    advisors: Advisors,
) -> ReviewWorkflow {
    ReviewWorkflow::new(store, advisors.risk, advisors.interactions)
        .with_policy(config.correction_policy())
        .with_telemetry(telemetry_sink(config))
}

/// Builds the advisors, opens the store, and loads the roster.
///
/// The advisors are built first so a missing API key stops the session
/// before the store is contacted.
///
/// # Errors
///
/// Returns [`ReviewError::Configuration`] for missing settings and
/// [`ReviewError::DataSource`] when the store cannot be opened or read.
pub fn start(config: &SmartMedsConfig) -> Result<ReviewWorkflow, ReviewError> {
    let advisors = build_advisors(config)?;
    let mut workflow = workflow_for(config, open_store(config)?, advisors);
    workflow.load()?;
    Ok(workflow)
}
