//! `SmartMeds` library crate for care-home medication reviews.
//!
//! The library loads a medication roster from a spreadsheet-like backing
//! store, annotates it with language-model risk and interaction summaries,
//! records one pharmacist review per resident as an appended audit row, and
//! renders the report view as CSV or JSONL.
//!
//! The [`workflow::ReviewWorkflow`] coordinates those phases; stores and
//! advisors are reached through the [`store::SpreadsheetStore`],
//! [`advisor::RiskAdvisor`], and [`advisor::InteractionAdvisor`] traits.

pub mod advisor;
pub mod config;
pub mod error;
pub mod export;
pub mod persistence;
pub mod roster;
pub mod store;
pub mod telemetry;
pub mod workflow;

pub use config::{OperationMode, SmartMedsConfig, StoreKind};
pub use error::ReviewError;
pub use roster::{ResidentRecord, ReviewStatus, RiskLevel, Roster};
pub use workflow::{CorrectionNotePolicy, ReviewSubmission, ReviewWorkflow};
