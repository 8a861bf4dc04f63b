//! Shared test utilities.

use smartmeds::roster::{Column, SheetRow};
use tempfile::TempDir;

pub mod runtime;

/// Creates a temporary directory for database and export tests.
///
/// # Panics
///
/// Panics if the temporary directory cannot be created.
pub fn create_temp_dir() -> TempDir {
    TempDir::new().unwrap_or_else(|error| panic!("failed to create temporary directory: {error}"))
}

/// Builds a roster row with canonical headers.
pub fn roster_row(name: &str, age: &str, medications: &str) -> SheetRow {
    SheetRow::from_pairs([
        (Column::Name.header(), name),
        (Column::Age.header(), age),
        (Column::Medications.header(), medications),
    ])
}
