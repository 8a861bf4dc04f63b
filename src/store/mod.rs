//! Backing stores for the roster.
//!
//! A store is spreadsheet-like: it returns every row keyed by header, and it
//! accepts new rows at the end. Rows are never updated in place, so every
//! review submission leaves one audit row behind.
//!
//! # Implementations
//!
//! - [`GoogleSheetsStore`]: the first worksheet of a Google spreadsheet found
//!   by name
//! - [`SqliteStore`](crate::persistence::SqliteStore): a local append-only
//!   table
//! - [`MemoryStore`]: in-memory rows with failure injection for tests

mod import;
#[cfg(any(test, feature = "test-support"))]
mod memory;
mod sheets;

pub use import::{import_csv, read_csv_rows};
#[cfg(any(test, feature = "test-support"))]
pub use memory::MemoryStore;
pub use sheets::{
    DEFAULT_DRIVE_BASE_URL, DEFAULT_SHEETS_BASE_URL, GoogleSheetsConfig, GoogleSheetsStore,
    ServiceAccountKey,
};

use crate::error::ReviewError;
use crate::roster::{SheetRow, StoreRow};

/// Long-lived handle to the backing store, owned by the workflow for one
/// session.
pub trait SpreadsheetStore {
    /// Reads every row of the backing table, header row excluded.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::DataSource`] when the store cannot be read.
    fn read_all(&mut self) -> Result<Vec<SheetRow>, ReviewError>;

    /// Appends one row at the end of the backing table.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::DataSource`] when the append fails.
    fn append(&mut self, row: &StoreRow) -> Result<(), ReviewError>;

    /// Human-readable description used in logs and messages.
    fn describe(&self) -> String;
}
