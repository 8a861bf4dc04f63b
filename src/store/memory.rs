//! In-memory store for tests.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::ReviewError;
use crate::roster::{SheetRow, StoreRow};

use super::SpreadsheetStore;

#[derive(Debug, Default)]
struct MemoryState {
    rows: Vec<SheetRow>,
    appended: Vec<StoreRow>,
    read_failure: Option<String>,
    append_failure: Option<String>,
}

/// In-memory store whose clones share state.
///
/// Hand one clone to the workflow and keep another to inspect appended rows
/// or inject failures.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    /// Creates a store pre-populated with rows.
    #[must_use]
    pub fn with_rows(rows: Vec<SheetRow>) -> Self {
        let store = Self::default();
        store.lock().rows = rows;
        store
    }

    /// Makes every subsequent read fail with `message`.
    pub fn fail_reads(&self, message: impl Into<String>) {
        self.lock().read_failure = Some(message.into());
    }

    /// Makes every subsequent append fail with `message`.
    pub fn fail_appends(&self, message: impl Into<String>) {
        self.lock().append_failure = Some(message.into());
    }

    /// Rows successfully appended so far, in order.
    #[must_use]
    pub fn appended(&self) -> Vec<StoreRow> {
        self.lock().appended.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl SpreadsheetStore for MemoryStore {
    fn read_all(&mut self) -> Result<Vec<SheetRow>, ReviewError> {
        let state = self.lock();
        if let Some(message) = &state.read_failure {
            return Err(ReviewError::data_source(message.clone()));
        }
        Ok(state.rows.clone())
    }

    fn append(&mut self, row: &StoreRow) -> Result<(), ReviewError> {
        let mut state = self.lock();
        if let Some(message) = &state.append_failure {
            return Err(ReviewError::data_source(message.clone()));
        }
        state.rows.push(row.to_sheet_row());
        state.appended.push(row.clone());
        Ok(())
    }

    fn describe(&self) -> String {
        "in-memory store".to_owned()
    }
}
