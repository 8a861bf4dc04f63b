//! Append-only review store backed by a local `SQLite` database.
//!
//! The table mirrors the spreadsheet layout: one text column per roster
//! column, one row per appended audit entry. Cells are stored as text so the
//! roster parser validates them exactly as it validates spreadsheet cells.

use diesel::QueryableByName;
use diesel::RunQueryDsl;
use diesel::sql_query;
use diesel::sql_types::Text;
use diesel::sqlite::SqliteConnection;

use crate::error::ReviewError;
use crate::roster::{SheetRow, StoreRow};
use crate::store::SpreadsheetStore;

use super::PersistenceError;
use super::migrator::{connect, pending_migrations};

/// `SQLite` review store holding one open connection for the session.
pub struct SqliteStore {
    database_url: String,
    connection: SqliteConnection,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("SqliteStore")
            .field("database_url", &self.database_url)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, QueryableByName)]
struct ReviewRow {
    #[diesel(sql_type = Text)]
    name: String,
    #[diesel(sql_type = Text)]
    age: String,
    #[diesel(sql_type = Text)]
    conditions: String,
    #[diesel(sql_type = Text)]
    medications: String,
    #[diesel(sql_type = Text)]
    ai_risk: String,
    #[diesel(sql_type = Text)]
    ai_interactions: String,
    #[diesel(sql_type = Text)]
    reviewer: String,
    #[diesel(sql_type = Text)]
    reviewer_risk_level: String,
    #[diesel(sql_type = Text)]
    correction_note: String,
    #[diesel(sql_type = Text)]
    reviewed_at: String,
}

impl From<ReviewRow> for StoreRow {
    fn from(row: ReviewRow) -> Self {
        Self::new([
            row.name,
            row.age,
            row.conditions,
            row.medications,
            row.ai_risk,
            row.ai_interactions,
            row.reviewer,
            row.reviewer_risk_level,
            row.correction_note,
            row.reviewed_at,
        ])
    }
}

impl SqliteStore {
    /// Opens the database and checks that every embedded migration has been
    /// applied.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::BlankDatabaseUrl`] for a blank URL,
    /// [`PersistenceError::ConnectionFailed`] when the database cannot be
    /// opened, and [`PersistenceError::PendingMigrations`] when `--migrate-db`
    /// has not been run since the last schema change.
    pub fn open(database_url: impl Into<String>) -> Result<Self, PersistenceError> {
        let database_url_string = database_url.into();
        let mut connection = connect(&database_url_string)?;

        let pending = pending_migrations(&mut connection)?;
        if !pending.is_empty() {
            return Err(PersistenceError::PendingMigrations {
                pending: pending.join(", "),
            });
        }

        Ok(Self {
            database_url: database_url_string,
            connection,
        })
    }

    /// Reads every stored row in append order.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::QueryFailed`] when the query fails.
    pub fn rows(&mut self) -> Result<Vec<StoreRow>, PersistenceError> {
        let rows: Vec<ReviewRow> = sql_query(
            "SELECT name, age, conditions, medications, ai_risk, ai_interactions, reviewer, \
             reviewer_risk_level, correction_note, reviewed_at \
             FROM review_rows ORDER BY id ASC;",
        )
        .load(&mut self.connection)
        .map_err(|error| PersistenceError::QueryFailed {
            message: error.to_string(),
        })?;

        Ok(rows.into_iter().map(StoreRow::from).collect())
    }

    /// Appends one row.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::WriteFailed`] when the insert fails.
    pub fn insert(&mut self, row: &StoreRow) -> Result<(), PersistenceError> {
        let [
            name,
            age,
            conditions,
            medications,
            ai_risk,
            ai_interactions,
            reviewer,
            reviewer_risk_level,
            correction_note,
            reviewed_at,
        ] = row.values();

        let affected = sql_query(
            "INSERT INTO review_rows \
             (name, age, conditions, medications, ai_risk, ai_interactions, reviewer, \
              reviewer_risk_level, correction_note, reviewed_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?);",
        )
        .bind::<Text, _>(name)
        .bind::<Text, _>(age)
        .bind::<Text, _>(conditions)
        .bind::<Text, _>(medications)
        .bind::<Text, _>(ai_risk)
        .bind::<Text, _>(ai_interactions)
        .bind::<Text, _>(reviewer)
        .bind::<Text, _>(reviewer_risk_level)
        .bind::<Text, _>(correction_note)
        .bind::<Text, _>(reviewed_at)
        .execute(&mut self.connection)
        .map_err(|error| PersistenceError::WriteFailed {
            message: error.to_string(),
        })?;

        if affected != 1 {
            return Err(PersistenceError::WriteFailed {
                message: format!("expected to insert 1 row but inserted {affected}"),
            });
        }
        Ok(())
    }
}

impl SpreadsheetStore for SqliteStore {
    fn read_all(&mut self) -> Result<Vec<SheetRow>, ReviewError> {
        let rows = self.rows()?;
        Ok(rows.iter().map(StoreRow::to_sheet_row).collect())
    }

    fn append(&mut self, row: &StoreRow) -> Result<(), ReviewError> {
        self.insert(row).map_err(ReviewError::from)
    }

    fn describe(&self) -> String {
        format!("SQLite database '{}'", self.database_url)
    }
}
