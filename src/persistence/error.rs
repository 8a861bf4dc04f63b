//! Error types for local persistence operations.

use thiserror::Error;

use crate::error::ReviewError;

/// Errors returned while initialising, migrating, or using the local `SQLite`
/// review store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PersistenceError {
    /// No database URL/path was provided.
    #[error("database URL is required (use --database-url or SMARTMEDS_DATABASE_URL)")]
    MissingDatabaseUrl,

    /// The database URL/path was present but blank.
    #[error("database URL must not be blank")]
    BlankDatabaseUrl,

    /// Establishing a `SQLite` connection failed.
    #[error("failed to connect to SQLite database: {message}")]
    ConnectionFailed {
        /// Error detail from Diesel.
        message: String,
    },

    /// Running pending migrations failed.
    #[error("failed to run database migrations: {message}")]
    MigrationFailed {
        /// Error detail from Diesel migrations.
        message: String,
    },

    /// Reading the schema version from the migration table failed.
    #[error("failed to read schema version after migrations: {message}")]
    SchemaVersionQueryFailed {
        /// Error detail from Diesel query execution.
        message: String,
    },

    /// The migrations completed but no schema version could be found.
    #[error("no schema version recorded after migrations ran")]
    MissingSchemaVersion,

    /// Embedded migrations have not been applied to the database yet.
    #[error("database schema is not up to date, pending: {pending} (run with --migrate-db first)")]
    PendingMigrations {
        /// Comma-separated names of the outstanding migrations.
        pending: String,
    },

    /// Reading review rows failed.
    #[error("failed to read review rows: {message}")]
    QueryFailed {
        /// Error detail from Diesel query execution.
        message: String,
    },

    /// Appending a review row failed.
    #[error("failed to append review row: {message}")]
    WriteFailed {
        /// Error detail from Diesel query execution.
        message: String,
    },
}

impl From<PersistenceError> for ReviewError {
    /// Blank or missing database URLs are configuration problems; everything
    /// else is a failure of the data source.
    fn from(error: PersistenceError) -> Self {
        match error {
            PersistenceError::MissingDatabaseUrl | PersistenceError::BlankDatabaseUrl => {
                Self::Configuration {
                    message: error.to_string(),
                }
            }
            other => Self::DataSource {
                message: other.to_string(),
            },
        }
    }
}
