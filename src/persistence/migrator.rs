//! Schema management for the local review database.
//!
//! The `review_rows` table is created and upgraded only by `--migrate-db`.
//! Opening a [`SqliteStore`](super::SqliteStore) never changes the schema; it
//! asks the same migration harness which embedded migrations are outstanding
//! and refuses to serve a session until there are none.

use diesel::Connection;
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

use crate::telemetry::{TelemetryEvent, TelemetrySink};

use super::PersistenceError;

/// Review-table migrations compiled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Version of the newest review-table migration.
pub const CURRENT_SCHEMA_VERSION: &str = "20251001000000";

/// Outcome of one `--migrate-db` run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    /// Versions applied by this run, oldest first. Empty when the database
    /// was already current.
    pub applied: Vec<String>,
    /// Newest version recorded in the database after the run.
    pub schema_version: String,
}

impl MigrationReport {
    /// Whether the run changed the schema.
    #[must_use]
    pub const fn changed_schema(&self) -> bool {
        !self.applied.is_empty()
    }
}

/// Opens a connection to the review database.
pub(super) fn connect(database_url: &str) -> Result<SqliteConnection, PersistenceError> {
    let url = database_url.trim();
    if url.is_empty() {
        return Err(PersistenceError::BlankDatabaseUrl);
    }
    SqliteConnection::establish(url).map_err(|error| PersistenceError::ConnectionFailed {
        message: error.to_string(),
    })
}

/// Applies every outstanding review-table migration.
///
/// The resulting schema version is recorded in telemetry on every run, so
/// an operator can confirm a no-op run left the database where expected.
///
/// # Errors
///
/// Returns [`PersistenceError::BlankDatabaseUrl`] for a blank URL,
/// [`PersistenceError::ConnectionFailed`] when the file cannot be opened,
/// and [`PersistenceError::MigrationFailed`] when a migration is rejected.
pub fn migrate_database(
    database_url: &str,
    telemetry: &dyn TelemetrySink,
) -> Result<MigrationReport, PersistenceError> {
    let mut connection = connect(database_url)?;

    let applied: Vec<String> = connection
        .run_pending_migrations(MIGRATIONS)
        .map_err(|error| PersistenceError::MigrationFailed {
            message: error.to_string(),
        })?
        .iter()
        .map(ToString::to_string)
        .collect();
    let schema_version = latest_applied_version(&mut connection)?;

    tracing::info!(
        applied = applied.len(),
        schema_version = schema_version.as_str(),
        "review database migrated"
    );
    telemetry.record(TelemetryEvent::SchemaVersionRecorded {
        schema_version: schema_version.clone(),
    });
    Ok(MigrationReport {
        applied,
        schema_version,
    })
}

/// Names of embedded migrations not yet applied to `connection`.
pub(super) fn pending_migrations(
    connection: &mut SqliteConnection,
) -> Result<Vec<String>, PersistenceError> {
    let pending = connection
        .pending_migrations(MIGRATIONS)
        .map_err(|error| PersistenceError::QueryFailed {
            message: format!("could not list pending migrations: {error}"),
        })?;
    Ok(pending
        .iter()
        .map(|migration| migration.name().to_string())
        .collect())
}

fn latest_applied_version(connection: &mut SqliteConnection) -> Result<String, PersistenceError> {
    connection
        .applied_migrations()
        .map_err(|error| PersistenceError::SchemaVersionQueryFailed {
            message: error.to_string(),
        })?
        .iter()
        .map(ToString::to_string)
        .max()
        .ok_or(PersistenceError::MissingSchemaVersion)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{CURRENT_SCHEMA_VERSION, connect, migrate_database, pending_migrations};
    use crate::persistence::PersistenceError;
    use crate::telemetry::{NoopTelemetrySink, RecordingTelemetrySink, TelemetryEvent};

    #[rstest]
    fn fresh_database_has_review_table_pending() {
        let mut connection = connect(":memory:").expect("in-memory database opens");

        let pending = pending_migrations(&mut connection).expect("pending list");

        assert_eq!(pending, vec!["2025-10-01-000000_create_review_rows".to_owned()]);
    }

    #[rstest]
    fn first_run_creates_review_table_and_reports_version() {
        let telemetry = RecordingTelemetrySink::default();

        let report = migrate_database(":memory:", &telemetry).expect("migration should succeed");

        assert!(report.changed_schema());
        assert_eq!(report.applied, vec![CURRENT_SCHEMA_VERSION.to_owned()]);
        assert_eq!(report.schema_version, CURRENT_SCHEMA_VERSION);
        assert_eq!(
            telemetry.take(),
            vec![TelemetryEvent::SchemaVersionRecorded {
                schema_version: CURRENT_SCHEMA_VERSION.to_owned(),
            }]
        );
    }

    #[rstest]
    fn second_run_applies_nothing() {
        let temp_dir = tempfile::TempDir::new().expect("temp dir");
        let database_url = temp_dir
            .path()
            .join("reviews.sqlite")
            .to_string_lossy()
            .into_owned();
        migrate_database(&database_url, &NoopTelemetrySink).expect("first run");

        let report = migrate_database(&database_url, &NoopTelemetrySink).expect("second run");

        assert!(!report.changed_schema());
        assert_eq!(report.schema_version, CURRENT_SCHEMA_VERSION);
    }

    #[rstest]
    #[case::empty("")]
    #[case::spaces("  ")]
    fn blank_url_is_rejected_before_connecting(#[case] database_url: &str) {
        let error = migrate_database(database_url, &NoopTelemetrySink)
            .expect_err("blank URL should fail");

        assert_eq!(error, PersistenceError::BlankDatabaseUrl);
    }
}
