//! Database migration operations.

use smartmeds::persistence::{PersistenceError, migrate_database};
use smartmeds::{ReviewError, SmartMedsConfig};

use super::session::telemetry_sink;

/// Runs database migrations.
///
/// # Errors
///
/// Returns [`ReviewError::Configuration`] if the database URL is missing or
/// blank, and [`ReviewError::DataSource`] for connection or migration
/// failures.
pub fn run(config: &SmartMedsConfig) -> Result<(), ReviewError> {
    let database_url = config
        .database_url
        .as_deref()
        .ok_or_else(|| ReviewError::configuration(PersistenceError::MissingDatabaseUrl.to_string()))?;

    let telemetry = telemetry_sink(config);
    let report = migrate_database(database_url, telemetry.as_ref())?;
    if report.changed_schema() {
        tracing::debug!(applied = ?report.applied, "migrations complete");
    } else {
        tracing::debug!(
            schema_version = report.schema_version.as_str(),
            "review database already current"
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use smartmeds::{ReviewError, SmartMedsConfig};

    use super::run;
    use crate::cli::session::open_store;

    #[rstest]
    #[case::missing_database_url(None, "database URL is required")]
    #[case::blank_database_url(Some("   ".to_owned()), "database URL must not be blank")]
    fn migrate_db_rejects_invalid_database_url(
        #[case] database_url: Option<String>,
        #[case] expected_message_prefix: &str,
    ) {
        let config = SmartMedsConfig {
            database_url,
            migrate_db: true,
            ..Default::default()
        };

        let result = run(&config);

        match result {
            Err(ReviewError::Configuration { message }) => {
                assert!(
                    message.starts_with(expected_message_prefix),
                    "expected message starting with {expected_message_prefix:?}, got {message:?}"
                );
            }
            other => panic!("expected Configuration error, got {other:?}"),
        }
    }

    #[rstest]
    fn migrated_database_opens_as_store() {
        let temp_dir = tempfile::TempDir::new().expect("temp dir");
        let database_url = temp_dir
            .path()
            .join("reviews.sqlite")
            .to_string_lossy()
            .into_owned();
        let config = SmartMedsConfig {
            store: Some("sqlite".to_owned()),
            database_url: Some(database_url),
            migrate_db: true,
            ..Default::default()
        };

        run(&config).expect("migrations should run");
        run(&config).expect("re-running migrations is a no-op");

        assert!(open_store(&config).is_ok());
    }
}
