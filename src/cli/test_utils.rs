//! Shared fixtures for CLI handler tests.

use smartmeds::SmartMedsConfig;
use smartmeds::persistence::{SqliteStore, migrate_database};
use smartmeds::roster::{ResidentRecord, to_store_row};
use smartmeds::telemetry::NoopTelemetrySink;
use tempfile::TempDir;

/// Creates a migrated, empty `SQLite` store and a config pointing at it.
pub fn migrated_config() -> (TempDir, SmartMedsConfig) {
    let temp_dir = TempDir::new().expect("temp dir");
    let database_url = temp_dir
        .path()
        .join("reviews.sqlite")
        .to_string_lossy()
        .into_owned();
    migrate_database(&database_url, &NoopTelemetrySink).expect("migrations should run");

    let config = SmartMedsConfig {
        store: Some("sqlite".to_owned()),
        database_url: Some(database_url),
        ai_api_key: Some("sk-test".to_owned()),
        ..Default::default()
    };
    (temp_dir, config)
}

/// Like [`migrated_config`], with Chen and Wang already in the store.
pub fn seeded_config() -> (TempDir, SmartMedsConfig) {
    let (temp_dir, config) = migrated_config();
    let mut store = open_sqlite(&config);
    for record in [
        ResidentRecord::new(
            "Chen",
            80,
            "CKD",
            vec!["Aspirin".to_owned(), "Warfarin".to_owned()],
        ),
        ResidentRecord::new("Wang", 72, "Hypertension", vec!["Amlodipine".to_owned()]),
    ] {
        store.insert(&to_store_row(&record)).expect("seed row");
    }
    (temp_dir, config)
}

/// Opens the `SQLite` store named by the config.
pub fn open_sqlite(config: &SmartMedsConfig) -> SqliteStore {
    SqliteStore::open(config.database_url.clone().expect("database url")).expect("open store")
}

/// Collects written output as UTF-8.
pub fn utf8(buffer: Vec<u8>) -> String {
    String::from_utf8(buffer).expect("output should be UTF-8")
}
