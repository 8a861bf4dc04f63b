//! Local persistence and database migrations.
//!
//! The local `SQLite` store is an offline stand-in for the spreadsheet: an
//! append-only table of roster rows. The schema is managed with Diesel
//! migrations so the database can be created and upgraded consistently
//! across machines.

mod error;
mod migrator;
mod sqlite_store;

pub use error::PersistenceError;
pub use migrator::{CURRENT_SCHEMA_VERSION, MigrationReport, migrate_database};
pub use sqlite_store::SqliteStore;
