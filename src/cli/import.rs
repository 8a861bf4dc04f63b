//! Seeding the store from a CSV roster.

use std::fs::File;
use std::io::{self, BufReader, Write};

use smartmeds::error::io_error;
use smartmeds::store::import_csv;
use smartmeds::{ReviewError, SmartMedsConfig};

use super::session;

/// Appends every row of the `--import` CSV to the configured store.
///
/// # Errors
///
/// Returns [`ReviewError::Io`] when the file cannot be opened or read and
/// [`ReviewError::DataSource`] for malformed rows or failed appends.
pub fn run(config: &SmartMedsConfig) -> Result<(), ReviewError> {
    let mut stdout = io::stdout().lock();
    run_to(config, &mut stdout)
}

/// Like [`run`], writing the confirmation to `writer`.
///
/// # Errors
///
/// See [`run`].
pub fn run_to<W: Write>(config: &SmartMedsConfig, writer: &mut W) -> Result<(), ReviewError> {
    let path = config
        .import
        .as_deref()
        .ok_or_else(|| ReviewError::configuration("CSV path is required (use --import)"))?;
    let file = File::open(path).map_err(|error| ReviewError::Io {
        message: format!("failed to open CSV roster '{path}': {error}"),
    })?;

    let mut store = session::open_store(config)?;
    let imported = import_csv(BufReader::new(file), store.as_mut())?;
    writeln!(writer, "Imported {imported} rows into {}", store.describe())
        .map_err(|e| io_error(&e))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use smartmeds::roster::Column;
    use smartmeds::{ReviewError, SmartMedsConfig};

    use super::run_to;
    use crate::cli::test_utils::{migrated_config, open_sqlite, utf8};

    fn config_with_csv(base: SmartMedsConfig, dir: &tempfile::TempDir, csv: &str) -> SmartMedsConfig {
        let path = dir.path().join("roster.csv");
        std::fs::write(&path, csv).expect("write CSV");
        SmartMedsConfig {
            import: Some(path.to_string_lossy().into_owned()),
            ..base
        }
    }

    #[rstest]
    fn imports_legacy_csv_in_file_order() {
        let (temp_dir, base) = migrated_config();
        let config = config_with_csv(
            base,
            &temp_dir,
            "姓名,年齡,疾病,用藥\nChen,80,CKD,\"Aspirin, Warfarin\"\nWang,72,,Amlodipine\n",
        );
        let mut buffer = Vec::new();

        run_to(&config, &mut buffer).expect("import should succeed");

        let rows = open_sqlite(&config).rows().expect("rows");
        let names: Vec<&str> = rows.iter().map(|row| row.value(Column::Name)).collect();
        assert_eq!(names, vec!["Chen", "Wang"]);
        assert!(utf8(buffer).starts_with("Imported 2 rows into "));
    }

    #[rstest]
    fn malformed_age_imports_nothing() {
        let (temp_dir, base) = migrated_config();
        let config = config_with_csv(
            base,
            &temp_dir,
            "name,age,medications\nChen,80,A\nWang,old,B\n",
        );

        let result = run_to(&config, &mut Vec::new());

        assert!(
            matches!(&result, Err(ReviewError::DataSource { message }) if message.contains("row 3")),
            "unexpected result: {result:?}"
        );
        assert!(open_sqlite(&config).rows().expect("rows").is_empty());
    }

    #[rstest]
    fn missing_file_is_an_io_error() {
        let (temp_dir, base) = migrated_config();
        let config = SmartMedsConfig {
            import: Some(temp_dir.path().join("absent.csv").to_string_lossy().into_owned()),
            ..base
        };

        assert!(matches!(
            run_to(&config, &mut Vec::new()),
            Err(ReviewError::Io { .. })
        ));
    }
}
