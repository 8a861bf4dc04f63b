//! Seeding a store from a CSV roster file.

use std::io::Read;

use crate::error::ReviewError;
use crate::roster::{Column, SheetRow, StoreRow, parse_record, to_store_row};

use super::SpreadsheetStore;

/// Reads a CSV file with a header row into header-keyed rows.
///
/// Canonical and legacy headers are both accepted; unknown columns are
/// ignored. Blank lines are skipped.
///
/// # Errors
///
/// Returns [`ReviewError::Io`] when the CSV cannot be read and
/// [`ReviewError::DataSource`] when it has no name column.
pub fn read_csv_rows<R: Read>(reader: R) -> Result<Vec<SheetRow>, ReviewError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|error| csv_error(&error))?
        .clone();
    if !headers
        .iter()
        .any(|header| Column::from_header(header) == Some(Column::Name))
    {
        return Err(ReviewError::data_source(
            "CSV roster has no name column (expected 'name' or '姓名')",
        ));
    }

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let cells = record.map_err(|error| csv_error(&error))?;
        if cells.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        let row = SheetRow::from_pairs(headers.iter().zip(cells.iter()));
        rows.push(tag_line(row, cells.position()));
    }
    Ok(rows)
}

/// Validates every CSV row and appends them to the store in file order.
///
/// Rows are validated before the first append so a malformed file leaves the
/// store untouched. Returns the number of appended rows.
///
/// # Errors
///
/// Returns [`ReviewError::DataSource`] naming the first malformed row or the
/// failed append, and [`ReviewError::Io`] when the CSV cannot be read.
pub fn import_csv<R: Read>(
    reader: R,
    store: &mut dyn SpreadsheetStore,
) -> Result<usize, ReviewError> {
    let rows = read_csv_rows(reader)?;
    let store_rows = rows
        .iter()
        .enumerate()
        .map(|(index, row)| {
            parse_record(row).map(|record| to_store_row(&record)).map_err(|message| {
                let line = row.source_row().unwrap_or(index + 2);
                ReviewError::data_source(format!("CSV row {line} is malformed: {message}"))
            })
        })
        .collect::<Result<Vec<StoreRow>, ReviewError>>()?;

    for row in &store_rows {
        store.append(row)?;
    }
    tracing::info!(
        rows = store_rows.len(),
        store = %store.describe(),
        "imported roster rows"
    );
    Ok(store_rows.len())
}

fn tag_line(row: SheetRow, position: Option<&csv::Position>) -> SheetRow {
    let Some(line) = position.and_then(|pos| usize::try_from(pos.line()).ok()) else {
        return row;
    };
    row.with_source_row(line)
}

fn csv_error(error: &csv::Error) -> ReviewError {
    ReviewError::Io {
        message: format!("failed to read CSV roster: {error}"),
    }
}

#[cfg(test)]
mod tests {
    use super::{import_csv, read_csv_rows};
    use crate::error::ReviewError;
    use crate::roster::Column;
    use crate::store::MemoryStore;

    #[test]
    fn reads_legacy_headers() {
        let csv = "姓名,年齡,疾病,用藥\n陳伯伯,82,高血壓,\"Aspirin, Warfarin\"\n\n";

        let rows = read_csv_rows(csv.as_bytes()).expect("CSV should parse");

        assert_eq!(rows.len(), 1);
        let row = rows.first().expect("one row");
        assert_eq!(row.get(Column::Name), Some("陳伯伯"));
        assert_eq!(row.get(Column::Medications), Some("Aspirin, Warfarin"));
    }

    #[test]
    fn rejects_csv_without_name_column() {
        let error = read_csv_rows("age\n80\n".as_bytes()).expect_err("should fail");

        assert!(matches!(error, ReviewError::DataSource { .. }));
    }

    #[test]
    fn import_appends_normalized_rows() {
        let store = MemoryStore::default();
        let mut handle = store.clone();
        let csv = "name,age,medications\nChen,80,A，B\nWang,75,\n";

        let count = import_csv(csv.as_bytes(), &mut handle).expect("import should succeed");

        assert_eq!(count, 2);
        let appended = store.appended();
        assert_eq!(
            appended.first().map(|row| row.value(Column::Medications)),
            Some("A, B")
        );
    }

    #[test]
    fn malformed_csv_appends_nothing() {
        let store = MemoryStore::default();
        let mut handle = store.clone();
        let csv = "name,age\nChen,80\nWang,old\n";

        let error = import_csv(csv.as_bytes(), &mut handle).expect_err("import should fail");

        assert!(
            matches!(&error, ReviewError::DataSource { message } if message.contains("CSV row 3")),
            "unexpected error: {error:?}"
        );
        assert!(store.appended().is_empty());
    }

    #[test]
    fn malformed_row_after_blank_line_reports_file_line() {
        let store = MemoryStore::default();
        let mut handle = store.clone();
        let csv = "name,age\nChen,80\n\nWang,old\n";

        let error = import_csv(csv.as_bytes(), &mut handle).expect_err("import should fail");

        assert!(
            matches!(&error, ReviewError::DataSource { message } if message.contains("CSV row 4")),
            "unexpected error: {error:?}"
        );
    }
}
