//! Column layout shared by the backing store, imports, and exports.

use std::collections::HashMap;

/// One column of the roster table, in store order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    /// Resident name.
    Name,
    /// Resident age.
    Age,
    /// Chronic conditions.
    Conditions,
    /// Comma-joined medications.
    Medications,
    /// AI risk summary.
    AiRisk,
    /// AI interaction summary.
    AiInteractions,
    /// Reviewing pharmacist.
    Reviewer,
    /// Reviewer risk level.
    ReviewerRiskLevel,
    /// Reviewer correction note.
    CorrectionNote,
    /// Review timestamp.
    ReviewedAt,
}

impl Column {
    /// Every column in the order rows are appended to the store.
    pub const ALL: [Self; 10] = [
        Self::Name,
        Self::Age,
        Self::Conditions,
        Self::Medications,
        Self::AiRisk,
        Self::AiInteractions,
        Self::Reviewer,
        Self::ReviewerRiskLevel,
        Self::CorrectionNote,
        Self::ReviewedAt,
    ];

    /// Canonical header written by exports and new sheets.
    #[must_use]
    pub const fn header(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Age => "age",
            Self::Conditions => "conditions",
            Self::Medications => "medications",
            Self::AiRisk => "aiRisk",
            Self::AiInteractions => "aiInteractions",
            Self::Reviewer => "reviewer",
            Self::ReviewerRiskLevel => "reviewerRiskLevel",
            Self::CorrectionNote => "correctionNote",
            Self::ReviewedAt => "reviewedAt",
        }
    }

    /// Header used by the care-home sheets that predate the canonical names.
    #[must_use]
    pub const fn legacy_header(self) -> &'static str {
        match self {
            Self::Name => "姓名",
            Self::Age => "年齡",
            Self::Conditions => "疾病",
            Self::Medications => "用藥",
            Self::AiRisk => "用藥風險",
            Self::AiInteractions => "交互作用",
            Self::Reviewer => "審核藥師",
            Self::ReviewerRiskLevel => "風險等級",
            Self::CorrectionNote => "修正建議",
            Self::ReviewedAt => "審核時間",
        }
    }

    /// Resolves a header cell to a column, accepting canonical and legacy
    /// names.
    #[must_use]
    pub fn from_header(header: &str) -> Option<Self> {
        let trimmed = header.trim();
        Self::ALL
            .into_iter()
            .find(|column| column.header() == trimmed || column.legacy_header() == trimmed)
    }
}

/// Canonical header row in store order.
#[must_use]
pub fn canonical_headers() -> [&'static str; 10] {
    Column::ALL.map(Column::header)
}

/// A row read from the store: header cell mapped to value cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetRow {
    cells: HashMap<Column, String>,
    source_row: Option<usize>,
}

impl SheetRow {
    /// Builds a row from header/value pairs, ignoring unknown headers.
    ///
    /// When a header appears twice the later cell wins.
    #[must_use]
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let cells = pairs
            .into_iter()
            .filter_map(|(header, value)| {
                Column::from_header(header).map(|column| (column, value.to_owned()))
            })
            .collect();
        Self {
            cells,
            source_row: None,
        }
    }

    /// Tags the row with its 1-based position in the source sheet or file.
    #[must_use]
    pub const fn with_source_row(mut self, row_number: usize) -> Self {
        self.source_row = Some(row_number);
        self
    }

    /// 1-based position in the source sheet or file, header row included.
    #[must_use]
    pub const fn source_row(&self) -> Option<usize> {
        self.source_row
    }

    /// Returns the raw value of a column, if present.
    #[must_use]
    pub fn get(&self, column: Column) -> Option<&str> {
        self.cells.get(&column).map(String::as_str)
    }

    /// Returns the column value, or an empty string when absent.
    #[must_use]
    pub fn text(&self, column: Column) -> String {
        self.get(column).unwrap_or_default().trim().to_owned()
    }

    /// Sets a column value.
    pub fn set(&mut self, column: Column, value: impl Into<String>) {
        self.cells.insert(column, value.into());
    }
}

/// A row appended to the store: exactly one value per [`Column::ALL`] entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreRow([String; 10]);

impl StoreRow {
    /// Wraps ordered column values.
    #[must_use]
    pub const fn new(values: [String; 10]) -> Self {
        Self(values)
    }

    /// Ordered column values.
    #[must_use]
    pub const fn values(&self) -> &[String; 10] {
        &self.0
    }

    /// Returns the value for one column.
    #[must_use]
    pub fn value(&self, column: Column) -> &str {
        Column::ALL
            .iter()
            .zip(self.0.iter())
            .find_map(|(candidate, value)| (*candidate == column).then_some(value.as_str()))
            .unwrap_or_default()
    }

    /// Converts the row back into a header-keyed [`SheetRow`].
    #[must_use]
    pub fn to_sheet_row(&self) -> SheetRow {
        SheetRow::from_pairs(
            Column::ALL
                .iter()
                .zip(self.0.iter())
                .map(|(column, value)| (column.header(), value.as_str())),
        )
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{Column, SheetRow, StoreRow, canonical_headers};

    #[rstest]
    #[case("name", Some(Column::Name))]
    #[case(" 姓名 ", Some(Column::Name))]
    #[case("用藥風險", Some(Column::AiRisk))]
    #[case("reviewedAt", Some(Column::ReviewedAt))]
    #[case("是否同意AI判定", None)]
    fn resolves_headers(#[case] header: &str, #[case] expected: Option<Column>) {
        assert_eq!(Column::from_header(header), expected);
    }

    #[test]
    fn canonical_headers_follow_store_order() {
        assert_eq!(
            canonical_headers(),
            [
                "name",
                "age",
                "conditions",
                "medications",
                "aiRisk",
                "aiInteractions",
                "reviewer",
                "reviewerRiskLevel",
                "correctionNote",
                "reviewedAt",
            ]
        );
    }

    #[test]
    fn sheet_row_ignores_unknown_headers() {
        let row = SheetRow::from_pairs([("姓名", "Chen"), ("備註", "ignored")]);

        assert_eq!(row.get(Column::Name), Some("Chen"));
        assert_eq!(row.text(Column::Conditions), "");
    }

    #[test]
    fn store_row_round_trips_to_sheet_row() {
        let row = StoreRow::new(std::array::from_fn(|index| format!("v{index}")));
        let sheet_row = row.to_sheet_row();

        assert_eq!(sheet_row.get(Column::Name), Some("v0"));
        assert_eq!(sheet_row.get(Column::ReviewedAt), Some("v9"));
        assert_eq!(row.value(Column::Medications), "v3");
    }
}
