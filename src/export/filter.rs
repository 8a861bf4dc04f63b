//! Report view filters.

use crate::roster::parse_medications;

use super::model::ReportRow;

/// Restricts which rows appear in the report view.
///
/// Filters only remove rows, so applying a filter to its own output returns
/// the same rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportFilter {
    /// Keep only residents whose AI interaction summary is non-empty.
    pub interactions_only: bool,
    /// Keep only residents taking a medication whose name contains this text
    /// (case-insensitive).
    pub medication_query: Option<String>,
}

impl ReportFilter {
    /// Filter that keeps every row.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Filter that keeps residents with reported interactions.
    #[must_use]
    pub fn interactions_only() -> Self {
        Self {
            interactions_only: true,
            ..Self::default()
        }
    }

    /// Adds a medication search term; blank terms are ignored.
    #[must_use]
    pub fn with_medication_query(mut self, query: impl Into<String>) -> Self {
        let term = query.into();
        self.medication_query = (!term.trim().is_empty()).then_some(term);
        self
    }

    /// Returns true when the row belongs in the filtered view.
    #[must_use]
    pub fn matches(&self, row: &ReportRow) -> bool {
        if self.interactions_only && row.ai_interactions.trim().is_empty() {
            return false;
        }

        let Some(query) = self.medication_query.as_deref() else {
            return true;
        };
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        parse_medications(Some(&row.medications))
            .iter()
            .any(|medication| medication.to_lowercase().contains(&needle))
    }

    /// Returns the matching rows in their original order.
    #[must_use]
    pub fn apply(&self, rows: Vec<ReportRow>) -> Vec<ReportRow> {
        rows.into_iter().filter(|row| self.matches(row)).collect()
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::ReportFilter;
    use crate::export::ReportRow;
    use crate::roster::ResidentRecord;

    fn row(name: &str, medications: &[&str], interactions: &str) -> ReportRow {
        let mut record = ResidentRecord::new(
            name,
            80,
            "",
            medications.iter().map(|item| (*item).to_owned()).collect(),
        );
        record.ai_interactions = interactions.to_owned();
        ReportRow::from(&record)
    }

    #[fixture]
    fn rows() -> Vec<ReportRow> {
        vec![
            row("Chen", &["Aspirin", "Warfarin"], "出血風險增加"),
            row("Wang", &["Metformin"], ""),
            row("Lin", &["Warfarin", "Digoxin"], "   "),
        ]
    }

    fn names(rows: &[ReportRow]) -> Vec<&str> {
        rows.iter().map(|row| row.name.as_str()).collect()
    }

    #[rstest]
    fn default_filter_keeps_everything(rows: Vec<ReportRow>) {
        let filtered = ReportFilter::all().apply(rows.clone());

        assert_eq!(filtered, rows);
    }

    #[rstest]
    fn interactions_only_drops_blank_summaries(rows: Vec<ReportRow>) {
        let filtered = ReportFilter::interactions_only().apply(rows);

        assert_eq!(names(&filtered), vec!["Chen"]);
        assert!(
            filtered
                .iter()
                .all(|row| !row.ai_interactions.trim().is_empty())
        );
    }

    #[rstest]
    #[case::interactions(ReportFilter::interactions_only())]
    #[case::query(ReportFilter::all().with_medication_query("warf"))]
    #[case::both(ReportFilter::interactions_only().with_medication_query("digoxin"))]
    fn filters_are_idempotent(rows: Vec<ReportRow>, #[case] filter: ReportFilter) {
        let once = filter.apply(rows);
        let twice = filter.apply(once.clone());

        assert_eq!(twice, once);
    }

    #[rstest]
    #[case("WARFARIN", vec!["Chen", "Lin"])]
    #[case("met", vec!["Wang"])]
    #[case("ibuprofen", vec![])]
    #[case("  ", vec!["Chen", "Wang", "Lin"])]
    fn medication_query_matches_case_insensitively(
        rows: Vec<ReportRow>,
        #[case] query: &str,
        #[case] expected: Vec<&str>,
    ) {
        let filtered = ReportFilter::all().with_medication_query(query).apply(rows);

        assert_eq!(names(&filtered), expected);
    }
}
