//! Parsing and joining of the comma-separated medications cell.

/// Separators accepted between medication names.
///
/// Sheets maintained by hand mix ASCII commas with the full-width and
/// enumeration commas of Chinese input methods.
const SEPARATORS: [char; 3] = [',', '，', '、'];

/// Separator used when a medication list is written back to a single cell.
pub const JOIN_SEPARATOR: &str = ", ";

/// Splits a raw medications cell into an ordered list of names.
///
/// Items are trimmed and empty items are dropped, so a missing or blank cell
/// yields an empty list.
///
/// # Example
///
/// ```
/// use smartmeds::roster::parse_medications;
///
/// assert_eq!(
///     parse_medications(Some("Aspirin, Warfarin，Metformin")),
///     vec!["Aspirin", "Warfarin", "Metformin"]
/// );
/// assert!(parse_medications(None).is_empty());
/// ```
#[must_use]
pub fn parse_medications(raw: Option<&str>) -> Vec<String> {
    let Some(text) = raw else {
        return Vec::new();
    };

    text.split(SEPARATORS)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

/// Joins medication names back into a single cell value.
#[must_use]
pub fn join_medications(medications: &[String]) -> String {
    medications.join(JOIN_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{join_medications, parse_medications};

    #[rstest]
    #[case::ascii("A,B", vec!["A", "B"])]
    #[case::spaces(" A ,  B ,C ", vec!["A", "B", "C"])]
    #[case::full_width("阿斯匹靈，華法林", vec!["阿斯匹靈", "華法林"])]
    #[case::enumeration_comma("A、B", vec!["A", "B"])]
    #[case::empty_items("A,,B,", vec!["A", "B"])]
    #[case::blank("   ", vec![])]
    #[case::single("Metformin", vec!["Metformin"])]
    fn parses_raw_cells(#[case] raw: &str, #[case] expected: Vec<&str>) {
        assert_eq!(parse_medications(Some(raw)), expected);
    }

    #[test]
    fn missing_cell_yields_empty_list() {
        assert!(parse_medications(None).is_empty());
    }

    #[rstest]
    #[case("A,B")]
    #[case(" A ,, B ，C、 ")]
    #[case("")]
    #[case(",,,")]
    #[case("Warfarin")]
    fn parsing_is_idempotent_through_join(#[case] raw: &str) {
        let parsed = parse_medications(Some(raw));
        let reparsed = parse_medications(Some(&join_medications(&parsed)));

        assert_eq!(reparsed, parsed, "parse(join(parse(s))) should equal parse(s)");
    }

    #[test]
    fn join_uses_comma_separator() {
        let medications = vec!["A".to_owned(), "B".to_owned()];

        assert_eq!(join_medications(&medications), "A, B");
    }
}
