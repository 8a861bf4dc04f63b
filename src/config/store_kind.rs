//! Backing store selection.

use std::fmt;
use std::str::FromStr;

use crate::error::ReviewError;

/// Which backing store a session uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreKind {
    /// A Google spreadsheet found by name.
    #[default]
    Sheets,
    /// A local `SQLite` database.
    Sqlite,
}

impl FromStr for StoreKind {
    type Err = ReviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sheets" | "google-sheets" | "gsheets" => Ok(Self::Sheets),
            "sqlite" | "local" => Ok(Self::Sqlite),
            _ => Err(ReviewError::configuration(format!(
                "unsupported store '{s}': valid options are 'sheets' or 'sqlite'"
            ))),
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sheets => write!(f, "sheets"),
            Self::Sqlite => write!(f, "sqlite"),
        }
    }
}
