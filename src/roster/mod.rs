//! Resident roster model.
//!
//! A roster is loaded fresh from the backing store at the start of each
//! session. Records are keyed by resident name; every update and append goes
//! through that key so no other record is touched.

mod collection;
mod columns;
mod medications;
mod model;

pub use collection::{Roster, format_timestamp, parse_record, to_store_row};
pub use columns::{Column, SheetRow, StoreRow, canonical_headers};
pub use medications::{JOIN_SEPARATOR, join_medications, parse_medications};
pub use model::{ResidentRecord, ReviewStatus, RiskLevel, RiskLevelParseError};
