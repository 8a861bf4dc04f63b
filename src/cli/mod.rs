//! CLI operation mode handlers.
//!
//! This module contains the implementations for the different operation
//! modes:
//! - [`annotate`]: Annotate the whole roster and print the advisor results
//! - [`export`]: Write the report view as CSV or JSONL
//! - [`import`]: Append a CSV roster to the store
//! - [`migrations`]: Database schema migrations
//! - [`review`]: Record one pharmacist review
//! - [`summary`]: Print the roster overview
//!
//! Session wiring is in [`session`] and output formatting in [`output`].

pub mod annotate;
pub mod export;
pub mod import;
pub mod migrations;
pub mod output;
pub mod review;
pub mod session;
pub mod summary;

#[cfg(test)]
pub mod test_utils;
