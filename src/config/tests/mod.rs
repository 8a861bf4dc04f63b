//! Unit tests for configuration loading and precedence.
//!
//! Tests are organised into modules by functional area:
//! - `helpers`: Shared test utilities
//! - `cli_flags`: Short and long command-line flag loading
//! - `precedence`: Layer precedence tests
//! - `operation_mode`: Operation mode determination tests
//! - `field_resolution`: API key, store, and filter resolution tests
//! - `validation`: Start-up validation tests

mod helpers;
