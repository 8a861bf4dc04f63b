//! `SmartMeds` CLI entrypoint for care-home medication reviews.

use std::io::{self, Write};
use std::process::ExitCode;

use ortho_config::OrthoConfig;
use smartmeds::{OperationMode, ReviewError, SmartMedsConfig};
use tracing_subscriber::EnvFilter;

mod cli;

fn main() -> ExitCode {
    init_tracing();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            if writeln!(io::stderr().lock(), "{error}").is_err() {
                return ExitCode::FAILURE;
            }
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), ReviewError> {
    let config = load_config()?;
    config.validate()?;

    match config.operation_mode() {
        OperationMode::MigrateDatabase => cli::migrations::run(&config),
        OperationMode::Import => cli::import::run(&config),
        OperationMode::Review => cli::review::run(&config),
        OperationMode::Export => cli::export::run(&config),
        OperationMode::Annotate => cli::annotate::run(&config),
        OperationMode::Summary => cli::summary::run(&config),
    }
}

/// Loads configuration from CLI, environment, and files.
///
/// # Errors
///
/// Returns [`ReviewError::Configuration`] when ortho-config fails to parse
/// arguments or load configuration files.
fn load_config() -> Result<SmartMedsConfig, ReviewError> {
    SmartMedsConfig::load().map_err(|error| ReviewError::Configuration {
        message: error.to_string(),
    })
}

/// Logs go to stderr so stdout carries only report output. `RUST_LOG`
/// overrides the default `warn` level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ignored = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}
