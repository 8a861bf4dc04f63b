//! Application configuration loaded from CLI, environment, and files.
//!
//! This module provides a unified configuration struct that merges values
//! from command-line arguments, environment variables, and configuration
//! files using ortho-config's layered approach. Configuration is loaded once
//! in `main` and passed to every collaborator explicitly.
//!
//! # Precedence
//!
//! Configuration values are loaded with the following precedence (lowest to
//! highest):
//!
//! 1. **Defaults** – Built-in application defaults
//! 2. **Configuration file** – `.smartmeds.toml` in current directory, home
//!    directory, or XDG config directory
//! 3. **Environment variables** – `SMARTMEDS_SHEET_NAME`,
//!    `SMARTMEDS_AI_API_KEY`, or legacy `OPENAI_API_KEY`
//! 4. **Command-line arguments** – `--sheet-name`/`-n`, `--credentials`/`-c`
//!
//! # Configuration File
//!
//! Place `.smartmeds.toml` in the current directory, home directory, or
//! XDG config directory with:
//!
//! ```toml
//! store = "sheets"
//! credentials = "service_account.json"
//! sheet_name = "SmartMeds-AI"
//! ai_model = "gpt-4o-mini"
//! require_correction_note = true
//! ```

mod store_kind;

use std::env;
use std::time::Duration;

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use store_kind::StoreKind;

use crate::advisor::{DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS, OpenAiAdvisorConfig};
use crate::error::ReviewError;
use crate::export::{ExportFormat, ReportFilter};
use crate::store::{
    DEFAULT_DRIVE_BASE_URL, DEFAULT_SHEETS_BASE_URL, GoogleSheetsConfig, ServiceAccountKey,
};
use crate::workflow::CorrectionNotePolicy;

/// Legacy environment variable consulted when no advisor key is configured.
pub const LEGACY_AI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Operation mode determined by CLI arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationMode {
    /// Apply database migrations and exit.
    MigrateDatabase,
    /// Seed the store from a CSV roster.
    Import,
    /// Submit one pharmacist review.
    Review,
    /// Export the report view.
    Export,
    /// Annotate the roster and print the advisor results.
    Annotate,
    /// Print the roster overview.
    Summary,
}

impl OperationMode {
    /// Whether the mode runs a review session that holds the advisors.
    ///
    /// Only the maintenance modes (migrations and CSV import) run without an
    /// advisor API key.
    #[must_use]
    pub const fn uses_advisors(self) -> bool {
        !matches!(self, Self::MigrateDatabase | Self::Import)
    }
}

/// Application configuration supporting CLI, environment, and file sources.
///
/// # Environment Variables
///
/// - `SMARTMEDS_STORE` or `--store`: `sheets` (default) or `sqlite`
/// - `SMARTMEDS_CREDENTIALS` or `--credentials`: service-account JSON path
/// - `SMARTMEDS_SHEET_NAME` or `--sheet-name`: spreadsheet name
/// - `SMARTMEDS_DATABASE_URL` or `--database-url`: local `SQLite` database
/// - `SMARTMEDS_AI_API_KEY`, `OPENAI_API_KEY`, or `--ai-api-key`: advisor key
///
/// # Example
///
/// ```no_run
/// use ortho_config::OrthoConfig;
/// use smartmeds::SmartMedsConfig;
///
/// let config = SmartMedsConfig::load().expect("failed to load configuration");
/// config.validate().expect("configuration should be complete");
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, OrthoConfig)]
#[serde(default)]
#[ortho_config(
    prefix = "SMARTMEDS",
    discovery(
        dotfile_name = ".smartmeds.toml",
        config_file_name = "smartmeds.toml",
        app_name = "smartmeds"
    )
)]
pub struct SmartMedsConfig {
    /// Backing store: `sheets` or `sqlite`.
    ///
    /// Can be provided via:
    /// - CLI: `--store <KIND>`
    /// - Environment: `SMARTMEDS_STORE`
    /// - Config file: `store = "sqlite"`
    #[ortho_config()]
    pub store: Option<String>,

    /// Path to the Google service-account key (JSON).
    ///
    /// Can be provided via:
    /// - CLI: `--credentials <PATH>` or `-c <PATH>`
    /// - Environment: `SMARTMEDS_CREDENTIALS`
    /// - Config file: `credentials = "..."`
    #[ortho_config(cli_short = 'c')]
    pub credentials: Option<String>,

    /// Name of the Google spreadsheet holding the roster.
    ///
    /// Can be provided via:
    /// - CLI: `--sheet-name <NAME>` or `-n <NAME>`
    /// - Environment: `SMARTMEDS_SHEET_NAME`
    /// - Config file: `sheet_name = "..."`
    #[ortho_config(cli_short = 'n')]
    pub sheet_name: Option<String>,

    /// Local `SQLite` database URL/path used by the `sqlite` store and by
    /// `--migrate-db`.
    #[ortho_config()]
    pub database_url: Option<String>,

    /// Runs the annotate phase.
    ///
    /// On its own this annotates the whole roster and prints the results.
    /// Combined with `--resident` it annotates that resident before the review
    /// is recorded.
    ///
    /// Note: booleans are not read from the environment by `ortho_config`.
    #[ortho_config(cli_short = 'a')]
    pub annotate: bool,

    /// Resident to review.
    #[ortho_config(cli_short = 'r')]
    pub resident: Option<String>,

    /// Reviewing pharmacist.
    ///
    /// Can be provided via:
    /// - CLI: `--reviewer <NAME>`
    /// - Environment: `SMARTMEDS_REVIEWER`
    /// - Config file: `reviewer = "..."`
    #[ortho_config()]
    pub reviewer: Option<String>,

    /// Risk level chosen by the reviewer (`high`, `medium`, `low`, or
    /// `高`/`中`/`低`).
    #[ortho_config(cli_short = 'l')]
    pub risk_level: Option<String>,

    /// Correction to the AI judgment.
    #[ortho_config()]
    pub correction_note: Option<String>,

    /// Marks the review as disagreeing with the AI risk.
    ///
    /// When unset, disagreement is inferred from the AI risk text.
    #[ortho_config()]
    pub disagree: bool,

    /// Requires a correction note whenever the review disagrees with the AI.
    #[ortho_config(cli_short = 'N')]
    pub require_correction_note: bool,

    /// Export format: `csv` or `jsonl`.
    #[ortho_config(cli_short = 'e')]
    pub export: Option<String>,

    /// Output file for exports; stdout when unset.
    #[ortho_config(cli_short = 'o')]
    pub output: Option<String>,

    /// Restricts exports to residents with reported interactions.
    #[ortho_config(cli_short = 'i')]
    pub interactions_only: bool,

    /// Restricts exports to residents taking a matching medication.
    #[ortho_config(cli_short = 'm')]
    pub medication_query: Option<String>,

    /// CSV roster to append to the store.
    #[ortho_config()]
    pub import: Option<String>,

    /// Runs database migrations and exits.
    ///
    /// When set, the database at `database_url` is initialised, pending
    /// Diesel migrations are applied, and the schema version is recorded in
    /// telemetry.
    #[ortho_config()]
    pub migrate_db: bool,

    /// Writes telemetry events to stderr as JSON lines.
    #[ortho_config()]
    pub telemetry: bool,

    /// API key for the language-model advisors.
    ///
    /// Can be provided via:
    /// - CLI: `--ai-api-key <KEY>`
    /// - Environment: `SMARTMEDS_AI_API_KEY` or `OPENAI_API_KEY` (legacy)
    /// - Config file: `ai_api_key = "..."`
    #[ortho_config()]
    pub ai_api_key: Option<String>,

    /// Base URL of the OpenAI-compatible API.
    #[ortho_config()]
    pub ai_base_url: Option<String>,

    /// Model used for both advisors.
    #[ortho_config()]
    pub ai_model: Option<String>,

    /// Timeout for each advisor request, in seconds.
    ///
    /// Defaults to 30 seconds.
    #[ortho_config()]
    pub ai_timeout_seconds: u64,

    /// Sheets API base URL override.
    #[ortho_config()]
    pub sheets_base_url: Option<String>,

    /// Drive API base URL override.
    #[ortho_config()]
    pub drive_base_url: Option<String>,
}

impl Default for SmartMedsConfig {
    fn default() -> Self {
        Self {
            store: None,
            credentials: None,
            sheet_name: None,
            database_url: None,
            ai_api_key: None,
            ai_base_url: None,
            ai_model: None,
            ai_timeout_seconds: DEFAULT_TIMEOUT_SECS,
            sheets_base_url: None,
            drive_base_url: None,
            annotate: false,
            resident: None,
            reviewer: None,
            risk_level: None,
            correction_note: None,
            disagree: false,
            require_correction_note: false,
            export: None,
            output: None,
            interactions_only: false,
            medication_query: None,
            import: None,
            migrate_db: false,
            telemetry: false,
        }
    }
}

impl SmartMedsConfig {
    /// Determines the operation mode based on provided configuration.
    ///
    /// Checked in order: migrations, import, review (a resident is named),
    /// export, annotate, and finally the roster summary.
    #[must_use]
    pub const fn operation_mode(&self) -> OperationMode {
        if self.migrate_db {
            OperationMode::MigrateDatabase
        } else if self.import.is_some() {
            OperationMode::Import
        } else if self.resident.is_some() {
            OperationMode::Review
        } else if self.export.is_some() {
            OperationMode::Export
        } else if self.annotate {
            OperationMode::Annotate
        } else {
            OperationMode::Summary
        }
    }

    /// Returns the configured store kind.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::Configuration`] for an unknown kind.
    pub fn store_kind(&self) -> Result<StoreKind, ReviewError> {
        self.store
            .as_deref()
            .map_or_else(|| Ok(StoreKind::default()), str::parse)
    }

    /// Checks that every setting the selected mode needs is present.
    ///
    /// Runs before any store or advisor is contacted.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::Configuration`] naming the first missing or
    /// invalid setting.
    pub fn validate(&self) -> Result<(), ReviewError> {
        let mode = self.operation_mode();
        if mode == OperationMode::MigrateDatabase {
            self.require_database_url()?;
            return Ok(());
        }

        match self.store_kind()? {
            StoreKind::Sheets => {
                self.require_credentials()?;
                self.require_sheet_name()?;
            }
            StoreKind::Sqlite => {
                self.require_database_url()?;
            }
        }

        if mode.uses_advisors() {
            self.resolve_ai_api_key()?;
            if self.ai_timeout_seconds == 0 {
                return Err(ReviewError::configuration(
                    "AI timeout must be at least one second (use --ai-timeout-seconds)",
                ));
            }
        }
        if mode == OperationMode::Export {
            self.export_format()?;
        }
        Ok(())
    }

    /// Returns the service-account key path.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::Configuration`] when no path is configured.
    pub fn require_credentials(&self) -> Result<Utf8PathBuf, ReviewError> {
        non_blank(self.credentials.as_deref())
            .map(Utf8PathBuf::from)
            .ok_or_else(|| {
                ReviewError::configuration(
                    "store credentials are required (use --credentials or SMARTMEDS_CREDENTIALS)",
                )
            })
    }

    /// Returns the spreadsheet name.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::Configuration`] when no name is configured.
    pub fn require_sheet_name(&self) -> Result<&str, ReviewError> {
        non_blank(self.sheet_name.as_deref()).ok_or_else(|| {
            ReviewError::configuration(
                "spreadsheet name is required (use --sheet-name or SMARTMEDS_SHEET_NAME)",
            )
        })
    }

    /// Returns the `SQLite` database URL.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::Configuration`] when no URL is configured.
    pub fn require_database_url(&self) -> Result<&str, ReviewError> {
        non_blank(self.database_url.as_deref()).ok_or_else(|| {
            ReviewError::configuration(
                "database URL is required (use --database-url or SMARTMEDS_DATABASE_URL)",
            )
        })
    }

    /// Resolves the advisor API key from configuration or the legacy
    /// `OPENAI_API_KEY` environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::Configuration`] when no source provides a
    /// non-blank key.
    pub fn resolve_ai_api_key(&self) -> Result<String, ReviewError> {
        non_blank(self.ai_api_key.as_deref())
            .map(ToOwned::to_owned)
            .or_else(|| {
                env::var(LEGACY_AI_API_KEY_ENV)
                    .ok()
                    .filter(|key| !key.trim().is_empty())
            })
            .ok_or_else(|| {
                ReviewError::configuration(
                    "AI API key is required (use --ai-api-key, SMARTMEDS_AI_API_KEY, or \
                     OPENAI_API_KEY)",
                )
            })
    }

    /// Builds the advisor configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::Configuration`] when no API key is available.
    pub fn advisor_config(&self) -> Result<OpenAiAdvisorConfig, ReviewError> {
        Ok(OpenAiAdvisorConfig::new(
            non_blank(self.ai_base_url.as_deref()).unwrap_or(DEFAULT_BASE_URL),
            non_blank(self.ai_model.as_deref()).unwrap_or(DEFAULT_MODEL),
            Some(self.resolve_ai_api_key()?),
            Duration::from_secs(self.ai_timeout_seconds),
        ))
    }

    /// Reads the service-account key and builds the Google Sheets settings.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::Configuration`] when the credentials or sheet
    /// name are missing or the key file cannot be read.
    pub fn sheets_config(&self) -> Result<GoogleSheetsConfig, ReviewError> {
        let key = ServiceAccountKey::from_path(&self.require_credentials()?)?;
        Ok(
            GoogleSheetsConfig::new(key, self.require_sheet_name()?).with_base_urls(
                non_blank(self.sheets_base_url.as_deref()).unwrap_or(DEFAULT_SHEETS_BASE_URL),
                non_blank(self.drive_base_url.as_deref()).unwrap_or(DEFAULT_DRIVE_BASE_URL),
            ),
        )
    }

    /// Correction-note policy selected by `require_correction_note`.
    #[must_use]
    pub const fn correction_policy(&self) -> CorrectionNotePolicy {
        CorrectionNotePolicy::from_required(self.require_correction_note)
    }

    /// Parses the export format.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::Configuration`] when the format is missing or
    /// unsupported.
    pub fn export_format(&self) -> Result<ExportFormat, ReviewError> {
        self.export
            .as_deref()
            .ok_or_else(|| {
                ReviewError::configuration(
                    "export format is required (use --export csv or --export jsonl)",
                )
            })?
            .parse()
    }

    /// Report filter built from `interactions_only` and `medication_query`.
    #[must_use]
    pub fn report_filter(&self) -> ReportFilter {
        ReportFilter {
            interactions_only: self.interactions_only,
            ..ReportFilter::default()
        }
        .with_medication_query(self.medication_query.clone().unwrap_or_default())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.trim().is_empty())
}

#[cfg(test)]
mod tests;
