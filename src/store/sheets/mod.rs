//! Google Sheets store.
//!
//! The spreadsheet is found by name through the Drive API and its first
//! worksheet is used as the roster table. The service-account token is
//! obtained once when the store is opened and refreshed only when it is about
//! to expire.

mod auth;

use chrono::Utc;
use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ReviewError;
use crate::roster::{Column, SheetRow, StoreRow};

use super::SpreadsheetStore;
use auth::{AccessToken, fetch_access_token};

pub use auth::ServiceAccountKey;

/// Default Sheets API base URL.
pub const DEFAULT_SHEETS_BASE_URL: &str = "https://sheets.googleapis.com/v4";
/// Default Drive API base URL.
pub const DEFAULT_DRIVE_BASE_URL: &str = "https://www.googleapis.com/drive/v3";

const SPREADSHEET_MIME_TYPE: &str = "application/vnd.google-apps.spreadsheet";

/// Settings needed to open a [`GoogleSheetsStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleSheetsConfig {
    /// Service-account key.
    pub credentials: ServiceAccountKey,
    /// Spreadsheet name, as shown in Google Drive.
    pub sheet_name: String,
    /// Sheets API base URL.
    pub sheets_base_url: String,
    /// Drive API base URL.
    pub drive_base_url: String,
    /// Timeout for each HTTP call.
    pub timeout: std::time::Duration,
}

impl GoogleSheetsConfig {
    /// Creates a configuration using the public Google endpoints.
    #[must_use]
    pub fn new(credentials: ServiceAccountKey, sheet_name: impl Into<String>) -> Self {
        Self {
            credentials,
            sheet_name: sheet_name.into(),
            sheets_base_url: DEFAULT_SHEETS_BASE_URL.to_owned(),
            drive_base_url: DEFAULT_DRIVE_BASE_URL.to_owned(),
            timeout: auth::DEFAULT_TIMEOUT,
        }
    }

    /// Overrides the API base URLs.
    #[must_use]
    pub fn with_base_urls(
        mut self,
        sheets_base_url: impl Into<String>,
        drive_base_url: impl Into<String>,
    ) -> Self {
        self.sheets_base_url = sheets_base_url.into();
        self.drive_base_url = drive_base_url.into();
        self
    }
}

/// Open handle to one worksheet.
#[derive(Debug)]
pub struct GoogleSheetsStore {
    config: GoogleSheetsConfig,
    client: Client,
    token: AccessToken,
    spreadsheet_id: String,
    worksheet_title: String,
}

#[derive(Debug, Deserialize)]
struct DriveFileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMetadata {
    #[serde(default)]
    sheets: Vec<Worksheet>,
}

#[derive(Debug, Deserialize)]
struct Worksheet {
    properties: WorksheetProperties,
}

#[derive(Debug, Deserialize)]
struct WorksheetProperties {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct AppendBody<'a> {
    values: [&'a [String; 10]; 1],
}

impl GoogleSheetsStore {
    /// Authenticates, finds the spreadsheet by name, and resolves its first
    /// worksheet.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::Configuration`] for unusable credentials or base
    /// URLs, and [`ReviewError::DataSource`] when Google cannot be reached or
    /// the spreadsheet is not visible to the service account.
    pub fn open(config: GoogleSheetsConfig) -> Result<Self, ReviewError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|error| {
                ReviewError::configuration(format!(
                    "failed to configure Google Sheets HTTP client: {error}"
                ))
            })?;
        let token = fetch_access_token(&client, &config.credentials, Utc::now())?;

        let spreadsheet_id = find_spreadsheet_id(&client, &config, &token)?;
        let worksheet_title = first_worksheet_title(&client, &config, &token, &spreadsheet_id)?;
        tracing::info!(
            spreadsheet = config.sheet_name.as_str(),
            worksheet = worksheet_title.as_str(),
            "opened Google Sheets store"
        );

        Ok(Self {
            config,
            client,
            token,
            spreadsheet_id,
            worksheet_title,
        })
    }

    /// Resolved spreadsheet identifier.
    #[must_use]
    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    /// Title of the worksheet used as the roster table.
    #[must_use]
    pub fn worksheet_title(&self) -> &str {
        &self.worksheet_title
    }

    fn authorised(&mut self, builder: RequestBuilder) -> Result<RequestBuilder, ReviewError> {
        let now = Utc::now();
        if self.token.is_stale(now) {
            self.token = fetch_access_token(&self.client, &self.config.credentials, now)?;
        }
        Ok(builder.bearer_auth(self.token.secret()))
    }

    fn values_url(&self, suffix: &str) -> Result<Url, ReviewError> {
        let range = quote_sheet_title(&self.worksheet_title);
        api_url(
            &self.config.sheets_base_url,
            &[
                "spreadsheets",
                self.spreadsheet_id.as_str(),
                "values",
                format!("{range}{suffix}").as_str(),
            ],
        )
    }
}

impl SpreadsheetStore for GoogleSheetsStore {
    fn read_all(&mut self) -> Result<Vec<SheetRow>, ReviewError> {
        let url = self.values_url("")?;
        let request = self.authorised(self.client.get(url))?;
        let response = send(request, "read the roster")?;
        let payload: ValueRange = decode(response, "read the roster")?;
        rows_from_values(&payload.values)
    }

    fn append(&mut self, row: &StoreRow) -> Result<(), ReviewError> {
        let url = self.values_url(":append")?;
        let body = AppendBody {
            values: [row.values()],
        };
        let builder = self
            .client
            .post(url)
            .query(&[
                ("valueInputOption", "RAW"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&body);
        let request = self.authorised(builder)?;
        send(request, "append the review row").map(drop)
    }

    fn describe(&self) -> String {
        format!(
            "Google spreadsheet '{}' (worksheet '{}')",
            self.config.sheet_name, self.worksheet_title
        )
    }
}

fn find_spreadsheet_id(
    client: &Client,
    config: &GoogleSheetsConfig,
    token: &AccessToken,
) -> Result<String, ReviewError> {
    let url = api_url(&config.drive_base_url, &["files"])?;
    let query = format!(
        "name = '{}' and mimeType = '{SPREADSHEET_MIME_TYPE}' and trashed = false",
        escape_query_literal(&config.sheet_name)
    );
    let request = client
        .get(url)
        .query(&[("q", query.as_str()), ("fields", "files(id,name)")])
        .bearer_auth(token.secret());
    let response = send(request, "find the spreadsheet")?;
    let listing: DriveFileList = decode(response, "find the spreadsheet")?;

    listing
        .files
        .into_iter()
        .next()
        .map(|file| file.id)
        .ok_or_else(|| {
            ReviewError::data_source(format!(
                "spreadsheet '{}' was not found; check the name and share it with {}",
                config.sheet_name, config.credentials.client_email
            ))
        })
}

fn first_worksheet_title(
    client: &Client,
    config: &GoogleSheetsConfig,
    token: &AccessToken,
    spreadsheet_id: &str,
) -> Result<String, ReviewError> {
    let url = api_url(&config.sheets_base_url, &["spreadsheets", spreadsheet_id])?;
    let request = client
        .get(url)
        .query(&[("fields", "sheets.properties.title")])
        .bearer_auth(token.secret());
    let response = send(request, "read the spreadsheet layout")?;
    let metadata: SpreadsheetMetadata = decode(response, "read the spreadsheet layout")?;

    metadata
        .sheets
        .into_iter()
        .next()
        .map(|sheet| sheet.properties.title)
        .ok_or_else(|| {
            ReviewError::data_source(format!(
                "spreadsheet '{}' has no worksheets",
                config.sheet_name
            ))
        })
}

fn api_url(base: &str, segments: &[&str]) -> Result<Url, ReviewError> {
    let mut url = Url::parse(base).map_err(|error| {
        ReviewError::configuration(format!("invalid Google API base URL '{base}': {error}"))
    })?;
    url.path_segments_mut()
        .map_err(|()| {
            ReviewError::configuration(format!("Google API base URL '{base}' cannot take a path"))
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn send(request: RequestBuilder, operation: &str) -> Result<Response, ReviewError> {
    let response = request.send().map_err(|error| {
        ReviewError::data_source(format!(
            "could not reach Google Sheets to {operation}: {error}"
        ))
    })?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().unwrap_or_default();
    let hint = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            "; check that the spreadsheet is shared with the service account"
        }
        StatusCode::NOT_FOUND => "; the spreadsheet or worksheet no longer exists",
        _ => "",
    };
    Err(ReviewError::data_source(format!(
        "Google Sheets refused to {operation} (status {}){hint}: {}",
        status.as_u16(),
        body.trim()
    )))
}

fn decode<T: serde::de::DeserializeOwned>(
    response: Response,
    operation: &str,
) -> Result<T, ReviewError> {
    response.json().map_err(|error| {
        ReviewError::data_source(format!(
            "Google Sheets returned an unreadable response while trying to {operation}: {error}"
        ))
    })
}

/// Converts a values grid (header row first) into header-keyed rows.
///
/// Trailing empty cells omitted by the API are treated as blank and rows with
/// no content are skipped.
///
/// # Errors
///
/// Returns [`ReviewError::DataSource`] when the header row has no name column.
pub fn rows_from_values(values: &[Vec<String>]) -> Result<Vec<SheetRow>, ReviewError> {
    let Some((headers, body)) = values.split_first() else {
        return Ok(Vec::new());
    };
    if !headers
        .iter()
        .any(|header| Column::from_header(header) == Some(Column::Name))
    {
        return Err(ReviewError::data_source(
            "worksheet header row has no name column (expected 'name' or '姓名')",
        ));
    }

    // Sheet row 1 is the header, so body index 0 is sheet row 2.
    Ok(body
        .iter()
        .enumerate()
        .filter(|(_, cells)| cells.iter().any(|cell| !cell.trim().is_empty()))
        .map(|(body_index, cells)| {
            SheetRow::from_pairs(headers.iter().enumerate().map(|(index, header)| {
                (
                    header.as_str(),
                    cells.get(index).map_or("", String::as_str),
                )
            }))
            .with_source_row(body_index + 2)
        })
        .collect())
}

/// Quotes a worksheet title for use in A1 notation.
#[must_use]
pub fn quote_sheet_title(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

fn escape_query_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}
