//! Service-account credentials and the OAuth2 JWT bearer token exchange.

use std::time::Duration;

use camino::Utf8Path;
use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::error::ReviewError;

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// Refresh tokens this long before they expire.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Scopes needed to find a spreadsheet by name and append to it.
pub const SCOPES: &str = concat!(
    "https://www.googleapis.com/auth/spreadsheets ",
    "https://www.googleapis.com/auth/drive.readonly"
);

/// Service-account key as downloaded from the Google Cloud console.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceAccountKey {
    /// Account e-mail; the spreadsheet must be shared with it.
    pub client_email: String,
    /// PEM-encoded RSA private key.
    pub private_key: String,
    /// Identifier of the private key, sent as the JWT `kid`.
    #[serde(default)]
    pub private_key_id: Option<String>,
    /// OAuth2 token endpoint.
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_owned()
}

impl ServiceAccountKey {
    /// Parses a service-account key from its JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::Configuration`] when the JSON is not a
    /// service-account key.
    pub fn from_json(json: &str) -> Result<Self, ReviewError> {
        let key: Self = serde_json::from_str(json).map_err(|error| {
            ReviewError::configuration(format!(
                "store credentials are not a valid service-account key: {error}"
            ))
        })?;
        if key.client_email.trim().is_empty() || key.private_key.trim().is_empty() {
            return Err(ReviewError::configuration(
                "store credentials must include client_email and private_key",
            ));
        }
        Ok(key)
    }

    /// Reads a service-account key from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::Configuration`] when the file cannot be read or
    /// parsed.
    pub fn from_path(path: &Utf8Path) -> Result<Self, ReviewError> {
        let json = std::fs::read_to_string(path).map_err(|error| {
            ReviewError::configuration(format!(
                "failed to read store credentials '{path}': {error}"
            ))
        })?;
        Self::from_json(&json)
    }
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// A bearer token and the moment it stops being usable.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("AccessToken")
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

impl AccessToken {
    /// Bearer value.
    #[must_use]
    pub fn secret(&self) -> &str {
        &self.value
    }

    /// Returns true once the token is within the refresh margin of expiry.
    #[must_use]
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        now + TimeDelta::seconds(EXPIRY_MARGIN_SECS) >= self.expires_at
    }
}

/// Builds the signed RS256 assertion for the token exchange.
///
/// # Errors
///
/// Returns [`ReviewError::Configuration`] when the private key cannot sign.
pub fn build_assertion(key: &ServiceAccountKey, now: DateTime<Utc>) -> Result<String, ReviewError> {
    let issued_at = now.timestamp();
    let claims = Claims {
        iss: key.client_email.as_str(),
        scope: SCOPES,
        aud: key.token_uri.as_str(),
        iat: issued_at,
        exp: issued_at + ASSERTION_LIFETIME_SECS,
    };
    let mut header = Header::new(Algorithm::RS256);
    header.kid.clone_from(&key.private_key_id);

    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes()).map_err(|error| {
        ReviewError::configuration(format!("service-account private key is invalid: {error}"))
    })?;
    encode(&header, &claims, &encoding_key).map_err(|error| {
        ReviewError::configuration(format!("failed to sign service-account assertion: {error}"))
    })
}

/// Exchanges a signed assertion for an access token.
///
/// # Errors
///
/// Returns [`ReviewError::Configuration`] when the key cannot sign and
/// [`ReviewError::DataSource`] when the token endpoint rejects the request or
/// cannot be reached.
pub fn fetch_access_token(
    client: &Client,
    key: &ServiceAccountKey,
    now: DateTime<Utc>,
) -> Result<AccessToken, ReviewError> {
    let assertion = build_assertion(key, now)?;
    let response = client
        .post(key.token_uri.as_str())
        .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
        .send()
        .map_err(|error| {
            ReviewError::data_source(format!("Google token exchange transport failed: {error}"))
        })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(ReviewError::data_source(format!(
            "Google rejected the service-account credentials for {} (status {}): {}",
            key.client_email,
            status.as_u16(),
            body.trim()
        )));
    }

    let payload: TokenResponse = response.json().map_err(|error| {
        ReviewError::data_source(format!("Google token response could not be decoded: {error}"))
    })?;
    let lifetime = payload.expires_in.unwrap_or(ASSERTION_LIFETIME_SECS);
    Ok(AccessToken {
        value: payload.access_token,
        expires_at: now + TimeDelta::seconds(lifetime),
    })
}

/// Default timeout for every Google API call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
