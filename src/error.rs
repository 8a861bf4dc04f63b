//! Error types surfaced by the medication review workflow.

use thiserror::Error;

/// Errors surfaced while configuring, loading, annotating, reviewing, or
/// exporting a roster.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReviewError {
    /// Configuration was missing or invalid; the process halts before any
    /// store or advisor call.
    #[error("configuration error: {message}")]
    Configuration {
        /// Details about the configuration failure.
        message: String,
    },

    /// Reading from or appending to the backing store failed, or the store
    /// returned rows that could not be parsed.
    #[error("data source error: {message}")]
    DataSource {
        /// Description of the failed store operation.
        message: String,
    },

    /// A language-model advisor call failed.
    #[error("advisor error: {message}")]
    Advisor {
        /// Description of the failed advisor call.
        message: String,
    },

    /// A review submission was rejected because a required field was missing
    /// or invalid.
    #[error("invalid review: {message}")]
    Validation {
        /// Which input needs correcting and how.
        message: String,
    },

    /// A phase that needs a roster ran before the roster was loaded.
    #[error("the roster has not been loaded; load it before annotating, reviewing, or exporting")]
    RosterNotLoaded,

    /// Local I/O operation failed.
    #[error("I/O error: {message}")]
    Io {
        /// Error detail from the underlying I/O operation.
        message: String,
    },
}

impl ReviewError {
    /// Builds a [`ReviewError::Validation`] from a message.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Builds a [`ReviewError::DataSource`] from a message.
    #[must_use]
    pub fn data_source(message: impl Into<String>) -> Self {
        Self::DataSource {
            message: message.into(),
        }
    }

    /// Builds a [`ReviewError::Configuration`] from a message.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

/// Converts an I/O error to a [`ReviewError::Io`].
#[must_use]
pub fn io_error(error: &std::io::Error) -> ReviewError {
    ReviewError::Io {
        message: error.to_string(),
    }
}
