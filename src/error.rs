//! Error handling module for modsurvey
//!
//! Provides centralized error handling with proper error types using thiserror.
//! Selection-rule rejections live in [`crate::rules::RejectionReason`] and are
//! wrapped here so every fallible operation returns the same type.

use thiserror::Error;

use crate::rules::RejectionReason;

/// Main error type for modsurvey
#[derive(Error, Debug)]
pub enum SurveyError {
    /// Selections do not satisfy the chosen option
    #[error("{0}")]
    Rejected(#[from] RejectionReason),

    /// A required identity field is missing or malformed
    #[error("Invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// A selection that the survey form never offered
    #[error("Unknown selection: {0}")]
    UnknownSelection(String),

    /// Survey API call failed (surfaced verbatim, never retried)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Local response store could not be read or written
    #[error("Storage error: {0}")]
    Storage(String),

    /// File generation failed
    #[error("Export failed: {0}. Please try again.")]
    Export(String),

    /// No stored response with this id
    #[error("Response {0} not found")]
    NotFound(u64),

    /// Configuration errors (loading, parsing, validation)
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors (file operations, terminal, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for modsurvey operations
pub type Result<T> = std::result::Result<T, SurveyError>;

impl SurveyError {
    /// Create an invalid-field error
    pub fn invalid_field(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }

    /// Create an unknown-selection error
    pub fn unknown_selection(msg: impl Into<String>) -> Self {
        Self::UnknownSelection(msg.into())
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create an export error
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// True for errors the participant fixes by editing the form and resubmitting.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Rejected(_) | Self::InvalidField { .. } | Self::UnknownSelection(_)
        )
    }
}

impl From<csv::Error> for SurveyError {
    fn from(e: csv::Error) -> Self {
        Self::Export(e.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for SurveyError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        Self::Export(e.to_string())
    }
}

impl From<reqwest::Error> for SurveyError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}
