/*!
 * Error types for the veditai application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 *
 * Engine-internal conditions (no phrase match, empty transcript) are not
 * errors and never appear here; they are recovered locally through the
 * documented fallback policies in `timeline` and `overlay`.
 */

// Allow dead code - error types are for library consumers
#![allow(dead_code)]

use thiserror::Error;

/// Errors that can occur when talking to the intent classifier
#[derive(Error, Debug)]
pub enum ClassifierError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),
}

/// Errors that can occur during silence detection
///
/// A detection failure aborts the cut and is reported as "nothing to cut";
/// the session is left unmodified.
#[derive(Error, Debug)]
pub enum DetectionError {
    /// The detector log did not contain a duration marker
    #[error("No duration marker found in detection log")]
    DurationMissing,

    /// The detector process failed to run or exited with an error
    #[error("Detection process failed: {0}")]
    ProcessFailed(String),

    /// The detector did not finish within the allotted time
    #[error("Detection timed out after {0} seconds")]
    Timeout(u64),
}

/// Errors that can occur while rendering or stitching video
#[derive(Error, Debug)]
pub enum RenderError {
    /// The render process failed to run or exited with an error
    #[error("Render process failed: {0}")]
    ProcessFailed(String),

    /// The renderer did not finish within the allotted time
    #[error("Render timed out after {0} seconds")]
    Timeout(u64),

    /// A scratch file could not be created or written
    #[error("Render I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur in the session store
#[derive(Error, Debug)]
pub enum StoreError {
    /// No session exists under the given id
    #[error("Session not found: {0}")]
    NotFound(String),

    /// The storage backend reported a failure
    #[error("Store backend error: {0}")]
    Backend(String),

    /// Session state could not be serialized or deserialized
    #[error("Session serialization error: {0}")]
    Serialization(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(error: rusqlite::Error) -> Self {
        Self::Backend(error.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from the intent classifier
    #[error("Classifier error: {0}")]
    Classifier(#[from] ClassifierError),

    /// Error from silence detection
    #[error("Detection error: {0}")]
    Detection(#[from] DetectionError),

    /// Error from the renderer
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Error from the session store
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Error from transcription
    #[error("Transcription error: {0}")]
    Transcription(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
