//! Domain error types for settings parsing.

use thiserror::Error;

/// Errors produced while interpreting the service's settings payload.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// The payload was not a JSON object of string-to-string entries.
    #[error("Malformed settings payload: {0}")]
    Payload(#[from] serde_json::Error),

    /// A key did not name any pad on the panel.
    #[error("Unknown button key: {key}")]
    UnknownButton { key: String },
}

/// Result type for settings operations.
pub type SettingsResult<T> = Result<T, SettingsError>;
