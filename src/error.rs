//! Custom error types for symptom-checker

use thiserror::Error;

/// Main error type for symptom-checker operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Missing symptoms or severities")]
    MissingFields,

    #[error("At least one symptom is required")]
    EmptyInput,

    #[error("Each symptom must have a severity")]
    SeverityCountMismatch,

    #[error("Invalid symptom ID: {0}")]
    InvalidSymptomId(i64),

    #[error("Invalid severity: {0}")]
    InvalidSeverity(String),

    #[error("Prediction failed: {0}")]
    PredictionFailed(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Encryption error: {0}")]
    Crypto(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Record not found: {0}")]
    RecordNotFound(i64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl Error {
    /// Whether the error was caused by the caller's input rather than the server
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::MissingFields
                | Error::EmptyInput
                | Error::SeverityCountMismatch
                | Error::InvalidSymptomId(_)
                | Error::InvalidSeverity(_)
        )
    }
}

/// Result type alias for symptom-checker
pub type Result<T> = std::result::Result<T, Error>;
