//! Defines the application's primary error type `AppError` and a convenience `Result` alias.
//!
//! Uses the `thiserror` crate for ergonomic error definition and provides `From`
//! implementations to convert common external errors into `AppError` variants.
//! Errors that do not implement `Clone` are wrapped in `Arc` to allow `AppError` to be cloneable.

use std::sync::Arc;
use thiserror::Error;

/// The primary error enumeration for all application-specific errors.
#[derive(Error, Debug, Clone)]
pub enum AppError {
    /// The request never completed (DNS, connect, timeout, body read).
    #[error("Network Error: {0}")]
    Network(Arc<reqwest::Error>),

    /// The server answered with a non-success status code.
    #[error("Upstream Error: {url} returned {status}")]
    Upstream { status: u16, url: String },

    /// Error during JSON parsing (`serde_json`).
    #[error("JSON Parsing Error: {0}")]
    JsonParse(Arc<serde_json::Error>),

    /// Well-formed payload that lacks a field we need.
    #[error("Missing Data: {0}")]
    MissingData(String),

    /// Operator input that cannot be used (coordinates, dates).
    #[error("Invalid Input: {0}")]
    InvalidInput(String),

    /// Error originating from the city lookup database (`sqlx`).
    #[error("Database Error: {0}")]
    Db(Arc<sqlx::Error>),

    /// Error while writing an export file (`csv`).
    #[error("CSV Error: {0}")]
    Csv(Arc<csv::Error>),

    /// Error related to accessing environment variables.
    #[error("Environment Error: {0}")]
    Env(#[from] std::env::VarError),

    /// Error related to standard I/O operations.
    #[error("I/O Error: {0}")]
    Io(Arc<std::io::Error>),

    /// Error specific to CLI logic or argument handling.
    #[error("CLI Error: {0}")]
    Cli(String),

    /// Error originating from user interaction prompts (`dialoguer`).
    #[error("Dialoguer Error: {0}")]
    Dialoguer(Arc<dialoguer::Error>),

    /// Error related to progress bar style templating (`indicatif`).
    #[error("Progress Style Template Error: {0}")]
    Template(Arc<indicatif::style::TemplateError>),
}

impl AppError {
    /// True for failures of the remote API or its payload, as opposed to local faults.
    ///
    /// These are the failures the pipeline turns into a "no data" warning.
    pub fn is_no_data(&self) -> bool {
        matches!(
            self,
            AppError::Network(_)
                | AppError::Upstream { .. }
                | AppError::JsonParse(_)
                | AppError::MissingData(_)
        )
    }
}

/// A specialized `Result` type using the application's `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

// --- From implementations ---

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => AppError::Upstream {
                status: status.as_u16(),
                url: err
                    .url()
                    .map(|u| u.path().to_string())
                    .unwrap_or_else(|| "unknown URL".to_string()),
            },
            None if err.is_decode() => AppError::MissingData(err.to_string()),
            None => AppError::Network(Arc::new(err)),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Db(Arc::new(err))
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::Csv(Arc::new(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(Arc::new(err))
    }
}

impl From<dialoguer::Error> for AppError {
    fn from(err: dialoguer::Error) -> Self {
        AppError::Dialoguer(Arc::new(err))
    }
}

impl From<indicatif::style::TemplateError> for AppError {
    fn from(err: indicatif::style::TemplateError) -> Self {
        AppError::Template(Arc::new(err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::JsonParse(Arc::new(err))
    }
}
