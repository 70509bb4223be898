// src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("network request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("network middleware error: {0}")]
    NetworkMiddleware(#[from] reqwest_middleware::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to persist temporary file: {0}")]
    TempFilePersist(#[from] tempfile::PersistError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("could not parse the response from '{url}': {source}")]
    ApiParseFailed {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    /// The backend answered `success: false`.
    #[error("{0}")]
    Backend(String),
    #[error("a download is already in progress")]
    Busy,
    /// The failure was already shown to the user as an alert.
    #[error("operation failed")]
    Reported,
    #[error("interrupted by user")]
    UserInterrupt,
    #[error("{0}")] // message only, no prefix
    UserInputError(String),
    #[error("unexpected error: {0}")]
    Other(#[from] anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;
