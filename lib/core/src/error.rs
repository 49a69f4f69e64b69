use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the fallible edges of SiftX.
///
/// Ranking itself is total; only loading inputs from disk, validating a
/// configuration and starting the background worker can fail.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid records: {0}")]
    InvalidRecords(String),

    #[error("Worker error: {0}")]
    Worker(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
