//! Unified error type for the taplist workspace.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("feed returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("rating {0} is out of range (expected 1-5)")]
    RatingOutOfRange(u8),

    #[error("config error: {0}")]
    Config(String),

    #[error("unknown festival: {0}")]
    UnknownFestival(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}
