//! Error types.
//!
//! `ApiError` covers everything that can go wrong while talking to the task
//! service. Callers treat every variant the same way (log, tell the user,
//! clear the loading state); the split exists for diagnostics.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("server returned {status}{}", body_suffix(.body))]
    Status { status: u16, body: String },

    /// The response body did not have the expected shape.
    #[error("unexpected response payload: {0}")]
    Payload(#[from] serde_json::Error),

    /// Input rejected before any request was sent.
    #[error("{0}")]
    Validation(String),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

pub type ApiResult<T> = Result<T, ApiError>;

fn body_suffix(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        String::new()
    } else {
        format!(": {}", crate::display::truncate(body, 120))
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid API URL '{url}': {source}")]
    ApiUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unknown theme '{0}' (expected 'dark' or 'light')")]
    Theme(String),
}
