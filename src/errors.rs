//! Typed error hierarchy for msort-health.
//!
//! Three enums cover the three fallible edges of the system:
//! - `FetchError`: the single GitHub issue-listing call
//! - `SelectionError`: user-supplied bot selections on the health grid
//! - `StoreError`: the persisted bot selection blob
//!
//! Parsing never fails; it degrades to sentinel values instead.

use thiserror::Error;

/// Errors from fetching issues from the tracker.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("GitHub API error: {status} {status_text}")]
    Http { status: u16, status_text: String },

    #[error("Failed to decode issue list: {0}")]
    Decode(#[source] reqwest::Error),
}

impl FetchError {
    /// HTTP status code carried by the error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors from building a bot selection for the health grid.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Please enter bot IDs")]
    EmptyInput,

    #[error("No valid bot IDs found")]
    NoValidIds,

    #[error("Start must be less than or equal to End (got {start} > {end})")]
    InvalidRange { start: u32, end: u32 },

    #[error("Too many bots selected ({count}); the limit is {max}")]
    TooManyBots { count: u64, max: usize },
}

/// Errors from reading or writing the persisted bot selection.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to access selection file at {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Selection file at {path} is not valid JSON: {source}")]
    Json {
        path: std::path::PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
