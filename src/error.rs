//! Error types for the qbattle crate

use thiserror::Error;

/// Main error type for the qbattle crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid action index {index} (expected 0 = attack or 1 = heal)")]
    InvalidAction { index: usize },

    #[error("battle already over; call reset before stepping again")]
    AlreadyTerminated,

    #[error("state index {index} is out of bounds (must be below {state_count})")]
    UnknownState { index: usize, state_count: usize },

    #[error("no actions available to choose from")]
    NoActionsAvailable,

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("progress bar template error: {message}")]
    ProgressBarTemplate { message: String },
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}
