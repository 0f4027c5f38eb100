use parsona_core::{CoreError, StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Signal extraction was asked to summarize zero activities.
    #[error("no activities provided for signal extraction")]
    EmptyInput,

    #[error("activity at index {index} is invalid: {source}")]
    InvalidPayload {
        index: usize,
        #[source]
        source: CoreError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum ExplainError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("explanation generator returned no text")]
    EmptyResponse,
}
