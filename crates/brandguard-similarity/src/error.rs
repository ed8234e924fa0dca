//! Error types for brandguard-similarity

use thiserror::Error;

/// Errors from a similarity backend.
#[derive(Error, Debug)]
pub enum SimilarityError {
    /// Transport-level failure talking to an embedding endpoint
    #[error("embedding request failed: {0}")]
    Request(String),

    /// Endpoint answered with a non-success status
    #[error("embedding endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Response did not contain the expected vectors
    #[error("malformed embedding response: {0}")]
    MalformedResponse(String),

    /// Missing endpoint or credentials
    #[error("embedding service not configured: {0}")]
    NotConfigured(String),
}

impl From<reqwest::Error> for SimilarityError {
    fn from(err: reqwest::Error) -> Self {
        SimilarityError::Request(err.to_string())
    }
}

/// Result type for similarity operations.
pub type Result<T> = std::result::Result<T, SimilarityError>;
