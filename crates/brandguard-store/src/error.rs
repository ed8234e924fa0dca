//! Error types for brandguard-store

use thiserror::Error;

/// Errors raised by chunk storage backends.
///
/// A missing chunk is never an error: lookups simply omit unknown ids.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Backend connection error
    #[error("chunk store connection failed: {0}")]
    Connection(String),

    /// Backend query error
    #[error("chunk store backend error: {0}")]
    Backend(String),

    /// Schema setup error
    #[error("chunk store schema setup failed: {0}")]
    SchemaSetup(String),

    /// Malformed corpus file or row
    #[error("invalid chunk data: {0}")]
    InvalidChunk(String),

    /// Digest string is not 64 hex characters
    #[error("invalid digest: {digest}")]
    InvalidDigest { digest: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<surrealdb::Error> for StorageError {
    fn from(err: surrealdb::Error) -> Self {
        StorageError::Backend(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_display() {
        let err = StorageError::Backend("socket closed".to_string());
        assert!(err.to_string().contains("backend error"));
        assert!(err.to_string().contains("socket closed"));

        let err = StorageError::InvalidDigest {
            digest: "zz".to_string(),
        };
        assert!(err.to_string().contains("zz"));
    }
}
