//! Domain-level error taxonomy for BrandGuard.
//!
//! Validation failures of generated content are not errors: the runner
//! reports them through `RunnerResult::flags`.

/// BrandGuard domain errors.
#[derive(Debug, thiserror::Error)]
pub enum GuardError {
    #[error("invalid brief: {0}")]
    InvalidBrief(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("unknown channel: {0}")]
    UnknownChannel(String),

    #[error("artifact not found: {0}")]
    ArtifactNotFound(String),

    #[error("digest mismatch: expected {expected}, got {actual}")]
    DigestMismatch { expected: String, actual: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("storage error: {0}")]
    Storage(#[from] brandguard_store::StorageError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for BrandGuard domain operations.
pub type Result<T> = std::result::Result<T, GuardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_error_display() {
        let err = GuardError::InvalidBrief("channels cannot be empty".to_string());
        assert!(err.to_string().contains("invalid brief"));

        let err = GuardError::UnknownChannel("tiktok".to_string());
        assert!(err.to_string().contains("tiktok"));
    }

    #[test]
    fn test_digest_mismatch_error() {
        let err = GuardError::DigestMismatch {
            expected: "abc123".to_string(),
            actual: "def456".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("abc123"));
        assert!(msg.contains("def456"));
    }
}
