//! Storage trait definitions for BrandGuard
//!
//! - `ChunkStore`: resolve chunk identifiers into chunks
//! - `ContentDigest`: SHA-256 digests used for artifact integrity
//!
//! Traits are async and backend-agnostic. In-memory fakes live in `fakes`.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::chunk::Chunk;
use crate::error::StorageError;

/// Result type for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

// ---------------------------------------------------------------------------
// ContentDigest
// ---------------------------------------------------------------------------

/// Content digest (SHA-256 hex string).
///
/// The inner field is private so the string is always lowercase hex produced
/// by `from_bytes` or validated via `TryFrom<String>` when read back from disk.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentDigest(String);

impl ContentDigest {
    /// Compute the SHA-256 digest of the given bytes.
    pub fn from_bytes(data: &[u8]) -> Self {
        use sha2::Digest;
        let mut hasher = Sha256::new();
        hasher.update(data);
        ContentDigest(hex::encode(hasher.finalize()))
    }

    /// Return the full hex string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ContentDigest {
    type Error = StorageError;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        if s.len() != 64 || !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(StorageError::InvalidDigest { digest: s });
        }
        Ok(ContentDigest(s.to_ascii_lowercase()))
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// ChunkStore
// ---------------------------------------------------------------------------

/// Read-mostly chunk store.
///
/// Guarantees:
/// - `lookup(ids)` returns only the ids it knows; unknown ids are absent,
///   never an error.
/// - A chunk's text and source never change after `put`.
/// - `Err` is reserved for backend failures (connection, query).
#[async_trait]
pub trait ChunkStore: Send + Sync {
    /// Resolve chunk ids into chunks, keyed by the requested id.
    async fn lookup(&self, ids: &[String]) -> StorageResult<HashMap<String, Chunk>>;

    /// Insert a chunk. Re-inserting an existing id is a no-op.
    async fn put(&self, chunk: Chunk) -> StorageResult<()>;

    /// Number of chunks held.
    async fn len(&self) -> StorageResult<usize>;

    async fn is_empty(&self) -> StorageResult<bool> {
        Ok(self.len().await? == 0)
    }
}
