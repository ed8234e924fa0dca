//! Chunk model with content-derived identifiers.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Stable chunk identifier (`chunk_<16 hex>`), derived from source and text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChunkId(pub String);

impl ChunkId {
    /// Derive the id for a chunk body and its provenance.
    ///
    /// Identical `(source, text)` pairs always map to the same id.
    pub fn derive(source: &str, text: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(source.as_bytes());
        hasher.update([0u8]);
        hasher.update(text.as_bytes());
        let hex = hex::encode(hasher.finalize());
        ChunkId(format!("chunk_{}", &hex[..16]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ChunkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ChunkId {
    fn from(s: &str) -> Self {
        ChunkId(s.to_string())
    }
}

/// Addressable unit of source text with provenance.
///
/// Immutable once created; the verifier only ever reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: ChunkId,
    pub text: String,
    pub source: String,
}

impl Chunk {
    /// Build a chunk, deriving its id from content.
    pub fn new(text: impl Into<String>, source: impl Into<String>) -> Self {
        let text = text.into();
        let source = source.into();
        Self {
            id: ChunkId::derive(&source, &text),
            text,
            source,
        }
    }

    /// Build a chunk with an externally assigned id (e.g. from a vector index).
    pub fn with_id(id: impl Into<String>, text: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: ChunkId(id.into()),
            text: text.into(),
            source: source.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_is_content_derived_and_stable() {
        let a = Chunk::new("Over 18,000 customers", "docs/product.md");
        let b = Chunk::new("Over 18,000 customers", "docs/product.md");
        assert_eq!(a.id, b.id);
        assert!(a.id.as_str().starts_with("chunk_"));
        assert_eq!(a.id.as_str().len(), "chunk_".len() + 16);
    }

    #[test]
    fn id_depends_on_source_and_text() {
        let a = Chunk::new("same text", "a.md");
        let b = Chunk::new("same text", "b.md");
        let c = Chunk::new("other text", "a.md");
        assert_ne!(a.id, b.id);
        assert_ne!(a.id, c.id);
    }

    #[test]
    fn source_text_boundary_is_unambiguous() {
        // "ab" + "c" must not collide with "a" + "bc"
        assert_ne!(ChunkId::derive("ab", "c"), ChunkId::derive("a", "bc"));
    }
}
