//! BrandGuard Store: source chunks for claim attribution
//!
//! This crate owns the read side of the retrieval corpus as seen by the
//! guardrail layer. The agent searches the corpus upstream; the verifier only
//! resolves chunk identifiers back into their text and provenance.
//!
//! ## Key Components
//!
//! - `Chunk` / `ChunkId`: immutable, content-addressed unit of source text
//! - `ChunkStore`: async lookup trait, backend-agnostic
//! - `MemoryChunkStore`: in-memory store (tests, JSON corpora)
//! - `SurrealChunkStore`: SurrealDB-backed store

mod chunk;
mod error;
pub mod fakes;
mod migrations;
pub mod storage_traits;
pub mod surreal_store;

pub use chunk::{Chunk, ChunkId};
pub use error::StorageError;
pub use fakes::{FailingChunkStore, MemoryChunkStore};
pub use storage_traits::{ChunkStore, ContentDigest, StorageResult};
pub use surreal_store::SurrealChunkStore;
