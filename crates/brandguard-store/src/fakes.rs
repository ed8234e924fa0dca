//! In-memory chunk stores
//!
//! `MemoryChunkStore` doubles as the store for small JSON corpora loaded by
//! the CLI. `FailingChunkStore` simulates an unavailable backend.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::chunk::Chunk;
use crate::error::StorageError;
use crate::storage_traits::*;

// ---------------------------------------------------------------------------
// MemoryChunkStore
// ---------------------------------------------------------------------------

/// In-memory chunk store backed by a `HashMap<id, Chunk>`.
#[derive(Debug, Default)]
pub struct MemoryChunkStore {
    chunks: Mutex<HashMap<String, Chunk>>,
    /// Insertion order, so `all_ids` is deterministic.
    order: Mutex<Vec<String>>,
}

/// One corpus entry on disk. `id` is derived from content when omitted.
#[derive(Debug, Deserialize)]
struct ChunkFileEntry {
    id: Option<String>,
    text: String,
    #[serde(default = "unknown_source")]
    source: String,
}

fn unknown_source() -> String {
    "unknown".to_string()
}

impl MemoryChunkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from chunks, keeping their order.
    pub fn from_chunks(chunks: impl IntoIterator<Item = Chunk>) -> Self {
        let store = Self::new();
        for chunk in chunks {
            store.insert(chunk);
        }
        store
    }

    /// Load a JSON array of `{id?, text, source?}` objects.
    pub fn from_json_file(path: &Path) -> StorageResult<Self> {
        let raw = std::fs::read(path)?;
        let entries: Vec<ChunkFileEntry> = serde_json::from_slice(&raw)?;
        let store = Self::new();
        for (idx, entry) in entries.into_iter().enumerate() {
            if entry.text.trim().is_empty() {
                return Err(StorageError::InvalidChunk(format!(
                    "entry {idx} in {} has empty text",
                    path.display()
                )));
            }
            let chunk = match entry.id {
                Some(id) => Chunk::with_id(id, entry.text, entry.source),
                None => Chunk::new(entry.text, entry.source),
            };
            store.insert(chunk);
        }
        debug!(path = %path.display(), chunks = store.order.lock().unwrap().len(), "loaded chunk corpus");
        Ok(store)
    }

    /// Every id in insertion order.
    pub fn all_ids(&self) -> Vec<String> {
        self.order.lock().unwrap().clone()
    }

    fn insert(&self, chunk: Chunk) {
        let mut chunks = self.chunks.lock().unwrap();
        let key = chunk.id.as_str().to_string();
        if chunks.contains_key(&key) {
            return;
        }
        self.order.lock().unwrap().push(key.clone());
        chunks.insert(key, chunk);
    }
}

#[async_trait]
impl ChunkStore for MemoryChunkStore {
    async fn lookup(&self, ids: &[String]) -> StorageResult<HashMap<String, Chunk>> {
        let chunks = self.chunks.lock().unwrap();
        Ok(ids
            .iter()
            .filter_map(|id| chunks.get(id).map(|c| (id.clone(), c.clone())))
            .collect())
    }

    async fn put(&self, chunk: Chunk) -> StorageResult<()> {
        self.insert(chunk);
        Ok(())
    }

    async fn len(&self) -> StorageResult<usize> {
        Ok(self.chunks.lock().unwrap().len())
    }
}

// ---------------------------------------------------------------------------
// FailingChunkStore
// ---------------------------------------------------------------------------

/// Store whose backend is always down.
#[derive(Debug, Default)]
pub struct FailingChunkStore;

#[async_trait]
impl ChunkStore for FailingChunkStore {
    async fn lookup(&self, _ids: &[String]) -> StorageResult<HashMap<String, Chunk>> {
        Err(StorageError::Backend("chunk store unavailable".to_string()))
    }

    async fn put(&self, _chunk: Chunk) -> StorageResult<()> {
        Err(StorageError::Backend("chunk store unavailable".to_string()))
    }

    async fn len(&self) -> StorageResult<usize> {
        Err(StorageError::Backend("chunk store unavailable".to_string()))
    }
}
