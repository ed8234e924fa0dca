//! SurrealDB-backed ChunkStore implementation
//!
//! Rows are stored as `ChunkRow` and converted to [`Chunk`] at the boundary.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use surrealdb::engine::any::Any;
use surrealdb::Surreal;
use tracing::{debug, info};

use crate::chunk::{Chunk, ChunkId};
use crate::error::StorageError;
use crate::migrations;
use crate::storage_traits::{ChunkStore, StorageResult};

const NAMESPACE: &str = "brandguard";
const DATABASE: &str = "corpus";

/// Database row for a chunk.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChunkRow {
    /// SurrealDB record ID
    id: Option<surrealdb::sql::Thing>,
    chunk_id: String,
    text: String,
    source: String,
}

impl From<Chunk> for ChunkRow {
    fn from(chunk: Chunk) -> Self {
        ChunkRow {
            id: None,
            chunk_id: chunk.id.0,
            text: chunk.text,
            source: chunk.source,
        }
    }
}

impl From<ChunkRow> for Chunk {
    fn from(row: ChunkRow) -> Self {
        Chunk {
            id: ChunkId(row.chunk_id),
            text: row.text,
            source: row.source,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChunkIdRow {
    #[allow(dead_code)]
    chunk_id: String,
}

/// SurrealDB-backed implementation of [`ChunkStore`].
pub struct SurrealChunkStore {
    db: Surreal<Any>,
}

impl SurrealChunkStore {
    /// Create an in-memory instance for testing.
    ///
    /// Connects to `mem://`, selects `brandguard/corpus`, and runs `init_schema`.
    pub async fn in_memory() -> StorageResult<Self> {
        let store = Self::connect("mem://").await?;
        info!("SurrealChunkStore connected (in-memory)");
        Ok(store)
    }

    /// Connect to any SurrealDB endpoint (`mem://`, `surrealkv://path`, `ws://host`).
    pub async fn connect(url: &str) -> StorageResult<Self> {
        let db = surrealdb::engine::any::connect(url)
            .await
            .map_err(|e| StorageError::Connection(format!("Failed to connect to {url}: {e}")))?;

        db.use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        migrations::init_schema(&db).await?;
        Ok(Self { db })
    }

    /// Connect using `BRANDGUARD_SURREALDB_URL`, defaulting to local
    /// persistence under `.brandguard/db`.
    pub async fn from_env() -> StorageResult<Self> {
        if let Ok(url) = std::env::var("BRANDGUARD_SURREALDB_URL") {
            let store = Self::connect(&url).await?;
            info!("SurrealChunkStore connected ({})", url);
            return Ok(store);
        }

        let path = ".brandguard/db";
        std::fs::create_dir_all(path).map_err(|e| {
            StorageError::Connection(format!(
                "Failed to create database directory {}: {}",
                path, e
            ))
        })?;
        let url = format!("surrealkv://{}", path);
        info!("No BRANDGUARD_SURREALDB_URL found, using local persistence: {}", url);
        Self::connect(&url).await
    }
}

#[async_trait]
impl ChunkStore for SurrealChunkStore {
    async fn lookup(&self, ids: &[String]) -> StorageResult<HashMap<String, Chunk>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut res = self
            .db
            .query("SELECT * FROM chunks WHERE chunk_id IN $ids")
            .bind(("ids", ids.to_vec()))
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        let rows: Vec<ChunkRow> = res
            .take(0)
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        debug!(requested = ids.len(), found = rows.len(), "chunk lookup");
        Ok(rows
            .into_iter()
            .map(|row| (row.chunk_id.clone(), Chunk::from(row)))
            .collect())
    }

    async fn put(&self, chunk: Chunk) -> StorageResult<()> {
        let existing = self.lookup(std::slice::from_ref(&chunk.id.0)).await?;
        if existing.contains_key(chunk.id.as_str()) {
            return Ok(());
        }

        debug!(chunk_id = %chunk.id, source = %chunk.source, "storing chunk");
        let _created: Option<ChunkRow> = self
            .db
            .create("chunks")
            .content(ChunkRow::from(chunk))
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        Ok(())
    }

    async fn len(&self) -> StorageResult<usize> {
        let mut res = self
            .db
            .query("SELECT chunk_id FROM chunks")
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        let rows: Vec<ChunkIdRow> = res
            .take(0)
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        Ok(rows.len())
    }
}
