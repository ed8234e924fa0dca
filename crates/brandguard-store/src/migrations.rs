//! SurrealDB schema initialization for the chunk table.

use surrealdb::engine::any::Any;
use surrealdb::Surreal;
use tracing::{debug, info};

use crate::error::StorageError;
use crate::storage_traits::StorageResult;

/// Initialize all BrandGuard tables. Idempotent.
pub async fn init_schema(db: &Surreal<Any>) -> StorageResult<()> {
    info!("Initializing BrandGuard chunk schema");
    init_chunks_table(db).await?;
    Ok(())
}

/// Initialize `chunks` table
///
/// Schema:
/// ```text
/// TABLE chunks {
///   chunk_id:  STRING (unique)
///   text:      STRING
///   source:    STRING (indexed)
/// }
/// ```
///
/// Chunks are immutable: updates and deletes are not permitted.
async fn init_chunks_table(db: &Surreal<Any>) -> StorageResult<()> {
    debug!("Initializing chunks table");

    let sql = r#"
        DEFINE TABLE IF NOT EXISTS chunks AS
            SCHEMALESS
            PERMISSIONS
                FOR create FULL
                FOR read FULL
                FOR update NONE
                FOR delete NONE;

        DEFINE INDEX IF NOT EXISTS idx_chunk_id ON TABLE chunks COLUMNS chunk_id UNIQUE;
        DEFINE INDEX IF NOT EXISTS idx_chunk_source ON TABLE chunks COLUMNS source;
    "#;

    db.query(sql)
        .await
        .map_err(|e| StorageError::SchemaSetup(e.to_string()))?
        .check()
        .map_err(|e| StorageError::SchemaSetup(e.to_string()))?;

    Ok(())
}
