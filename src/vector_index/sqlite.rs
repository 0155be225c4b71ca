//! SQLite-based vector index implementation.
//!
//! Uses SQLite with cosine similarity computed in Rust for simplicity.
//! For large datasets consider the sqlite-vec extension or a dedicated
//! vector database.

use super::{cosine_similarity, IndexedItem, SearchMatch, VectorIndex};
use crate::error::{Result, SitatError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info, instrument};
use uuid::Uuid;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS items (
    id TEXT PRIMARY KEY,
    owner_id TEXT NOT NULL,
    line_index INTEGER NOT NULL,
    speaker TEXT NOT NULL,
    content TEXT NOT NULL,
    source_start INTEGER NOT NULL,
    source_end INTEGER NOT NULL,
    embedding BLOB NOT NULL,
    indexed_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_items_owner_id ON items(owner_id);
"#;

/// SQLite-based vector index.
pub struct SqliteVectorIndex {
    conn: Mutex<Connection>,
}

impl SqliteVectorIndex {
    /// Create a new SQLite vector index at the given path.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // Enable WAL mode for better concurrent performance
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized SQLite vector index at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite vector index (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Serialize embedding to bytes.
    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    /// Deserialize embedding from bytes.
    fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| {
                let arr: [u8; 4] = chunk.try_into().unwrap_or_default();
                f32::from_le_bytes(arr)
            })
            .collect()
    }
}

#[async_trait]
impl VectorIndex for SqliteVectorIndex {
    #[instrument(skip(self, items))]
    async fn upsert(&self, items: &[IndexedItem]) -> Result<usize> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| SitatError::VectorIndex(format!("Failed to acquire lock: {}", e)))?;

        let tx = conn.unchecked_transaction()?;

        for item in items {
            let embedding_bytes = Self::embedding_to_bytes(&item.vector);

            tx.execute(
                r#"
                INSERT OR REPLACE INTO items
                (id, owner_id, line_index, speaker, content, source_start, source_end,
                 embedding, indexed_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
                params![
                    item.id.to_string(),
                    item.owner_id,
                    item.line_index as i64,
                    item.speaker,
                    item.text,
                    item.source_start as i64,
                    item.source_end as i64,
                    embedding_bytes,
                    item.indexed_at.to_rfc3339(),
                ],
            )?;
        }

        tx.commit()?;
        debug!("Upserted {} items", items.len());
        Ok(items.len())
    }

    #[instrument(skip(self, vector))]
    async fn search(
        &self,
        owner_id: &str,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchMatch>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| SitatError::VectorIndex(format!("Failed to acquire lock: {}", e)))?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, owner_id, line_index, speaker, content, source_start, source_end,
                   embedding, indexed_at
            FROM items WHERE owner_id = ?1
            "#,
        )?;

        let rows = stmt.query_map(params![owner_id], row_to_item)?;

        let mut matches: Vec<SearchMatch> = Vec::new();
        for row in rows {
            let item = row?;
            let score = cosine_similarity(vector, &item.vector);
            matches.push(SearchMatch { item, score });
        }

        matches.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        matches.truncate(limit);

        Ok(matches)
    }

    #[instrument(skip(self))]
    async fn delete(&self, owner_id: &str) -> Result<usize> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| SitatError::VectorIndex(format!("Failed to acquire lock: {}", e)))?;

        let removed = conn.execute("DELETE FROM items WHERE owner_id = ?1", params![owner_id])?;
        debug!("Deleted {} items for owner {}", removed, owner_id);
        Ok(removed)
    }

    async fn count(&self, owner_id: &str) -> Result<usize> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| SitatError::VectorIndex(format!("Failed to acquire lock: {}", e)))?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM items WHERE owner_id = ?1",
            params![owner_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

fn row_to_item(row: &rusqlite::Row<'_>) -> rusqlite::Result<IndexedItem> {
    let id: String = row.get(0)?;
    let embedding_bytes: Vec<u8> = row.get(7)?;
    let indexed_at: String = row.get(8)?;

    Ok(IndexedItem {
        id: Uuid::parse_str(&id).unwrap_or_else(|_| Uuid::new_v4()),
        owner_id: row.get(1)?,
        line_index: row.get::<_, i64>(2)? as usize,
        speaker: row.get(3)?,
        text: row.get(4)?,
        source_start: row.get::<_, i64>(5)? as usize,
        source_end: row.get::<_, i64>(6)? as usize,
        vector: SqliteVectorIndex::bytes_to_embedding(&embedding_bytes),
        indexed_at: DateTime::parse_from_rfc3339(&indexed_at)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::IndexedLine;

    fn line(index: usize, text: &str) -> IndexedLine {
        IndexedLine {
            index,
            speaker: "Bob".to_string(),
            text: text.to_string(),
            source_start: index * 20,
            source_end: index * 20 + text.len(),
        }
    }

    #[tokio::test]
    async fn round_trip_preserves_item_fields() {
        let index = SqliteVectorIndex::in_memory().unwrap();

        let item = IndexedItem::from_line("t1", &line(2, "Some answer."), vec![0.5, -0.25, 1.0]);
        index.upsert(std::slice::from_ref(&item)).await.unwrap();

        let matches = index.search("t1", &[0.5, -0.25, 1.0], 5).await.unwrap();
        assert_eq!(matches.len(), 1);

        let got = &matches[0].item;
        assert_eq!(got.id, item.id);
        assert_eq!(got.line_index, 2);
        assert_eq!(got.speaker, "Bob");
        assert_eq!(got.text, "Some answer.");
        assert_eq!((got.source_start, got.source_end), (40, 52));
        assert_eq!(got.vector, item.vector);
        assert!(matches[0].score > 0.99);
    }

    #[tokio::test]
    async fn delete_is_scoped_to_owner() {
        let index = SqliteVectorIndex::in_memory().unwrap();

        let items = vec![
            IndexedItem::from_line("t1", &line(0, "a"), vec![1.0]),
            IndexedItem::from_line("t2", &line(0, "b"), vec![1.0]),
        ];
        index.upsert(&items).await.unwrap();

        assert_eq!(index.delete("t1").await.unwrap(), 1);
        assert_eq!(index.count("t1").await.unwrap(), 0);
        assert_eq!(index.count("t2").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn on_disk_index_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vectors.db");

        {
            let index = SqliteVectorIndex::new(&path).unwrap();
            let item = IndexedItem::from_line("t1", &line(0, "persisted"), vec![1.0, 0.0]);
            index.upsert(&[item]).await.unwrap();
        }

        let reopened = SqliteVectorIndex::new(&path).unwrap();
        assert_eq!(reopened.count("t1").await.unwrap(), 1);
    }
}
