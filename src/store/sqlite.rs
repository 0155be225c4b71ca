//! SQLite-based transcript store implementation.

use super::{StoredTranscript, TranscriptInfo, TranscriptStore};
use crate::error::{Result, SitatError};
use crate::segment::IndexedLine;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS transcripts (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    raw_text TEXT NOT NULL,
    lines_json TEXT NOT NULL,
    saved_at TEXT NOT NULL
);
"#;

/// SQLite-based transcript store.
pub struct SqliteTranscriptStore {
    conn: Mutex<Connection>,
}

impl SqliteTranscriptStore {
    /// Open (or create) a transcript store at the given path.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized SQLite transcript store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory transcript store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| SitatError::TranscriptStore(format!("Failed to acquire lock: {}", e)))
    }
}

#[async_trait]
impl TranscriptStore for SqliteTranscriptStore {
    #[instrument(skip(self))]
    async fn get(&self, id: &str) -> Result<Option<StoredTranscript>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            "SELECT id, title, raw_text, lines_json, saved_at FROM transcripts WHERE id = ?1",
        )?;

        let mut rows = stmt.query(params![id])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };

        let lines_json: String = row.get(3)?;
        let saved_at: String = row.get(4)?;
        let lines: Vec<IndexedLine> = serde_json::from_str(&lines_json)?;

        Ok(Some(StoredTranscript {
            id: row.get(0)?,
            title: row.get(1)?,
            raw_text: row.get(2)?,
            lines,
            saved_at: DateTime::parse_from_rfc3339(&saved_at)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        }))
    }

    #[instrument(skip(self, transcript), fields(id = %transcript.id))]
    async fn save(&self, transcript: &StoredTranscript) -> Result<()> {
        let conn = self.lock()?;
        let lines_json = serde_json::to_string(&transcript.lines)?;

        conn.execute(
            r#"
            INSERT OR REPLACE INTO transcripts (id, title, raw_text, lines_json, saved_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                transcript.id,
                transcript.title,
                transcript.raw_text,
                lines_json,
                transcript.saved_at.to_rfc3339(),
            ],
        )?;

        debug!("Saved transcript {} ({} lines)", transcript.id, transcript.lines.len());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> Result<bool> {
        let conn = self.lock()?;
        let removed = conn.execute("DELETE FROM transcripts WHERE id = ?1", params![id])?;
        Ok(removed > 0)
    }

    async fn list(&self) -> Result<Vec<TranscriptInfo>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            "SELECT id, title, lines_json, saved_at FROM transcripts ORDER BY saved_at DESC",
        )?;

        let rows = stmt.query_map([], |row| {
            let lines_json: String = row.get(2)?;
            let saved_at: String = row.get(3)?;
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                lines_json,
                saved_at,
            ))
        })?;

        let mut infos = Vec::new();
        for row in rows {
            let (id, title, lines_json, saved_at) = row?;
            let lines: Vec<IndexedLine> = serde_json::from_str(&lines_json)?;
            infos.push(TranscriptInfo {
                id,
                title,
                line_count: lines.len(),
                saved_at: DateTime::parse_from_rfc3339(&saved_at)
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(|_| Utc::now()),
            });
        }

        Ok(infos)
    }
}
