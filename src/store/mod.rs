//! Transcript persistence abstraction.
//!
//! Segmented transcripts are saved so summaries and rewrites can run later
//! without re-segmenting, and so resolved spans keep pointing at the exact
//! raw text they were computed from.

mod memory;
mod sqlite;

pub use memory::MemoryTranscriptStore;
pub use sqlite::SqliteTranscriptStore;

use crate::error::Result;
use crate::segment::IndexedLine;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored transcript: the raw text plus its segmentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredTranscript {
    /// Transcript id (also the vector index owner id).
    pub id: String,
    /// Human-readable title.
    pub title: String,
    /// The raw source text spans resolve into.
    pub raw_text: String,
    /// Segmented lines, in index order.
    pub lines: Vec<IndexedLine>,
    /// When the transcript was saved.
    pub saved_at: DateTime<Utc>,
}

impl StoredTranscript {
    pub fn new(id: &str, title: &str, raw_text: &str, lines: Vec<IndexedLine>) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            raw_text: raw_text.to_string(),
            lines,
            saved_at: Utc::now(),
        }
    }
}

/// Summary row for listings.
#[derive(Debug, Clone)]
pub struct TranscriptInfo {
    pub id: String,
    pub title: String,
    pub line_count: usize,
    pub saved_at: DateTime<Utc>,
}

/// Trait for transcript store implementations.
#[async_trait]
pub trait TranscriptStore: Send + Sync {
    /// Fetch a transcript by id.
    async fn get(&self, id: &str) -> Result<Option<StoredTranscript>>;

    /// Save a transcript, replacing any existing one with the same id.
    async fn save(&self, transcript: &StoredTranscript) -> Result<()>;

    /// Delete a transcript. Returns whether it existed.
    async fn delete(&self, id: &str) -> Result<bool>;

    /// List stored transcripts, newest first.
    async fn list(&self) -> Result<Vec<TranscriptInfo>>;
}
