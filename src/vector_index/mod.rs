//! Vector index abstraction for semantic line search.
//!
//! Provides a trait-based interface over different backends. Items are
//! embedded transcript lines owned by a transcript id; searches are always
//! scoped to one owner so citations can resolve against that transcript's
//! source spans.

mod memory;
mod sqlite;

pub use memory::MemoryVectorIndex;
pub use sqlite::SqliteVectorIndex;

use crate::error::Result;
use crate::segment::IndexedLine;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An embedded transcript line stored in the index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedItem {
    /// Unique item ID.
    pub id: Uuid,
    /// Transcript id this item belongs to.
    pub owner_id: String,
    /// Position of the line within its segmentation.
    pub line_index: usize,
    /// Speaker of the line.
    pub speaker: String,
    /// Line text.
    pub text: String,
    /// Start byte offset in the source transcript.
    pub source_start: usize,
    /// End byte offset (exclusive) in the source transcript.
    pub source_end: usize,
    /// Embedding vector.
    pub vector: Vec<f32>,
    /// When this item was indexed.
    pub indexed_at: DateTime<Utc>,
}

impl IndexedItem {
    /// Create an item from a segmented line and its embedding.
    pub fn from_line(owner_id: &str, line: &IndexedLine, vector: Vec<f32>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id: owner_id.to_string(),
            line_index: line.index,
            speaker: line.speaker.clone(),
            text: line.text.clone(),
            source_start: line.source_start,
            source_end: line.source_end,
            vector,
            indexed_at: Utc::now(),
        }
    }
}

/// A search result with score.
#[derive(Debug, Clone)]
pub struct SearchMatch {
    /// The matched item.
    pub item: IndexedItem,
    /// Similarity score (higher is better).
    pub score: f32,
}

/// Trait for vector index implementations.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Store items with their embeddings, replacing any with the same id.
    async fn upsert(&self, items: &[IndexedItem]) -> Result<usize>;

    /// Search one owner's items for the nearest vectors.
    async fn search(
        &self,
        owner_id: &str,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchMatch>>;

    /// Delete all items belonging to an owner. Returns the number removed.
    async fn delete(&self, owner_id: &str) -> Result<usize>;

    /// Number of items for one owner.
    async fn count(&self, owner_id: &str) -> Result<usize>;
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}
