//! In-memory vector index implementation.
//!
//! Useful for testing and small datasets.

use super::{cosine_similarity, IndexedItem, SearchMatch, VectorIndex};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory vector index.
pub struct MemoryVectorIndex {
    items: RwLock<HashMap<String, IndexedItem>>,
}

impl MemoryVectorIndex {
    /// Create a new in-memory vector index.
    pub fn new() -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryVectorIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorIndex for MemoryVectorIndex {
    async fn upsert(&self, items: &[IndexedItem]) -> Result<usize> {
        let mut store = self.items.write().unwrap();
        for item in items {
            store.insert(item.id.to_string(), item.clone());
        }
        Ok(items.len())
    }

    async fn search(
        &self,
        owner_id: &str,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchMatch>> {
        let items = self.items.read().unwrap();

        let mut matches: Vec<SearchMatch> = items
            .values()
            .filter(|item| item.owner_id == owner_id)
            .map(|item| SearchMatch {
                item: item.clone(),
                score: cosine_similarity(vector, &item.vector),
            })
            .collect();

        matches.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        matches.truncate(limit);

        Ok(matches)
    }

    async fn delete(&self, owner_id: &str) -> Result<usize> {
        let mut items = self.items.write().unwrap();
        let initial_len = items.len();
        items.retain(|_, item| item.owner_id != owner_id);
        Ok(initial_len - items.len())
    }

    async fn count(&self, owner_id: &str) -> Result<usize> {
        let items = self.items.read().unwrap();
        Ok(items.values().filter(|i| i.owner_id == owner_id).count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::IndexedLine;

    fn line(index: usize, text: &str) -> IndexedLine {
        IndexedLine {
            index,
            speaker: "Alice".to_string(),
            text: text.to_string(),
            source_start: index * 10,
            source_end: index * 10 + text.len(),
        }
    }

    #[tokio::test]
    async fn upsert_search_delete_round_trip() {
        let index = MemoryVectorIndex::new();

        let items = vec![
            IndexedItem::from_line("t1", &line(0, "Hello world"), vec![1.0, 0.0, 0.0]),
            IndexedItem::from_line("t1", &line(1, "Goodbye world"), vec![0.0, 1.0, 0.0]),
            IndexedItem::from_line("t2", &line(0, "Other owner"), vec![1.0, 0.0, 0.0]),
        ];
        index.upsert(&items).await.unwrap();

        assert_eq!(index.count("t1").await.unwrap(), 2);

        let matches = index.search("t1", &[1.0, 0.0, 0.0], 10).await.unwrap();
        assert_eq!(matches.len(), 2);
        assert!(matches[0].score > matches[1].score);
        assert_eq!(matches[0].item.text, "Hello world");
        // Search never leaks another owner's items.
        assert!(matches.iter().all(|m| m.item.owner_id == "t1"));

        assert_eq!(index.delete("t1").await.unwrap(), 2);
        assert_eq!(index.count("t1").await.unwrap(), 0);
        assert_eq!(index.count("t2").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn search_respects_limit() {
        let index = MemoryVectorIndex::new();
        let items: Vec<IndexedItem> = (0..5)
            .map(|i| IndexedItem::from_line("t1", &line(i, "text"), vec![1.0, i as f32]))
            .collect();
        index.upsert(&items).await.unwrap();

        let matches = index.search("t1", &[1.0, 0.0], 2).await.unwrap();
        assert_eq!(matches.len(), 2);
    }
}
