//! In-memory transcript store implementation.

use super::{StoredTranscript, TranscriptInfo, TranscriptStore};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory transcript store, for tests and ephemeral runs.
pub struct MemoryTranscriptStore {
    transcripts: RwLock<HashMap<String, StoredTranscript>>,
}

impl MemoryTranscriptStore {
    pub fn new() -> Self {
        Self {
            transcripts: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryTranscriptStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TranscriptStore for MemoryTranscriptStore {
    async fn get(&self, id: &str) -> Result<Option<StoredTranscript>> {
        let transcripts = self.transcripts.read().unwrap();
        Ok(transcripts.get(id).cloned())
    }

    async fn save(&self, transcript: &StoredTranscript) -> Result<()> {
        let mut transcripts = self.transcripts.write().unwrap();
        transcripts.insert(transcript.id.clone(), transcript.clone());
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let mut transcripts = self.transcripts.write().unwrap();
        Ok(transcripts.remove(id).is_some())
    }

    async fn list(&self) -> Result<Vec<TranscriptInfo>> {
        let transcripts = self.transcripts.read().unwrap();
        let mut infos: Vec<TranscriptInfo> = transcripts
            .values()
            .map(|t| TranscriptInfo {
                id: t.id.clone(),
                title: t.title.clone(),
                line_count: t.lines.len(),
                saved_at: t.saved_at,
            })
            .collect();
        infos.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
        Ok(infos)
    }
}
