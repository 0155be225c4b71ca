//! OpenAI embeddings implementation.

use super::{Embedder, Embedding, EmbeddingBatch};
use crate::batching;
use crate::error::{Result, SitatError};
use crate::openai::create_client;
use async_openai::types::{CreateEmbeddingRequestArgs, EmbeddingInput};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// OpenAI-based embedder.
pub struct OpenAIEmbedder {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    dimensions: usize,
    /// Maximum total characters per embedding request payload.
    max_batch_chars: usize,
    cost_per_1k: f64,
}

impl OpenAIEmbedder {
    /// Create a new OpenAI embedder with default settings.
    pub fn new() -> Self {
        Self::with_config("text-embedding-3-small", 1536, 100_000, 0.00002)
    }

    /// Create a new OpenAI embedder with custom model and limits.
    pub fn with_config(
        model: &str,
        dimensions: usize,
        max_batch_chars: usize,
        cost_per_1k: f64,
    ) -> Self {
        Self {
            client: create_client(),
            model: model.to_string(),
            dimensions,
            max_batch_chars,
            cost_per_1k,
        }
    }
}

impl Default for OpenAIEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    #[instrument(skip(self, text))]
    async fn embed(&self, text: &str) -> Result<Embedding> {
        let batch = self.embed_batch(&[text.to_string()]).await?;
        let vector = batch
            .vectors
            .into_iter()
            .next()
            .ok_or_else(|| SitatError::Embedding("Empty embedding response".to_string()))?;
        Ok(Embedding {
            vector,
            cost: batch.cost,
        })
    }

    #[instrument(skip(self, texts), fields(count = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> Result<EmbeddingBatch> {
        if texts.is_empty() {
            return Ok(EmbeddingBatch {
                vectors: Vec::new(),
                cost: 0.0,
            });
        }

        debug!("Generating embeddings for {} texts", texts.len());

        let mut all_vectors = Vec::with_capacity(texts.len());
        let mut total_cost = 0.0;

        // The API bounds request payload size; pack texts into batches that
        // stay within it without splitting or reordering any item.
        for batch in batching::pack(texts, self.max_batch_chars) {
            let request = CreateEmbeddingRequestArgs::default()
                .model(&self.model)
                .input(EmbeddingInput::StringArray(batch))
                .dimensions(self.dimensions as u32)
                .build()
                .map_err(|e| SitatError::Embedding(format!("Failed to build request: {}", e)))?;

            let response = self
                .client
                .embeddings()
                .create(request)
                .await
                .map_err(|e| SitatError::OpenAI(format!("Embedding API error: {}", e)))?;

            total_cost += response.usage.prompt_tokens as f64 / 1000.0 * self.cost_per_1k;

            // Sort by index to ensure correct order
            let mut embeddings: Vec<_> = response.data.into_iter().collect();
            embeddings.sort_by_key(|e| e.index);

            for embedding_data in embeddings {
                all_vectors.push(embedding_data.embedding);
            }
        }

        debug!("Generated {} embeddings", all_vectors.len());
        Ok(EmbeddingBatch {
            vectors: all_vectors,
            cost: total_cost,
        })
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
