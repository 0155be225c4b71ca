//! Engine wiring for Sitat.
//!
//! Owns the collaborator handles (generation, embedding, vector index,
//! transcript store) and exposes the public operations: segmenting,
//! indexing, summarizing, rewriting, and query answering. Collaborators are
//! injected; `Engine::new` wires the OpenAI and SQLite defaults, while
//! `with_components` accepts arbitrary implementations for testing.

use crate::citation;
use crate::config::{Prompts, Settings};
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{Result, SitatError};
use crate::generation::{generate_with_backoff, Generator, OpenAIGenerator};
use crate::provenance::{self, CitationResult, CitationSegment, SourceSpan};
use crate::reduce::Reducer;
use crate::segment::{self, IndexedLine};
use crate::store::{StoredTranscript, TranscriptInfo, TranscriptStore, SqliteTranscriptStore};
use crate::vector_index::{IndexedItem, SqliteVectorIndex, VectorIndex};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument};

/// The main engine for citation-preserving transcript reduction.
pub struct Engine {
    settings: Settings,
    prompts: Prompts,
    generator: Arc<dyn Generator>,
    embedder: Arc<dyn Embedder>,
    vector_index: Arc<dyn VectorIndex>,
    transcript_store: Arc<dyn TranscriptStore>,
}

impl Engine {
    /// Create an engine with the default OpenAI and SQLite components.
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let generator: Arc<dyn Generator> = Arc::new(OpenAIGenerator::with_config(
            &settings.generation.model,
            settings.generation.temperature,
            settings.generation.prompt_cost_per_1k,
            settings.generation.completion_cost_per_1k,
        ));

        let embedder: Arc<dyn Embedder> = Arc::new(OpenAIEmbedder::with_config(
            &settings.embedding.model,
            settings.embedding.dimensions as usize,
            settings.embedding.max_batch_chars,
            settings.embedding.cost_per_1k,
        ));

        let db_path = settings.database_path();
        let vector_index: Arc<dyn VectorIndex> = Arc::new(SqliteVectorIndex::new(&db_path)?);
        let transcript_store: Arc<dyn TranscriptStore> =
            Arc::new(SqliteTranscriptStore::new(&db_path)?);

        Ok(Self {
            settings,
            prompts,
            generator,
            embedder,
            vector_index,
            transcript_store,
        })
    }

    /// Create an engine with custom components.
    pub fn with_components(
        settings: Settings,
        prompts: Prompts,
        generator: Arc<dyn Generator>,
        embedder: Arc<dyn Embedder>,
        vector_index: Arc<dyn VectorIndex>,
        transcript_store: Arc<dyn TranscriptStore>,
    ) -> Self {
        Self {
            settings,
            prompts,
            generator,
            embedder,
            vector_index,
            transcript_store,
        }
    }

    /// Get the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Segment raw transcript text into indexed lines.
    pub fn segment(&self, text: &str, min_line_size: usize) -> Vec<IndexedLine> {
        segment::segment(text, min_line_size)
    }

    /// Segment, persist, embed, and index a transcript.
    ///
    /// Replaces any previously indexed lines for the same id.
    #[instrument(skip(self, text), fields(id = %id))]
    pub async fn index_transcript(&self, id: &str, title: &str, text: &str) -> Result<IndexStats> {
        let lines = segment::segment(text, self.settings.segmentation.min_line_size);
        info!("Segmented '{}' into {} lines", title, lines.len());

        self.transcript_store
            .save(&StoredTranscript::new(id, title, text, lines.clone()))
            .await?;
        self.vector_index.delete(id).await?;

        if lines.is_empty() {
            return Ok(IndexStats {
                id: id.to_string(),
                title: title.to_string(),
                lines_indexed: 0,
                cost: 0.0,
            });
        }

        let texts: Vec<String> = lines.iter().map(|l| l.spoken()).collect();
        let batch = self.embedder.embed_batch(&texts).await?;
        if batch.vectors.len() != lines.len() {
            return Err(SitatError::Embedding(format!(
                "Expected {} embeddings, got {}",
                lines.len(),
                batch.vectors.len()
            )));
        }

        let items: Vec<IndexedItem> = lines
            .iter()
            .zip(batch.vectors)
            .map(|(line, vector)| IndexedItem::from_line(id, line, vector))
            .collect();

        let indexed = self.vector_index.upsert(&items).await?;

        Ok(IndexStats {
            id: id.to_string(),
            title: title.to_string(),
            lines_indexed: indexed,
            cost: batch.cost,
        })
    }

    /// Load a stored transcript.
    pub async fn load_transcript(&self, id: &str) -> Result<StoredTranscript> {
        self.transcript_store
            .get(id)
            .await?
            .ok_or_else(|| SitatError::TranscriptNotFound(id.to_string()))
    }

    /// Delete a transcript and its indexed lines. Returns whether it existed.
    pub async fn delete_transcript(&self, id: &str) -> Result<bool> {
        let existed = self.transcript_store.delete(id).await?;
        self.vector_index.delete(id).await?;
        Ok(existed)
    }

    /// List stored transcripts.
    pub async fn list_transcripts(&self) -> Result<Vec<TranscriptInfo>> {
        self.transcript_store.list().await
    }

    /// Hierarchically summarize indexed lines for one interviewee.
    ///
    /// Every output sentence cites the source spans that justify it.
    #[instrument(skip(self, lines), fields(lines = lines.len(), interviewee = %interviewee))]
    pub async fn summarize(
        &self,
        lines: &[IndexedLine],
        interviewee: &str,
    ) -> Result<CitationResult> {
        let template = self.prompts.summary.template.clone();
        self.reduce_with(&template, lines, interviewee).await
    }

    /// Produce a concise rewrite of indexed lines, citations preserved.
    #[instrument(skip(self, lines), fields(lines = lines.len(), interviewee = %interviewee))]
    pub async fn concise_rewrite(
        &self,
        lines: &[IndexedLine],
        interviewee: &str,
    ) -> Result<CitationResult> {
        let template = self.prompts.concise.template.clone();
        self.reduce_with(&template, lines, interviewee).await
    }

    async fn reduce_with(
        &self,
        template: &str,
        lines: &[IndexedLine],
        interviewee: &str,
    ) -> Result<CitationResult> {
        let mut vars = HashMap::new();
        vars.insert("interviewee".to_string(), interviewee.to_string());
        // {{lines}} stays for the reducer to fill per chunk.
        let template = self.prompts.render_with_custom(template, &vars);

        let reducer = Reducer::new(self.generator.clone(), self.settings.reducer_config());
        let reduction = reducer.reduce(lines, Some(interviewee), &template).await?;

        let output = provenance::resolve(&reduction.segments, lines)?;
        Ok(CitationResult {
            output,
            cost: reduction.cost,
        })
    }

    /// Answer a query over one transcript's indexed lines.
    ///
    /// Embeds the query, retrieves the nearest lines, and issues a single
    /// generation call; citations resolve through the matched items' stored
    /// source spans. No recursion is involved. An owner with no matches
    /// yields an empty result, not an error.
    #[instrument(skip(self), fields(owner_id = %owner_id, query = %query))]
    pub async fn answer_query(&self, owner_id: &str, query: &str) -> Result<CitationResult> {
        let embedding = self.embedder.embed(query).await?;
        let matches = self
            .vector_index
            .search(owner_id, &embedding.vector, self.settings.query.max_matches)
            .await?;

        if matches.is_empty() {
            info!("No indexed lines matched for owner {}", owner_id);
            return Ok(CitationResult {
                output: Vec::new(),
                cost: embedding.cost,
            });
        }

        let rendered: Vec<String> = matches
            .iter()
            .enumerate()
            .map(|(i, m)| format!("[{}] {}: {}", i, m.item.speaker, m.item.text))
            .collect();

        let mut vars = HashMap::new();
        vars.insert("query".to_string(), query.to_string());
        vars.insert("lines".to_string(), rendered.join("\n"));
        let prompt = self
            .prompts
            .render_with_custom(&self.prompts.query.template, &vars);

        let generation = generate_with_backoff(
            self.generator.as_ref(),
            &prompt,
            self.settings.generation.max_retries,
            Duration::from_millis(self.settings.generation.retry_base_delay_ms),
        )
        .await?;

        let output = citation::parse_annotated(&generation.text)
            .into_iter()
            .map(|segment| {
                let references = segment
                    .references
                    .iter()
                    .map(|&i| {
                        matches
                            .get(i)
                            .map(|m| SourceSpan {
                                start: m.item.source_start,
                                end: m.item.source_end,
                            })
                            .ok_or(SitatError::OutOfRangeReference { index: i, level: 0 })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(CitationSegment {
                    text: segment.text,
                    references,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(CitationResult {
            output,
            cost: embedding.cost + generation.cost,
        })
    }
}

/// Result of indexing a transcript.
#[derive(Debug)]
pub struct IndexStats {
    /// Transcript id.
    pub id: String,
    /// Title.
    pub title: String,
    /// Number of lines embedded and indexed.
    pub lines_indexed: usize,
    /// Embedding cost.
    pub cost: f64,
}
