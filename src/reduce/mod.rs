//! Hierarchical reduction: the core citation-preserving algorithm.
//!
//! A reduction pass chunks the working lines, issues one generation call per
//! chunk, and parses each response into annotated segments. If the result is
//! still too long it becomes the next pass's input: each segment is
//! re-indexed as a synthetic line whose provenance is the set of level-0
//! indices it summarizes, composed by set union at every step. When the
//! recursion terminates, the final segments cite level-0 indices directly.
//!
//! Chunk calls within one level are independent and run concurrently with a
//! bounded worker cap; results are flattened in chunk order, never in
//! completion order. Levels are strictly sequential.

use crate::chunking::{BoundaryPolicy, BudgetedChunker};
use crate::citation::{self, AnnotatedSegment};
use crate::config::Prompts;
use crate::error::{Result, SitatError};
use crate::generation::{generate_with_backoff, Generation, Generator};
use crate::segment::IndexedLine;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Tuning knobs for a reduction.
#[derive(Debug, Clone)]
pub struct ReducerConfig {
    /// Word budget per chunk (one generation call).
    pub chunk_budget_words: usize,
    /// Word-count ceiling under which a level's output is final.
    pub max_final_words: usize,
    /// Hard cap on recursion depth; exceeding it is an error rather than an
    /// unbounded loop against a generation service that refuses to shrink.
    pub max_levels: usize,
    /// Concurrent generation calls within one level.
    pub max_concurrent: usize,
    /// Retries per generation call on timeout.
    pub max_retries: u32,
    /// Initial backoff delay; doubles per retry.
    pub retry_base_delay: Duration,
}

impl Default for ReducerConfig {
    fn default() -> Self {
        Self {
            chunk_budget_words: 1200,
            max_final_words: 400,
            max_levels: 8,
            max_concurrent: 4,
            max_retries: 3,
            retry_base_delay: Duration::from_millis(500),
        }
    }
}

/// Final output of a reduction: segments whose references are level-0
/// indices, the summed cost of every generation call, and how many levels
/// the recursion took.
#[derive(Debug, Clone)]
pub struct Reduction {
    pub segments: Vec<AnnotatedSegment>,
    pub cost: f64,
    pub levels: usize,
}

/// One line of the current working level.
///
/// `label` is what the generation service sees in `"[label] text"` form and
/// what its citations refer to; `provenance` is the composed set of level-0
/// indices behind the line.
struct WorkingLine {
    label: usize,
    text: String,
    provenance: BTreeSet<usize>,
}

/// Citation-preserving hierarchical reducer.
pub struct Reducer {
    generator: Arc<dyn Generator>,
    config: ReducerConfig,
}

impl Reducer {
    pub fn new(generator: Arc<dyn Generator>, config: ReducerConfig) -> Self {
        Self { generator, config }
    }

    /// Reduce indexed lines to a short annotated-segment list.
    ///
    /// `prompt_template` must contain a `{{lines}}` placeholder; any other
    /// variables are expected to be rendered already. When `interviewee` is
    /// given, the first pass chunks with the speaker-turn policy so no chunk
    /// opens inside the interviewee's own turn; later passes operate on
    /// synthetic text and always chunk plainly.
    #[instrument(skip_all, fields(lines = lines.len()))]
    pub async fn reduce(
        &self,
        lines: &[IndexedLine],
        interviewee: Option<&str>,
        prompt_template: &str,
    ) -> Result<Reduction> {
        if lines.is_empty() {
            return Ok(Reduction {
                segments: Vec::new(),
                cost: 0.0,
                levels: 0,
            });
        }

        let mut working: Vec<WorkingLine> = lines
            .iter()
            .map(|line| WorkingLine {
                label: line.index,
                text: line.spoken(),
                provenance: BTreeSet::from([line.index]),
            })
            .collect();

        let mut total_cost = 0.0;
        let mut level = 0usize;

        loop {
            level += 1;
            if level > self.config.max_levels {
                return Err(SitatError::Generation(format!(
                    "Reduction did not converge after {} levels",
                    self.config.max_levels
                )));
            }

            let policy = match (level, interviewee) {
                (1, Some(name)) => BoundaryPolicy::SpeakerTurn {
                    interviewee: name.to_string(),
                },
                _ => BoundaryPolicy::Plain,
            };
            let chunker = BudgetedChunker::new(self.config.chunk_budget_words, policy);

            let texts: Vec<&str> = working.iter().map(|w| w.text.as_str()).collect();
            let ranges = chunker.chunk(&texts);
            let chunk_count = ranges.len();
            debug!("Level {}: {} lines in {} chunks", level, working.len(), chunk_count);

            let prompts: Vec<String> = ranges
                .iter()
                .map(|range| {
                    let rendered: Vec<String> = working[range.clone()]
                        .iter()
                        .map(|w| format!("[{}] {}", w.label, w.text))
                        .collect();
                    let mut vars = HashMap::new();
                    vars.insert("lines".to_string(), rendered.join("\n"));
                    Prompts::render(prompt_template, &vars)
                })
                .collect();

            // `buffered` preserves input order regardless of completion
            // order, and dropping the stream on the first error aborts the
            // level's remaining in-flight calls.
            let results: Vec<Generation> = stream::iter(prompts.iter().map(|prompt| {
                generate_with_backoff(
                    self.generator.as_ref(),
                    prompt,
                    self.config.max_retries,
                    self.config.retry_base_delay,
                )
            }))
            .buffered(self.config.max_concurrent.max(1))
            .try_collect()
            .await?;

            total_cost += results.iter().map(|g| g.cost).sum::<f64>();

            let segments = compose_level(&working, &results, level)?;

            let flattened_words: usize = segments
                .iter()
                .map(|s| s.text.split_whitespace().count())
                .sum();

            if chunk_count == 1 || flattened_words <= self.config.max_final_words {
                info!(
                    "Reduction finished at level {} with {} segments (${:.4})",
                    level,
                    segments.len(),
                    total_cost
                );
                return Ok(Reduction {
                    segments,
                    cost: total_cost,
                    levels: level,
                });
            }

            working = segments
                .into_iter()
                .enumerate()
                .map(|(position, segment)| WorkingLine {
                    label: position,
                    text: segment.text,
                    provenance: segment.references,
                })
                .collect();
        }
    }
}

/// Parse every chunk's generation output and compose provenance down to
/// level-0 indices.
///
/// Segment order follows chunk order, then parser output order within a
/// chunk. A citation of a label that does not exist at this level is an
/// `OutOfRangeReference` error.
fn compose_level(
    working: &[WorkingLine],
    results: &[Generation],
    level: usize,
) -> Result<Vec<AnnotatedSegment>> {
    let by_label: HashMap<usize, &BTreeSet<usize>> =
        working.iter().map(|w| (w.label, &w.provenance)).collect();

    let mut segments = Vec::new();
    for generation in results {
        for parsed in citation::parse_annotated(&generation.text) {
            let mut composed = BTreeSet::new();
            for &reference in &parsed.references {
                let provenance = by_label
                    .get(&reference)
                    .ok_or(SitatError::OutOfRangeReference {
                        index: reference,
                        level,
                    })?;
                composed.extend(provenance.iter().copied());
            }
            segments.push(AnnotatedSegment::new(parsed.text, composed));
        }
    }

    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::Generator;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Returns scripted responses in call order.
    struct ScriptedGenerator {
        responses: Mutex<VecDeque<String>>,
    }

    impl ScriptedGenerator {
        fn new(responses: &[&str]) -> Self {
            Self {
                responses: Mutex::new(responses.iter().map(|s| s.to_string()).collect()),
            }
        }
    }

    #[async_trait]
    impl Generator for ScriptedGenerator {
        async fn generate(&self, _prompt: &str) -> Result<Generation> {
            let text = self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| SitatError::Generation("script exhausted".to_string()))?;
            Ok(Generation { text, cost: 0.5 })
        }
    }

    fn lines(texts: &[&str]) -> Vec<IndexedLine> {
        let mut offset = 0;
        texts
            .iter()
            .enumerate()
            .map(|(index, text)| {
                let start = offset;
                offset += text.len() + 1;
                IndexedLine {
                    index,
                    speaker: "Speaker".to_string(),
                    text: text.to_string(),
                    source_start: start,
                    source_end: start + text.len(),
                }
            })
            .collect()
    }

    fn config(budget: usize, max_final_words: usize) -> ReducerConfig {
        ReducerConfig {
            chunk_budget_words: budget,
            max_final_words,
            max_levels: 8,
            // Sequential so scripted responses land on chunks in order.
            max_concurrent: 1,
            max_retries: 0,
            retry_base_delay: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn single_chunk_input_terminates_after_one_level() {
        let generator = Arc::new(ScriptedGenerator::new(&[
            "Some text (0). Some other text (1)",
        ]));
        let reducer = Reducer::new(generator, config(1000, 0));

        let input = lines(&["Hello there.", "Fine, thanks."]);
        let reduction = reducer.reduce(&input, None, "{{lines}}").await.unwrap();

        assert_eq!(reduction.levels, 1);
        assert_eq!(reduction.cost, 0.5);
        assert_eq!(reduction.segments.len(), 2);
        assert_eq!(reduction.segments[0].references, BTreeSet::from([0]));
        assert_eq!(reduction.segments[1].references, BTreeSet::from([1]));
    }

    #[tokio::test]
    async fn provenance_composes_across_levels() {
        // Five 3-word lines with a budget of 8 split into two chunks at
        // level 1; the two resulting segments fit one chunk at level 2.
        let input = lines(&[
            "alpha beta gamma",
            "delta epsilon zeta",
            "eta theta iota",
            "kappa lambda mu",
            "nu xi omicron",
        ]);
        let generator = Arc::new(ScriptedGenerator::new(&[
            "First summary (0,1)",
            "Second summary (3-4)",
            "Final digest (0,1)",
        ]));
        // max_final_words 0 forces recursion until a single-chunk level.
        let reducer = Reducer::new(generator, config(8, 0));

        let reduction = reducer.reduce(&input, None, "{{lines}}").await.unwrap();

        assert_eq!(reduction.levels, 2);
        assert_eq!(reduction.segments.len(), 1);
        assert_eq!(reduction.segments[0].text, "Final digest");
        // Union of level-1 segment 0 ({0,1}) and segment 1 ({3,4}).
        assert_eq!(
            reduction.segments[0].references,
            BTreeSet::from([0, 1, 3, 4])
        );
        assert!((reduction.cost - 1.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn word_ceiling_terminates_without_single_chunk() {
        let input = lines(&[
            "alpha beta gamma",
            "delta epsilon zeta",
            "eta theta iota",
            "kappa lambda mu",
            "nu xi omicron",
        ]);
        let generator = Arc::new(ScriptedGenerator::new(&["Short (0)", "Tiny (3)"]));
        // Two chunks at level 1, but four flattened words fit the ceiling.
        let reducer = Reducer::new(generator, config(8, 10));

        let reduction = reducer.reduce(&input, None, "{{lines}}").await.unwrap();
        assert_eq!(reduction.levels, 1);
        assert_eq!(reduction.segments.len(), 2);
    }

    #[tokio::test]
    async fn out_of_range_reference_fails_the_reduction() {
        let generator = Arc::new(ScriptedGenerator::new(&["Fabricated (9)"]));
        let reducer = Reducer::new(generator, config(1000, 0));

        let err = reducer
            .reduce(&lines(&["Only line."]), None, "{{lines}}")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SitatError::OutOfRangeReference { index: 9, level: 1 }
        ));
    }

    #[tokio::test]
    async fn failed_chunk_fails_the_whole_reduction() {
        // Script provides only the first chunk's response; the second call
        // fails, so no partial result survives.
        let input = lines(&[
            "alpha beta gamma",
            "delta epsilon zeta",
            "eta theta iota",
            "kappa lambda mu",
            "nu xi omicron",
        ]);
        let generator = Arc::new(ScriptedGenerator::new(&["Only one (0)"]));
        let reducer = Reducer::new(generator, config(8, 0));

        assert!(reducer.reduce(&input, None, "{{lines}}").await.is_err());
    }

    #[tokio::test]
    async fn empty_input_makes_no_calls() {
        let generator = Arc::new(ScriptedGenerator::new(&[]));
        let reducer = Reducer::new(generator, ReducerConfig::default());

        let reduction = reducer.reduce(&[], None, "{{lines}}").await.unwrap();
        assert_eq!(reduction.levels, 0);
        assert!(reduction.segments.is_empty());
        assert_eq!(reduction.cost, 0.0);
    }

    #[tokio::test]
    async fn uncited_segments_survive_with_empty_provenance() {
        let generator = Arc::new(ScriptedGenerator::new(&["Claim (0). Boilerplate outro."]));
        let reducer = Reducer::new(generator, config(1000, 0));

        let reduction = reducer
            .reduce(&lines(&["Hello."]), None, "{{lines}}")
            .await
            .unwrap();
        assert_eq!(reduction.segments.len(), 2);
        assert!(reduction.segments[1].references.is_empty());
    }
}
