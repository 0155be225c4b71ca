//! Budget-bounded chunking of indexed lines.
//!
//! Chunks are contiguous runs of lines sent together in one generation call.
//! A greedy loop accumulates line weights (whitespace-delimited word counts)
//! until the budget overflows, then cuts at a line boundary. The resulting
//! chunks always partition the input exactly: non-empty, contiguous, ordered,
//! no gaps, no overlaps.

use std::ops::Range;

/// Where chunk boundaries are allowed to fall.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundaryPolicy {
    /// Cut as soon as the budget overflows.
    Plain,
    /// Defer a budget-triggered cut while the next line begins the named
    /// interviewee's turn (case-insensitive `"<name>: "` prefix match), so
    /// no chunk opens mid-way through the interviewee's own turn. Used on
    /// the first reduction pass over real dialogue; later passes operate on
    /// synthetic text and use `Plain`.
    SpeakerTurn { interviewee: String },
}

/// Greedy chunker over one level's line sequence.
#[derive(Debug, Clone)]
pub struct BudgetedChunker {
    budget: usize,
    policy: BoundaryPolicy,
}

impl BudgetedChunker {
    /// Create a chunker with a word budget and a boundary policy.
    pub fn new(budget: usize, policy: BoundaryPolicy) -> Self {
        Self { budget, policy }
    }

    /// Chunk the given lines, returning index ranges into `lines`.
    ///
    /// The last line always forces a boundary regardless of size; empty
    /// input yields no chunks.
    pub fn chunk<S: AsRef<str>>(&self, lines: &[S]) -> Vec<Range<usize>> {
        let turn_prefix = match &self.policy {
            BoundaryPolicy::Plain => None,
            BoundaryPolicy::SpeakerTurn { interviewee } => {
                Some(format!("{}: ", interviewee.to_lowercase()))
            }
        };

        let mut chunks = Vec::new();
        let mut start = 0usize;
        let mut size = 0usize;

        for (i, line) in lines.iter().enumerate() {
            size += word_count(line.as_ref());
            let is_last = i + 1 == lines.len();

            let mut cut = is_last || size > self.budget;
            if cut && !is_last {
                if let Some(prefix) = &turn_prefix {
                    if lines[i + 1].as_ref().to_lowercase().starts_with(prefix) {
                        // Absorb the interviewee's continuing turn.
                        cut = false;
                    }
                }
            }

            if cut {
                chunks.push(start..i + 1);
                start = i + 1;
                size = 0;
            }
        }

        chunks
    }
}

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_partitions<S: AsRef<str>>(chunks: &[Range<usize>], lines: &[S]) {
        let mut next = 0usize;
        for chunk in chunks {
            assert!(!chunk.is_empty());
            assert_eq!(chunk.start, next);
            next = chunk.end;
        }
        assert_eq!(next, lines.len());
    }

    #[test]
    fn plain_policy_partitions_exactly() {
        let lines: Vec<String> = (0..10).map(|i| format!("speaker: line number {}", i)).collect();
        let chunker = BudgetedChunker::new(7, BoundaryPolicy::Plain);
        let chunks = chunker.chunk(&lines);

        assert!(chunks.len() > 1);
        assert_partitions(&chunks, &lines);
    }

    #[test]
    fn budget_overflow_triggers_cut_after_line() {
        // 4 words each; budget 7 means the second line overflows and cuts.
        let lines = vec!["a b c d", "e f g h", "i j k l"];
        let chunker = BudgetedChunker::new(7, BoundaryPolicy::Plain);
        let chunks = chunker.chunk(&lines);
        assert_eq!(chunks, vec![0..2, 2..3]);
    }

    #[test]
    fn last_line_always_closes_a_chunk() {
        let lines = vec!["one"];
        let chunker = BudgetedChunker::new(1000, BoundaryPolicy::Plain);
        assert_eq!(chunker.chunk(&lines), vec![0..1]);
    }

    #[test]
    fn empty_input_yields_no_chunks() {
        let chunker = BudgetedChunker::new(10, BoundaryPolicy::Plain);
        assert!(chunker.chunk::<&str>(&[]).is_empty());
    }

    #[test]
    fn speaker_turn_policy_absorbs_interviewee_turn() {
        let lines = vec![
            "Host: a b c d e f",
            "Guest: g h i j k l",
            "Guest: m n o p q r",
            "Host: s t u v w x",
        ];
        // Budget overflows on line 1, but line 2 continues the guest's turn,
        // so the cut is deferred until line 3 begins the host's turn.
        let chunker = BudgetedChunker::new(
            8,
            BoundaryPolicy::SpeakerTurn {
                interviewee: "guest".to_string(),
            },
        );
        let chunks = chunker.chunk(&lines);
        assert_eq!(chunks, vec![0..3, 3..4]);
        assert_partitions(&chunks, &lines);
    }

    #[test]
    fn speaker_turn_policy_matches_case_insensitively() {
        let lines = vec!["HOST: a b c d e f", "GUEST: g h", "HOST: i j"];
        let chunker = BudgetedChunker::new(
            5,
            BoundaryPolicy::SpeakerTurn {
                interviewee: "Guest".to_string(),
            },
        );
        assert_eq!(chunker.chunk(&lines), vec![0..2, 2..3]);
    }

    #[test]
    fn speaker_turn_policy_cuts_before_other_speaker() {
        let lines = vec!["Host: a b c d e f", "Host: g h", "Guest: i j"];
        let chunker = BudgetedChunker::new(
            5,
            BoundaryPolicy::SpeakerTurn {
                interviewee: "guest".to_string(),
            },
        );
        // Line 0 overflows and the next line is not the guest, so cut.
        assert_eq!(chunker.chunk(&lines), vec![0..1, 1..3]);
    }

    #[test]
    fn oversized_single_line_is_its_own_chunk() {
        let lines = vec!["a b c d e f g h i j", "k l"];
        let chunker = BudgetedChunker::new(3, BoundaryPolicy::Plain);
        assert_eq!(chunker.chunk(&lines), vec![0..1, 1..2]);
    }
}
