//! Speaker segmentation: raw transcript text into addressable indexed lines.
//!
//! A transcript arrives as paragraphs of the form `"<speaker>: <utterance>"`.
//! Segmentation splits each utterance into lines of at least a minimum size,
//! cut at sentence boundaries, and records for every line the exact character
//! span it occupies in the original text. Those spans are what citations
//! ultimately resolve to, so they must be located against the source verbatim.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// One addressable unit of transcript text.
///
/// Indices are 0-based and contiguous over emitted lines; spans are
/// non-overlapping byte offsets, strictly increasing in index order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedLine {
    /// Stable position within one segmentation.
    pub index: usize,
    /// Speaker name (may be empty if the paragraph had no `": "` separator).
    pub speaker: String,
    /// Utterance text, an exact substring of the source document.
    pub text: String,
    /// Start byte offset of `text` in the source document.
    pub source_start: usize,
    /// End byte offset (exclusive) of `text` in the source document.
    pub source_end: usize,
}

impl IndexedLine {
    /// Render the line the way it is presented to the generation service.
    pub fn render(&self) -> String {
        format!("[{}] {}: {}", self.index, self.speaker, self.text)
    }

    /// The line prefixed with its speaker, without the index marker.
    pub fn spoken(&self) -> String {
        format!("{}: {}", self.speaker, self.text)
    }
}

/// Word-or-punctuation fragments; terminators stand alone so sentence
/// boundaries can be detected on the last fragment.
fn fragment_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\w'-]+|[^\w\s]").expect("valid fragment regex"))
}

/// Split raw transcript text into an ordered `IndexedLine` sequence.
///
/// Paragraphs are separated by newlines; each splits once on the first
/// `": "` into speaker and utterance. Fragments of the utterance accumulate
/// into a line until the accumulated length reaches `min_line_size`
/// characters *and* the last fragment is a sentence terminator (`.`, `?`,
/// `!`), or the paragraph is exhausted. Empty paragraphs, empty utterances,
/// and whitespace-only groups are skipped; indices stay contiguous over
/// emitted lines only.
pub fn segment(text: &str, min_line_size: usize) -> Vec<IndexedLine> {
    let mut lines: Vec<IndexedLine> = Vec::new();
    // Running byte cursor into `text`. Spans are located by searching forward
    // from here, never backward, so repeated utterances resolve to distinct
    // occurrences.
    let mut cursor = 0usize;

    for paragraph in text.split('\n') {
        if paragraph.trim().is_empty() {
            continue;
        }

        // Split on the raw paragraph so the `": "` separator survives even
        // when the utterance itself is blank.
        let (speaker, utterance) = match paragraph.split_once(": ") {
            Some((s, u)) => (s.trim(), u),
            None => ("", paragraph),
        };
        if utterance.trim().is_empty() {
            continue;
        }

        for group in accumulate_groups(utterance, min_line_size) {
            if group.trim().is_empty() {
                continue;
            }
            let Some(found) = text[cursor..].find(group) else {
                // A group is always a verbatim slice of its paragraph, which
                // lies at or after the cursor; not finding it means the input
                // mutated under us, so skip rather than emit a bogus span.
                continue;
            };
            let start = cursor + found;
            let end = start + group.len();
            cursor = end;

            lines.push(IndexedLine {
                index: lines.len(),
                speaker: speaker.to_string(),
                text: group.to_string(),
                source_start: start,
                source_end: end,
            });
        }
    }

    lines
}

/// Accumulate word/punctuation fragments of an utterance into groups.
///
/// Each returned group is an exact substring of `utterance` running from its
/// first fragment to its last, so intermediate whitespace is preserved as it
/// appears in the source.
fn accumulate_groups(utterance: &str, min_size: usize) -> Vec<&str> {
    let re = fragment_regex();
    let mut groups = Vec::new();
    let mut group_start: Option<usize> = None;
    let mut last_end = 0usize;

    for frag in re.find_iter(utterance) {
        let start = *group_start.get_or_insert(frag.start());
        last_end = frag.end();

        let is_terminator = matches!(frag.as_str(), "." | "?" | "!");
        if is_terminator && utterance[start..last_end].chars().count() >= min_size {
            groups.push(&utterance[start..last_end]);
            group_start = None;
        }
    }

    if let Some(start) = group_start {
        groups.push(&utterance[start..last_end]);
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRANSCRIPT: &str = "\
Alice: Hello there. How have you been lately?
Bob: Quite well. I started a new job last month.

Alice: That sounds exciting.
Bob: It is! The team is great.
Alice: Tell me more about it.
Bob: We build tools for transcript analysis.";

    #[test]
    fn segments_two_speaker_transcript() {
        let lines = segment(TRANSCRIPT, 2);
        assert!(!lines.is_empty());

        for (i, line) in lines.iter().enumerate() {
            assert_eq!(line.index, i);
            // Every span slices the original back out verbatim.
            assert_eq!(&TRANSCRIPT[line.source_start..line.source_end], line.text);
        }

        assert_eq!(lines[0].speaker, "Alice");
        assert_eq!(lines[0].text, "Hello there.");
    }

    #[test]
    fn spans_are_strictly_increasing() {
        let lines = segment(TRANSCRIPT, 2);
        for pair in lines.windows(2) {
            assert!(pair[0].source_end <= pair[1].source_start);
            assert!(pair[0].source_start < pair[0].source_end);
        }
    }

    #[test]
    fn segmentation_is_idempotent() {
        let first = segment(TRANSCRIPT, 2);
        let second = segment(TRANSCRIPT, 2);
        assert_eq!(first, second);
    }

    #[test]
    fn large_threshold_keeps_paragraph_together() {
        let lines = segment("Alice: One. Two. Three.", 1000);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "One. Two. Three.");
    }

    #[test]
    fn small_threshold_cuts_at_sentence_boundaries() {
        let lines = segment("Alice: One. Two. Three.", 2);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].text, "One.");
        assert_eq!(lines[1].text, "Two.");
        assert_eq!(lines[2].text, "Three.");
    }

    #[test]
    fn repeated_utterances_get_distinct_spans() {
        let text = "Alice: Yes.\nBob: Yes.";
        let lines = segment(text, 1);
        assert_eq!(lines.len(), 2);
        assert_ne!(lines[0].source_start, lines[1].source_start);
        assert_eq!(&text[lines[1].source_start..lines[1].source_end], "Yes.");
        assert!(lines[1].source_start > lines[0].source_end);
    }

    #[test]
    fn empty_and_blank_paragraphs_are_skipped() {
        assert!(segment("", 2).is_empty());
        assert!(segment("\n\n   \n", 2).is_empty());
        let lines = segment("\n\nAlice: Hi.\n\n", 1);
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn empty_utterance_produces_no_line() {
        assert!(segment("Alice:   ", 2).is_empty());
        assert!(segment("Alice: ", 2).is_empty());
    }

    #[test]
    fn paragraph_without_separator_keeps_text() {
        let lines = segment("just some narration without a speaker.", 2);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].speaker, "");
        assert_eq!(lines[0].text, "just some narration without a speaker.");
    }

    #[test]
    fn render_includes_index_and_speaker() {
        let lines = segment("Alice: Hi.", 1);
        assert_eq!(lines[0].render(), "[0] Alice: Hi.");
        assert_eq!(lines[0].spoken(), "Alice: Hi.");
    }
}
