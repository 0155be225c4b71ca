//! Citation grammar parsing for generated text.
//!
//! Generation calls are prompted to interleave prose with trailing
//! parenthetical citation groups, e.g. `"Some text (2,3). More text (8-10)."`.
//! This module splits such output into `(text, references)` segments. Parsing
//! is purely syntactic: indices are not validated against any level's range
//! here, that happens during provenance composition.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// One piece of generated text plus the current-level indices it cites.
///
/// References may be empty (uncited boilerplate) and may overlap with
/// sibling segments; citations are not exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedSegment {
    pub text: String,
    pub references: BTreeSet<usize>,
}

impl AnnotatedSegment {
    pub fn new(text: impl Into<String>, references: BTreeSet<usize>) -> Self {
        Self {
            text: text.into(),
            references,
        }
    }

    /// A segment with no citations.
    pub fn uncited(text: impl Into<String>) -> Self {
        Self::new(text, BTreeSet::new())
    }
}

fn group_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\(([^()]*)\)").expect("valid citation group regex"))
}

/// Parse a comma-separated index list: bare integers and inclusive
/// `start-end` ranges, e.g. `"1, 21-25, 28"`.
///
/// Returns the sorted, deduplicated set, or `None` if any token fails the
/// grammar (including ranges with `start > end` and empty lists).
pub fn parse_indices(list: &str) -> Option<BTreeSet<usize>> {
    let trimmed = list.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut indices = BTreeSet::new();
    for token in trimmed.split(',') {
        let token = token.trim();
        match token.split_once('-') {
            Some((start, end)) => {
                let start: usize = start.trim().parse().ok()?;
                let end: usize = end.trim().parse().ok()?;
                if start > end {
                    return None;
                }
                indices.extend(start..=end);
            }
            None => {
                indices.insert(token.parse().ok()?);
            }
        }
    }
    Some(indices)
}

/// Parse raw generation output into ordered annotated segments.
///
/// A segment is a prose run terminated by a parenthetical group whose
/// contents satisfy the index-list grammar. A group that fails the grammar
/// is treated as ordinary prose: the run keeps going until the next valid
/// group or the end of input. Trailing prose with no group becomes a final
/// uncited segment. Prose is trimmed of trailing whitespace only, so the
/// boundaries between segments stay faithful to the generated text.
pub fn parse_annotated(raw: &str) -> Vec<AnnotatedSegment> {
    let mut segments = Vec::new();
    let mut run_start = 0usize;

    for group in group_regex().captures_iter(raw) {
        let whole = group.get(0).expect("capture 0 always present");
        let Some(references) = parse_indices(&group[1]) else {
            // Malformed citation syntax degrades to prose.
            continue;
        };

        let text = raw[run_start..whole.start()].trim_end();
        segments.push(AnnotatedSegment::new(text, references));
        run_start = whole.end();
    }

    let trailing = &raw[run_start..];
    if !trailing.trim().is_empty() {
        segments.push(AnnotatedSegment::uncited(trailing.trim_end()));
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refs(indices: &[usize]) -> BTreeSet<usize> {
        indices.iter().copied().collect()
    }

    #[test]
    fn parses_prose_with_citation_groups() {
        let segments = parse_annotated("Some text (2,3). Some other text (8-10).");
        assert_eq!(
            segments,
            vec![
                AnnotatedSegment::new("Some text", refs(&[2, 3])),
                AnnotatedSegment::new(". Some other text", refs(&[8, 9, 10])),
                AnnotatedSegment::uncited("."),
            ]
        );
    }

    #[test]
    fn parses_ranges_sorted_and_deduplicated() {
        let indices = parse_indices("1, 21-25, 28").unwrap();
        assert_eq!(indices, refs(&[1, 21, 22, 23, 24, 25, 28]));

        let indices = parse_indices("3,1,3,1-2").unwrap();
        assert_eq!(indices, refs(&[1, 2, 3]));
    }

    #[test]
    fn rejects_malformed_index_lists() {
        assert!(parse_indices("abc").is_none());
        assert!(parse_indices("").is_none());
        assert!(parse_indices("1,").is_none());
        assert!(parse_indices("5-2").is_none());
        assert!(parse_indices("1, two").is_none());
    }

    #[test]
    fn malformed_group_degrades_to_uncited_prose() {
        let segments = parse_annotated("The speaker disagreed (strongly). And left (4).");
        assert_eq!(
            segments,
            vec![AnnotatedSegment::new(
                "The speaker disagreed (strongly). And left",
                refs(&[4])
            )]
        );
    }

    #[test]
    fn text_without_any_group_is_one_uncited_segment() {
        let segments = parse_annotated("No citations here at all.");
        assert_eq!(
            segments,
            vec![AnnotatedSegment::uncited("No citations here at all.")]
        );
    }

    #[test]
    fn empty_input_yields_no_segments() {
        assert!(parse_annotated("").is_empty());
        assert!(parse_annotated("   \n").is_empty());
    }

    #[test]
    fn single_index_group() {
        let segments = parse_annotated("One claim (7)");
        assert_eq!(segments, vec![AnnotatedSegment::new("One claim", refs(&[7]))]);
    }
}
