//! Provenance resolution: final-level references back to source spans.
//!
//! By the time a reduction terminates, every segment's references are
//! expressed in level-0 indices (composition happens at every recursion
//! step). The resolver's only job is the last hop: index to character span.

use crate::citation::AnnotatedSegment;
use crate::error::{Result, SitatError};
use crate::segment::IndexedLine;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A literal substring span of the original source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpan {
    pub start: usize,
    pub end: usize,
}

/// One output segment with its citations resolved to source spans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationSegment {
    pub text: String,
    /// Spans in sorted-index order, not citation-appearance order.
    pub references: Vec<SourceSpan>,
}

/// The externally visible result of a reduction or query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CitationResult {
    pub output: Vec<CitationSegment>,
    /// Total cost of every external call that produced this result.
    pub cost: f64,
}

/// Resolve level-0 references to the spans of the original indexed lines.
///
/// A reference with no corresponding line is an `OutOfRangeReference`
/// error; partial citation results are never produced.
pub fn resolve(
    segments: &[AnnotatedSegment],
    lines: &[IndexedLine],
) -> Result<Vec<CitationSegment>> {
    let by_index: HashMap<usize, &IndexedLine> = lines.iter().map(|l| (l.index, l)).collect();

    segments
        .iter()
        .map(|segment| {
            let references = segment
                .references
                .iter()
                .map(|&index| {
                    by_index
                        .get(&index)
                        .map(|line| SourceSpan {
                            start: line.source_start,
                            end: line.source_end,
                        })
                        .ok_or(SitatError::OutOfRangeReference { index, level: 0 })
                })
                .collect::<Result<Vec<_>>>()?;

            Ok(CitationSegment {
                text: segment.text.clone(),
                references,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn line(index: usize, start: usize, end: usize) -> IndexedLine {
        IndexedLine {
            index,
            speaker: "A".to_string(),
            text: "x".repeat(end - start),
            source_start: start,
            source_end: end,
        }
    }

    #[test]
    fn resolves_references_in_sorted_order() {
        let lines = vec![line(0, 0, 10), line(1, 11, 20), line(2, 21, 30)];
        let segments = vec![AnnotatedSegment::new(
            "claim",
            BTreeSet::from([2, 0]),
        )];

        let resolved = resolve(&segments, &lines).unwrap();
        assert_eq!(
            resolved[0].references,
            vec![SourceSpan { start: 0, end: 10 }, SourceSpan { start: 21, end: 30 }]
        );
    }

    #[test]
    fn uncited_segment_resolves_to_no_spans() {
        let lines = vec![line(0, 0, 5)];
        let segments = vec![AnnotatedSegment::uncited("boilerplate")];
        let resolved = resolve(&segments, &lines).unwrap();
        assert!(resolved[0].references.is_empty());
    }

    #[test]
    fn out_of_range_reference_is_an_error() {
        let lines = vec![line(0, 0, 5)];
        let segments = vec![AnnotatedSegment::new("claim", BTreeSet::from([7]))];
        let err = resolve(&segments, &lines).unwrap_err();
        assert!(matches!(
            err,
            SitatError::OutOfRangeReference { index: 7, level: 0 }
        ));
    }
}
