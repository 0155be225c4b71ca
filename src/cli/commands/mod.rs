//! CLI command implementations.

mod ask;
mod config;
mod delete;
mod index;
mod list;
mod rewrite;
mod summarize;

pub use ask::run_ask;
pub use config::run_config;
pub use delete::run_delete;
pub use index::run_index;
pub use list::run_list;
pub use rewrite::run_rewrite;
pub use summarize::run_summarize;

use crate::cli::Output;
use crate::provenance::CitationResult;

/// Print a citation result: each sentence with its span list, then the
/// quoted source text behind each citation.
fn print_cited(result: &CitationResult, raw_text: &str) {
    for segment in &result.output {
        let spans: Vec<(usize, usize)> = segment
            .references
            .iter()
            .map(|s| (s.start, s.end))
            .collect();
        Output::cited_segment(&segment.text, &spans);
    }

    let cited: Vec<_> = result
        .output
        .iter()
        .flat_map(|s| s.references.iter())
        .collect();
    if !cited.is_empty() {
        Output::header("Sources");
        for span in cited {
            if let Some(quote) = raw_text.get(span.start..span.end) {
                Output::kv(&format!("{}..{}", span.start, span.end), quote);
            }
        }
    }

    println!();
    Output::kv("Cost", &format!("${:.4}", result.cost));
}
