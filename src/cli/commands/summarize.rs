//! Summarize command implementation.

use crate::cli::commands::print_cited;
use crate::cli::Output;
use crate::config::Settings;
use crate::engine::Engine;
use anyhow::Result;

/// Run the summarize command.
pub async fn run_summarize(id: &str, interviewee: &str, settings: Settings) -> Result<()> {
    let engine = Engine::new(settings)?;
    let transcript = engine.load_transcript(id).await?;

    let spinner = Output::spinner(&format!(
        "Summarizing {} lines...",
        transcript.lines.len()
    ));
    match engine.summarize(&transcript.lines, interviewee).await {
        Ok(result) => {
            spinner.finish_and_clear();
            Output::header(&format!("Summary of {}", transcript.title));
            print_cited(&result, &transcript.raw_text);
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to summarize: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
