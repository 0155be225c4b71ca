//! Ask command implementation.

use crate::cli::commands::print_cited;
use crate::cli::Output;
use crate::config::Settings;
use crate::engine::Engine;
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(id: &str, query: &str, settings: Settings) -> Result<()> {
    let engine = Engine::new(settings)?;
    let transcript = engine.load_transcript(id).await?;

    let spinner = Output::spinner("Searching indexed lines...");
    match engine.answer_query(id, query).await {
        Ok(result) => {
            spinner.finish_and_clear();
            if result.output.is_empty() {
                Output::info("No indexed lines matched the question.");
                Output::info(&format!(
                    "Run 'sitat index <file> --id {}' first if this transcript is not indexed.",
                    id
                ));
            } else {
                Output::header("Answer");
                print_cited(&result, &transcript.raw_text);
            }
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to answer question: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
