//! List command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::engine::Engine;
use anyhow::Result;

/// Run the list command.
pub async fn run_list(settings: Settings) -> Result<()> {
    let engine = Engine::new(settings)?;

    match engine.list_transcripts().await {
        Ok(transcripts) => {
            if transcripts.is_empty() {
                Output::info("No transcripts yet. Use 'sitat index <file>' to add one.");
            } else {
                Output::header(&format!("Transcripts ({})", transcripts.len()));
                println!();

                for info in &transcripts {
                    Output::transcript_info(
                        &info.title,
                        &info.id,
                        info.line_count,
                        &info.saved_at.format("%Y-%m-%d %H:%M").to_string(),
                    );
                }

                let total_lines: usize = transcripts.iter().map(|t| t.line_count).sum();
                println!();
                Output::kv("Total lines", &total_lines.to_string());
            }
        }
        Err(e) => {
            Output::error(&format!("Failed to list transcripts: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
