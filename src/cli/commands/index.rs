//! Index command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::engine::Engine;
use anyhow::{Context, Result};
use std::path::Path;

/// Run the index command.
pub async fn run_index(
    file: &str,
    id: Option<String>,
    title: Option<String>,
    settings: Settings,
) -> Result<()> {
    let path = Path::new(file);
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read transcript file {}", file))?;

    let id = id.unwrap_or_else(|| {
        path.file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| file.to_string())
    });
    let title = title.unwrap_or_else(|| id.clone());

    let engine = Engine::new(settings)?;

    let spinner = Output::spinner("Segmenting and embedding transcript...");
    match engine.index_transcript(&id, &title, &text).await {
        Ok(stats) => {
            spinner.finish_and_clear();
            Output::success(&format!(
                "Indexed '{}' as {} ({} lines)",
                stats.title, stats.id, stats.lines_indexed
            ));
            Output::kv("Cost", &format!("${:.4}", stats.cost));
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to index transcript: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
