//! Delete command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::engine::Engine;
use anyhow::Result;

/// Run the delete command.
pub async fn run_delete(id: &str, settings: Settings) -> Result<()> {
    let engine = Engine::new(settings)?;

    if engine.delete_transcript(id).await? {
        Output::success(&format!("Deleted transcript {}", id));
    } else {
        Output::warning(&format!("No transcript with id {}", id));
    }

    Ok(())
}
