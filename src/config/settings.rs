//! Configuration settings for Sitat.

use crate::reduce::ReducerConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub generation: GenerationSettings,
    pub embedding: EmbeddingSettings,
    pub segmentation: SegmentationSettings,
    pub reduction: ReductionSettings,
    pub query: QuerySettings,
    pub store: StoreSettings,
    pub prompts: PromptSettings,
}


/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.sitat".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Generation service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// LLM model for reduction and query answering.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Cost per 1k prompt tokens, in dollars.
    pub prompt_cost_per_1k: f64,
    /// Cost per 1k completion tokens, in dollars.
    pub completion_cost_per_1k: f64,
    /// Retries per call on timeout.
    pub max_retries: u32,
    /// Initial retry backoff in milliseconds; doubles per retry.
    pub retry_base_delay_ms: u64,
    /// Concurrent generation calls within one reduction level.
    pub max_concurrent: usize,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.3,
            prompt_cost_per_1k: 0.00015,
            completion_cost_per_1k: 0.0006,
            max_retries: 3,
            retry_base_delay_ms: 500,
            max_concurrent: 4,
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding model to use.
    pub model: String,
    /// Embedding dimensions.
    pub dimensions: u32,
    /// Maximum total characters per embedding request payload.
    pub max_batch_chars: usize,
    /// Cost per 1k tokens, in dollars.
    pub cost_per_1k: f64,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            model: "text-embedding-3-small".to_string(),
            dimensions: 1536,
            max_batch_chars: 100_000,
            cost_per_1k: 0.00002,
        }
    }
}

/// Speaker segmentation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationSettings {
    /// Minimum accumulated characters before a sentence boundary may close
    /// an indexed line.
    pub min_line_size: usize,
}

impl Default for SegmentationSettings {
    fn default() -> Self {
        Self { min_line_size: 80 }
    }
}

/// Hierarchical reduction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReductionSettings {
    /// Word budget per chunk (one generation call).
    pub chunk_budget_words: usize,
    /// Word-count ceiling under which a level's output is final.
    pub max_final_words: usize,
    /// Hard cap on recursion depth.
    pub max_levels: usize,
}

impl Default for ReductionSettings {
    fn default() -> Self {
        Self {
            chunk_budget_words: 1200,
            max_final_words: 400,
            max_levels: 8,
        }
    }
}

/// Query answering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuerySettings {
    /// Maximum number of matched lines fed into the answer prompt.
    pub max_matches: usize,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self { max_matches: 10 }
    }
}

/// Persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Path to the SQLite database holding transcripts and embeddings.
    pub database_path: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            database_path: "~/.sitat/sitat.db".to_string(),
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}


impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::SitatError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sitat")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded SQLite database path.
    pub fn database_path(&self) -> PathBuf {
        Self::expand_path(&self.store.database_path)
    }

    /// Build the reducer configuration from the relevant sections.
    pub fn reducer_config(&self) -> ReducerConfig {
        ReducerConfig {
            chunk_budget_words: self.reduction.chunk_budget_words,
            max_final_words: self.reduction.max_final_words,
            max_levels: self.reduction.max_levels,
            max_concurrent: self.generation.max_concurrent,
            max_retries: self.generation.max_retries,
            retry_base_delay: Duration::from_millis(self.generation.retry_base_delay_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let settings = Settings::default();
        assert_eq!(settings.generation.model, "gpt-4o-mini");
        assert_eq!(settings.segmentation.min_line_size, 80);
        assert!(settings.reduction.chunk_budget_words > settings.reduction.max_final_words);
    }

    #[test]
    fn reducer_config_mirrors_settings() {
        let mut settings = Settings::default();
        settings.reduction.max_levels = 3;
        settings.generation.max_concurrent = 2;

        let config = settings.reducer_config();
        assert_eq!(config.max_levels, 3);
        assert_eq!(config.max_concurrent, 2);
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [generation]
            model = "gpt-4.1"
            "#,
        )
        .unwrap();
        assert_eq!(settings.generation.model, "gpt-4.1");
        assert_eq!(settings.embedding.dimensions, 1536);
    }
}
