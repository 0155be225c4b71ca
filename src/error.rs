//! Error types for Sitat.

use thiserror::Error;

/// Library-level error type for Sitat operations.
#[derive(Error, Debug)]
pub enum SitatError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Generation timed out: {0}")]
    GenerationTimeout(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Vector index error: {0}")]
    VectorIndex(String),

    #[error("Transcript store error: {0}")]
    TranscriptStore(String),

    #[error("Transcript not found: {0}")]
    TranscriptNotFound(String),

    #[error("Reference {index} does not exist at level {level}")]
    OutOfRangeReference { index: usize, level: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),
}

impl SitatError {
    /// Whether the error is a transient condition worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(self, SitatError::GenerationTimeout(_))
    }
}

/// Result type alias for Sitat operations.
pub type Result<T> = std::result::Result<T, SitatError>;
