//! Sitat - Citation-Preserving Transcript Reduction
//!
//! A CLI tool and library for summarizing speaker-tagged transcripts where
//! every output sentence carries the exact source character spans that
//! justify it.
//!
//! The name "Sitat" comes from the Norwegian word for "quotation."
//!
//! # Overview
//!
//! Sitat allows you to:
//! - Segment raw transcripts into indexed lines with exact source spans
//! - Hierarchically summarize or rewrite transcripts of any length
//! - Preserve line-level citations through every reduction level
//! - Ask questions over a transcript and get span-cited answers
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration and prompt templates
//! - `segment` - Speaker segmentation into indexed lines
//! - `citation` - Parsing generated text into cited segments
//! - `chunking` - Budgeted chunking of lines into generation calls
//! - `batching` - Packing texts into bounded embedding requests
//! - `generation` - LLM generation abstraction
//! - `embedding` - Embedding generation
//! - `vector_index` - Vector search over indexed lines
//! - `store` - Transcript persistence
//! - `reduce` - Hierarchical reduction with provenance tracking
//! - `provenance` - Resolving citations back to source spans
//! - `engine` - Operation wiring
//!
//! # Example
//!
//! ```rust,no_run
//! use sitat::config::Settings;
//! use sitat::engine::Engine;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let engine = Engine::new(settings)?;
//!
//!     let transcript = engine.load_transcript("interview-04").await?;
//!     let result = engine.summarize(&transcript.lines, "Alice").await?;
//!     for segment in &result.output {
//!         println!("{} ({} sources)", segment.text, segment.references.len());
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod batching;
pub mod chunking;
pub mod citation;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod engine;
pub mod error;
pub mod generation;
pub mod openai;
pub mod provenance;
pub mod reduce;
pub mod segment;
pub mod store;
pub mod vector_index;

pub use error::{Result, SitatError};
