//! CLI module for Sitat.

pub mod commands;
mod output;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Sitat - Citation-Preserving Transcript Reduction
///
/// A CLI tool for summarizing speaker-tagged transcripts where every output
/// sentence cites the exact source spans that justify it. The name "Sitat"
/// comes from the Norwegian word for "quotation."
#[derive(Parser, Debug)]
#[command(name = "sitat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Segment, embed, and index a transcript file
    Index {
        /// Path to a plain-text transcript file
        file: String,

        /// Transcript id (defaults to the file stem)
        #[arg(short, long)]
        id: Option<String>,

        /// Display title (defaults to the id)
        #[arg(short, long)]
        title: Option<String>,
    },

    /// Summarize an indexed transcript with source citations
    Summarize {
        /// Transcript id
        id: String,

        /// Speaker whose statements are being summarized
        #[arg(short = 's', long)]
        interviewee: String,
    },

    /// Rewrite an indexed transcript concisely, citations preserved
    Rewrite {
        /// Transcript id
        id: String,

        /// Speaker whose statements are being rewritten
        #[arg(short = 's', long)]
        interviewee: String,
    },

    /// Ask a question over one transcript's indexed lines
    Ask {
        /// Transcript id
        id: String,

        /// The question to ask
        query: String,
    },

    /// List indexed transcripts
    List,

    /// Delete a transcript and its indexed lines
    Delete {
        /// Transcript id
        id: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,

    /// Print the configuration file path
    Path,
}
