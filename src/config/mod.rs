//! Configuration management for Sitat.

mod prompts;
mod settings;

pub use prompts::{ConcisePrompts, Prompts, QueryPrompts, SummaryPrompts};
pub use settings::{
    EmbeddingSettings, GeneralSettings, GenerationSettings, PromptSettings, QuerySettings,
    ReductionSettings, SegmentationSettings, Settings, StoreSettings,
};
