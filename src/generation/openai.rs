//! OpenAI chat completion generator.

use super::{Generation, Generator};
use crate::error::{Result, SitatError};
use crate::openai::create_client;
use async_openai::error::OpenAIError;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// OpenAI-backed generation service.
pub struct OpenAIGenerator {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: f32,
    prompt_cost_per_1k: f64,
    completion_cost_per_1k: f64,
}

impl OpenAIGenerator {
    /// Create a generator with default pricing for the given model.
    pub fn new(model: &str) -> Self {
        Self::with_config(model, 0.3, 0.00015, 0.0006)
    }

    /// Create a generator with explicit temperature and per-1k-token rates.
    pub fn with_config(
        model: &str,
        temperature: f32,
        prompt_cost_per_1k: f64,
        completion_cost_per_1k: f64,
    ) -> Self {
        Self {
            client: create_client(),
            model: model.to_string(),
            temperature,
            prompt_cost_per_1k,
            completion_cost_per_1k,
        }
    }
}

#[async_trait]
impl Generator for OpenAIGenerator {
    #[instrument(skip(self, prompt), fields(prompt_len = prompt.len()))]
    async fn generate(&self, prompt: &str) -> Result<Generation> {
        let messages: Vec<ChatCompletionRequestMessage> =
            vec![ChatCompletionRequestUserMessageArgs::default()
                .content(prompt.to_string())
                .build()
                .map_err(|e| SitatError::Generation(e.to_string()))?
                .into()];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .build()
            .map_err(|e| SitatError::Generation(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(map_openai_error)?;

        let text = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| SitatError::Generation("Empty response from LLM".to_string()))?
            .clone();

        let cost = response
            .usage
            .map(|u| {
                u.prompt_tokens as f64 / 1000.0 * self.prompt_cost_per_1k
                    + u.completion_tokens as f64 / 1000.0 * self.completion_cost_per_1k
            })
            .unwrap_or(0.0);

        debug!("Generated {} chars for ${:.6}", text.len(), cost);

        Ok(Generation { text, cost })
    }
}

/// Map OpenAI client errors, distinguishing timeouts so callers can retry.
fn map_openai_error(err: OpenAIError) -> SitatError {
    match err {
        OpenAIError::Reqwest(e) if e.is_timeout() => SitatError::GenerationTimeout(e.to_string()),
        other => SitatError::OpenAI(format!("Generation API error: {}", other)),
    }
}
