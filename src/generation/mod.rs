//! Text generation collaborator contract.
//!
//! The reduction engine consumes generation through a narrow trait: prompt
//! in, text with parenthetical citations plus a cost figure out. The OpenAI
//! adapter lives here; tests inject stubs.

mod openai;

pub use openai::OpenAIGenerator;

use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;
use tracing::warn;

/// Result of one generation call.
#[derive(Debug, Clone)]
pub struct Generation {
    /// Generated text, expected to carry trailing parenthetical citations.
    pub text: String,
    /// Cost of the call in dollars, derived from reported token usage.
    pub cost: f64,
}

/// Trait for text generation services.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Issue one generation call. May fail with `GenerationTimeout`.
    async fn generate(&self, prompt: &str) -> Result<Generation>;
}

/// Call the generator, retrying transient timeouts with exponential backoff.
///
/// Non-transient errors and timeouts that survive `max_retries` attempts are
/// returned to the caller, which fails the enclosing reduction; there is no
/// partial result.
pub async fn generate_with_backoff(
    generator: &dyn Generator,
    prompt: &str,
    max_retries: u32,
    base_delay: Duration,
) -> Result<Generation> {
    let mut delay = base_delay;
    let mut attempt = 0u32;

    loop {
        match generator.generate(prompt).await {
            Ok(generation) => return Ok(generation),
            Err(e) if e.is_transient() && attempt < max_retries => {
                attempt += 1;
                warn!(
                    "Generation attempt {} timed out, retrying in {:?}: {}",
                    attempt, delay, e
                );
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SitatError;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Times out a fixed number of times before succeeding.
    struct FlakyGenerator {
        failures: u32,
        calls: AtomicU32,
    }

    #[async_trait]
    impl Generator for FlakyGenerator {
        async fn generate(&self, _prompt: &str) -> Result<Generation> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(SitatError::GenerationTimeout("stub timeout".to_string()))
            } else {
                Ok(Generation {
                    text: "ok (0)".to_string(),
                    cost: 0.01,
                })
            }
        }
    }

    #[tokio::test]
    async fn retries_transient_timeouts() {
        let gen = FlakyGenerator {
            failures: 2,
            calls: AtomicU32::new(0),
        };
        let result = generate_with_backoff(&gen, "p", 3, Duration::from_millis(1))
            .await
            .unwrap();
        assert_eq!(result.text, "ok (0)");
        assert_eq!(gen.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn surfaces_timeout_after_retries_exhausted() {
        let gen = FlakyGenerator {
            failures: 10,
            calls: AtomicU32::new(0),
        };
        let err = generate_with_backoff(&gen, "p", 2, Duration::from_millis(1))
            .await
            .unwrap_err();
        assert!(matches!(err, SitatError::GenerationTimeout(_)));
        // Initial attempt plus two retries.
        assert_eq!(gen.calls.load(Ordering::SeqCst), 3);
    }

    struct BrokenGenerator;

    #[async_trait]
    impl Generator for BrokenGenerator {
        async fn generate(&self, _prompt: &str) -> Result<Generation> {
            Err(SitatError::Generation("hard failure".to_string()))
        }
    }

    #[tokio::test]
    async fn does_not_retry_non_transient_errors() {
        let err = generate_with_backoff(&BrokenGenerator, "p", 5, Duration::from_millis(1))
            .await
            .unwrap_err();
        assert!(matches!(err, SitatError::Generation(_)));
    }
}
