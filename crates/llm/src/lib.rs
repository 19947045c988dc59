//! Generation clients for SQL synthesis.
//!
//! The active provider is selected once from configuration; the pipeline
//! only ever sees the [`Generator`] capability. Output is untrusted text —
//! no assumption beyond "best-effort extractable SQL".

mod error;
mod ollama;
mod openai;

use std::sync::Arc;

use async_trait::async_trait;
use tabletalk_core::{Config, LlmProvider};

pub use error::LlmError;
pub use ollama::OllamaGenerator;
pub use openai::OpenAiGenerator;

/// A bounded-size generation request: a fixed system instruction plus the
/// assembled user content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// One-method capability over interchangeable language-model backends.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &Prompt) -> Result<String, LlmError>;
}

/// Build the configured provider. Selection happens here, once — call sites
/// never branch on the provider.
///
/// # Errors
/// Fails if the underlying HTTP client cannot be built.
pub fn generator_from_config(config: &Config) -> Result<Arc<dyn Generator>, LlmError> {
    match config.llm_provider {
        LlmProvider::Ollama => {
            tracing::info!(model = %config.ollama_model, "using ollama generation backend");
            Ok(Arc::new(OllamaGenerator::new(
                &config.ollama_url,
                &config.ollama_model,
                config.llm_request_timeout,
            )?))
        },
        LlmProvider::OpenAi => {
            tracing::info!(model = %config.openai_model, "using hosted generation backend");
            Ok(Arc::new(OpenAiGenerator::new(
                &config.openai_base_url,
                &config.openai_api_key,
                &config.openai_model,
                config.llm_request_timeout,
            )?))
        },
    }
}

/// Truncates a string to the given maximum length at a char boundary.
#[must_use]
pub fn truncate(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        s
    } else {
        let mut end = max_len;
        while end > 0 && !s.is_char_boundary(end) {
            end = end.saturating_sub(1);
        }
        s.get(..end).unwrap_or("")
    }
}
