//! External language-model clients
//!
//! Handlers never talk to a model directly; they go through [`LLMProvider`] so the
//! generation service can be driven by Gemini in production and by stubs in tests.

mod gemini;

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;

pub use gemini::GeminiProvider;

/// A text-in, text-out model endpoint
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Send a single prompt and return the raw text of the reply
    async fn generate_message(&self, prompt: &str) -> Result<String>;

    /// Static facts about this provider
    fn metadata(&self) -> ProviderMetadata;
}

/// Connection settings for a provider
#[derive(Clone, Debug, Default)]
pub struct LLMProviderConfig {
    pub api_key: String,
    pub model: String,
    /// Base URL without the trailing `/models/...` segment
    pub api_base: String,
    /// Extra `generationConfig` entries, numeric strings are sent as numbers
    pub additional_params: HashMap<String, String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProviderMetadata {
    pub name: &'static str,
    pub default_model: &'static str,
    pub default_token_limit: usize,
    pub requires_api_key: bool,
}
