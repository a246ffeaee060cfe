use super::{LLMProvider, LLMProviderConfig, ProviderMetadata};
use crate::config::{Config, ConfigError};
use crate::log_debug;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

/// Represents the Gemini LLM provider
pub struct GeminiProvider {
    config: LLMProviderConfig,
    client: Client,
}

impl GeminiProvider {
    /// Creates a new instance of `GeminiProvider` with the given configuration
    pub fn new(config: LLMProviderConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    /// Builds the provider from service configuration.
    ///
    /// A missing key is not an error here; every call reports it instead.
    pub fn from_config(config: &Config) -> Self {
        Self::new(LLMProviderConfig {
            api_key: config.api_key().map(str::to_string).unwrap_or_default(),
            model: config.gemini_model.clone(),
            api_base: config.gemini_api_base.clone(),
            additional_params: std::collections::HashMap::new(),
        })
    }

    fn model(&self) -> &str {
        if self.config.model.is_empty() {
            get_metadata().default_model
        } else {
            &self.config.model
        }
    }
}

#[async_trait]
impl LLMProvider for GeminiProvider {
    /// Generates a message using the Gemini API
    async fn generate_message(&self, prompt: &str) -> Result<String> {
        if self.config.api_key.is_empty() {
            return Err(ConfigError::MissingApiKey.into());
        }

        let mut request_body = json!({
            "contents": [
                {
                    "role": "user",
                    "parts": [
                        {"text": prompt}
                    ]
                }
            ],
            "generationConfig": {
                "maxOutputTokens": 8192
            }
        });

        for (key, value) in &self.config.additional_params {
            if let Ok(num_val) = value.parse::<f64>() {
                request_body["generationConfig"][key] = json!(num_val);
            } else {
                request_body["generationConfig"][key] = json!(value);
            }
        }

        let api_url = format!(
            "{}/models/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            self.model()
        );
        log_debug!("Gemini request to {} - {} chars", api_url, prompt.len());

        let response = self
            .client
            .post(api_url)
            .query(&[("key", self.config.api_key.as_str())])
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await?;
            return Err(anyhow!(
                "Gemini API request failed with status {}: {}",
                status,
                text
            ));
        }

        // {"candidates": [{"content": {"parts": [{"text": "..."}]}}]}
        let response_body: serde_json::Value = response.json().await?;
        let content = response_body["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .ok_or_else(|| anyhow!("Failed to extract content from Gemini API response"))?;

        Ok(content.to_string())
    }

    fn metadata(&self) -> ProviderMetadata {
        get_metadata()
    }
}

pub(super) fn get_metadata() -> ProviderMetadata {
    ProviderMetadata {
        name: "Gemini",
        default_model: crate::config::DEFAULT_GEMINI_MODEL,
        default_token_limit: 1_048_576,
        requires_api_key: true,
    }
}
