//! Ollama client
//!
//! Talks to a local Ollama server through `/api/generate` with streaming
//! disabled. Every request is bounded by the configured timeout.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::{
    helpers::{extract_json, instructions_prompt, suggestion_ids, suggestions_prompt, summary_prompt},
    models::{GenerateOptions, GenerateRequest, GenerateResponse, InstructionAnalysis},
    AiError, AiService,
};
use crate::{
    cart::models::{Cart, CartItem},
    config::Settings,
};

#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl From<&Settings> for OllamaConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            base_url: settings.ollama_base_url.clone(),
            model: settings.ollama_model.clone(),
            temperature: settings.ollama_temperature,
            max_tokens: settings.ollama_max_tokens,
            timeout: settings.ai_timeout(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OllamaClient {
    config: OllamaConfig,
    client: reqwest::Client,
}

impl OllamaClient {
    pub fn new(config: OllamaConfig) -> Result<Self, AiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AiError::Transport(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Sends one prompt and returns the model's raw `response` text.
    async fn generate(&self, prompt: &str, json: bool) -> Result<String, AiError> {
        let url = format!("{}/api/generate", self.config.base_url.trim_end_matches('/'));
        let request = GenerateRequest {
            model: &self.config.model,
            prompt,
            stream: false,
            format: json.then_some("json"),
            options: GenerateOptions {
                temperature: self.config.temperature,
                num_predict: self.config.max_tokens,
            },
        };

        tracing::debug!(url = %url, model = %self.config.model, json, "sending prompt");
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AiError::Parse(e.to_string()))?;
        Ok(payload.response)
    }
}

fn transport_error(err: reqwest::Error) -> AiError {
    if err.is_timeout() {
        AiError::Timeout
    } else {
        AiError::Transport(err.to_string())
    }
}

#[async_trait]
impl AiService for OllamaClient {
    async fn process_instructions(
        &self,
        instructions: &str,
    ) -> Result<InstructionAnalysis, AiError> {
        let raw = self.generate(&instructions_prompt(instructions), true).await?;
        extract_json(&raw)
    }

    async fn summarize_order(&self, cart: &Cart) -> Result<String, AiError> {
        let raw = self.generate(&summary_prompt(cart)?, false).await?;
        let summary = raw.trim();
        if summary.is_empty() {
            return Err(AiError::Parse("empty summary".into()));
        }
        Ok(summary.to_string())
    }

    async fn suggest_items(
        &self,
        items: &[CartItem],
        preferences: &[String],
    ) -> Result<Vec<String>, AiError> {
        let raw = self
            .generate(&suggestions_prompt(items, preferences)?, true)
            .await?;
        let value: Value = extract_json(&raw)?;
        suggestion_ids(value)
    }
}
