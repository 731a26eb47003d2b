use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Name of the environment variable holding the generator credential
pub const API_KEY_VAR: &str = "ANTHROPIC_API_KEY";

/// Failure of a single generation call
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("Anthropic API error: {status} - {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("{0}")]
    UnexpectedResponseShape(String),
}

/// Something that turns a prompt into raw model text
pub trait Generator {
    fn generate(&self, prompt: &str) -> impl Future<Output = Result<String, GeneratorError>> + Send;
}

/// Configuration for the Anthropic API client
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    /// API key (from ANTHROPIC_API_KEY env var); `None` disables analysis
    pub api_key: Option<String>,
    /// Model to use (e.g., "claude-sonnet-4-20250514")
    pub model: String,
    /// Temperature (0-1, lower = more deterministic)
    pub temperature: f64,
    /// Maximum tokens in response
    pub max_tokens: u32,
    /// Upper bound on a whole request, connect through body
    pub timeout: Duration,
}

impl AnthropicConfig {
    /// Create config from environment variables.
    ///
    /// A missing key is not an error here; the analyzer reports it per request.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_VAR)
            .ok()
            .filter(|key| !key.trim().is_empty());
        let model = std::env::var("ANTHROPIC_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let timeout_secs = match std::env::var("ANALYSIS_TIMEOUT_SECS") {
            Ok(raw) => raw
                .parse::<u64>()
                .with_context(|| format!("ANALYSIS_TIMEOUT_SECS is not a number: {raw}"))?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            api_key,
            model,
            temperature: 0.1,
            max_tokens: 4096,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Create with custom settings
    pub fn new(api_key: Option<String>, model: String) -> Self {
        Self {
            api_key,
            model,
            temperature: 0.1,
            max_tokens: 4096,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Anthropic API client
pub struct AnthropicClient {
    client: Client,
    api_key: String,
    config: AnthropicConfig,
}

impl AnthropicClient {
    /// Build a client for a config that carries a key.
    ///
    /// Returns `Ok(None)` when no key is configured.
    pub fn from_config(config: AnthropicConfig) -> Result<Option<Self>> {
        let Some(api_key) = config.api_key.clone() else {
            return Ok(None);
        };

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to build HTTP client for Anthropic API")?;

        Ok(Some(Self {
            client,
            api_key,
            config,
        }))
    }

    /// Send a single user message and return the first text block
    pub async fn send_message(&self, user: &str) -> Result<String, GeneratorError> {
        let request = AnthropicRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            temperature: Some(self.config.temperature),
            messages: vec![Message {
                role: "user".to_string(),
                content: user.to_string(),
            }],
        };

        let response = self
            .client
            .post(MESSAGES_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GeneratorError::Status { status, body });
        }

        let body = response.text().await?;
        extract_text(&body)
    }
}

impl Generator for AnthropicClient {
    async fn generate(&self, prompt: &str) -> Result<String, GeneratorError> {
        self.send_message(prompt).await
    }
}

/// Pull the first text content block out of a Messages API response body
fn extract_text(body: &str) -> Result<String, GeneratorError> {
    let response: AnthropicResponse = serde_json::from_str(body).map_err(|e| {
        GeneratorError::UnexpectedResponseShape(format!("invalid response envelope: {e}"))
    })?;

    response
        .content
        .into_iter()
        .find(|c| c.content_type == "text")
        .map(|c| c.text)
        .ok_or_else(|| {
            GeneratorError::UnexpectedResponseShape("no text content in response".to_string())
        })
}

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: String,
}
