//! OpenAI-compatible streaming chat backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, warn};

use jotwise_core::{Error, Result};

use super::error::{to_jotwise_error, OpenAIErrorCode};
use super::streaming::{parse_sse_stream, StreamingGeneration, TokenStream};
use super::types::*;

/// Gemini's OpenAI-compatible endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

/// Default generation model.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Default timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Low temperature keeps the model on the requested format.
pub const DEFAULT_TEMPERATURE: f32 = 0.1;

pub const DEFAULT_MAX_TOKENS: u32 = 200;

/// Configuration for the chat backend.
#[derive(Debug, Clone)]
pub struct ChatBackendConfig {
    /// Base URL for the API endpoint.
    pub base_url: String,
    /// API key for authentication (optional for local endpoints).
    pub api_key: Option<String>,
    /// Model to use for generation.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Completion token limit.
    pub max_tokens: u32,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for ChatBackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ChatBackendConfig {
    /// Read `LLM_*` variables; the key falls back to `GOOGLE_API_KEY`.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("LLM_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            api_key: std::env::var("LLM_API_KEY")
                .or_else(|_| std::env::var("GOOGLE_API_KEY"))
                .ok()
                .filter(|k| !k.is_empty()),
            model: std::env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            temperature: std::env::var("LLM_TEMPERATURE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TEMPERATURE),
            max_tokens: std::env::var("LLM_MAX_TOKENS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_TOKENS),
            timeout_seconds: std::env::var("LLM_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Streaming chat backend for any OpenAI-compatible endpoint.
pub struct ChatBackend {
    client: Client,
    config: ChatBackendConfig,
}

impl ChatBackend {
    pub fn new(config: ChatBackendConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Inference(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            subsystem = "inference",
            component = "chat_backend",
            model = %config.model,
            "Initializing chat backend: url={}",
            config.base_url
        );

        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(ChatBackendConfig::from_env())
    }

    pub fn config(&self) -> &ChatBackendConfig {
        &self.config
    }

    /// Build a request with authentication if configured.
    fn build_request(&self, endpoint: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), endpoint);
        let mut req = self.client.post(&url);

        if let Some(ref api_key) = self.config.api_key {
            req = req.bearer_auth(api_key);
        }

        req
    }
}

#[async_trait]
impl StreamingGeneration for ChatBackend {
    async fn generate_stream(&self, prompt: &str) -> Result<TokenStream> {
        debug!(
            subsystem = "inference",
            component = "chat_backend",
            model = %self.config.model,
            prompt_len = prompt.len(),
            "Streaming generation"
        );

        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage::user(prompt)],
            temperature: Some(self.config.temperature),
            max_tokens: Some(self.config.max_tokens),
            stream: true,
        };

        let response = self
            .build_request("/chat/completions")
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Inference(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let (kind, message) = match response.json::<OpenAIErrorResponse>().await {
                Ok(body) => (body.error.kind().to_string(), body.error.message),
                Err(_) => ("unknown".to_string(), format!("HTTP status {}", status)),
            };
            warn!(
                subsystem = "inference",
                component = "chat_backend",
                status,
                kind = %kind,
                "Completion API returned an error"
            );
            let code = OpenAIErrorCode::from_response(status, &kind);
            return Err(to_jotwise_error(code, &message));
        }

        Ok(parse_sse_stream(response.bytes_stream()))
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ChatBackendConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.model, "gemini-1.5-flash");
        assert_eq!(config.max_tokens, 200);
        assert!((config.temperature - 0.1).abs() < f32::EPSILON);
        assert_eq!(config.timeout_seconds, DEFAULT_TIMEOUT_SECS);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_backend_creation() {
        let backend = ChatBackend::new(ChatBackendConfig::default()).unwrap();
        assert_eq!(backend.config().base_url, DEFAULT_BASE_URL);
        assert_eq!(backend.model_name(), DEFAULT_MODEL);
    }

    #[test]
    fn test_config_struct_update() {
        let config = ChatBackendConfig {
            base_url: "http://localhost:11434/v1".to_string(),
            api_key: Some("key".to_string()),
            ..Default::default()
        };
        let cloned = config.clone();
        assert_eq!(cloned.base_url, "http://localhost:11434/v1");
        assert_eq!(cloned.api_key.as_deref(), Some("key"));
        assert_eq!(cloned.model, DEFAULT_MODEL);
    }
}
