//! HTTP completion source: POSTs a note's content to the summarize
//! endpoint and hands back the framed response body as a byte stream.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use jotwise_core::{ByteStream, CompletionSource, Error, Result};

/// Default summarize endpoint when running next to the API server.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:3000/api/summarize";

/// Default timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Configuration for [`HttpCompletionSource`].
#[derive(Debug, Clone)]
pub struct CompletionClientConfig {
    /// Full URL of the summarize endpoint.
    pub endpoint: String,
    /// Session token sent as a bearer credential (optional).
    pub bearer_token: Option<String>,
    /// Request timeout in seconds, covering the whole streamed body.
    pub timeout_seconds: u64,
}

impl Default for CompletionClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            bearer_token: None,
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl CompletionClientConfig {
    /// Read `SUMMARIZE_URL`, `SUMMARIZE_TOKEN` and `SUMMARIZE_TIMEOUT`.
    pub fn from_env() -> Self {
        Self {
            endpoint: std::env::var("SUMMARIZE_URL")
                .unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string()),
            bearer_token: std::env::var("SUMMARIZE_TOKEN").ok(),
            timeout_seconds: std::env::var("SUMMARIZE_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Serialize)]
struct SummarizeBody<'a> {
    content: &'a str,
}

/// Error body returned by the summarize endpoint.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    details: Option<String>,
}

/// Completion source backed by the `/api/summarize` HTTP endpoint.
pub struct HttpCompletionSource {
    client: Client,
    config: CompletionClientConfig,
}

impl HttpCompletionSource {
    pub fn new(config: CompletionClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            subsystem = "enhance",
            component = "client",
            endpoint = %config.endpoint,
            "Initializing completion client"
        );

        Ok(Self { client, config })
    }

    /// Build on an existing client, e.g. one shared with other callers.
    pub fn with_client(client: Client, config: CompletionClientConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &CompletionClientConfig {
        &self.config
    }

    fn build_request(&self) -> reqwest::RequestBuilder {
        let mut req = self.client.post(&self.config.endpoint);
        if let Some(ref token) = self.config.bearer_token {
            req = req.bearer_auth(token);
        }
        req
    }
}

/// Turn a non-success response into a transport error, preferring the
/// server's own message.
async fn transport_error(response: Response) -> Error {
    let status = response.status().as_u16();
    let fallback = format!("HTTP error! status: {}", status);
    let message = match response.json::<ErrorBody>().await {
        Ok(ErrorBody {
            error: Some(error),
            details: Some(details),
        }) => format!("{}: {}", error, details),
        Ok(ErrorBody {
            error: Some(error), ..
        }) => error,
        _ => fallback,
    };
    Error::transport_status(status, message)
}

#[async_trait]
impl CompletionSource for HttpCompletionSource {
    async fn open(&self, content: &str) -> Result<ByteStream> {
        debug!(
            subsystem = "enhance",
            component = "client",
            prompt_len = content.len(),
            "Opening completion stream"
        );

        let response = self
            .build_request()
            .json(&SummarizeBody { content })
            .send()
            .await
            .map_err(|e| Error::Transport {
                status: None,
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            let err = transport_error(response).await;
            warn!(
                subsystem = "enhance",
                component = "client",
                error = %err,
                "Completion request rejected"
            );
            return Err(err);
        }

        let stream = response.bytes_stream().map(|chunk| {
            chunk.map_err(|e| Error::Transport {
                status: None,
                message: e.to_string(),
            })
        });
        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CompletionClientConfig::default();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.timeout_seconds, DEFAULT_TIMEOUT_SECS);
        assert!(config.bearer_token.is_none());
    }

    #[test]
    fn test_client_creation() {
        let source = HttpCompletionSource::new(CompletionClientConfig {
            endpoint: "http://127.0.0.1:9/api/summarize".to_string(),
            bearer_token: Some("token".to_string()),
            timeout_seconds: 5,
        })
        .unwrap();
        assert_eq!(source.config().timeout_seconds, 5);
    }
}
