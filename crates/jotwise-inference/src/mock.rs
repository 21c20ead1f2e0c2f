//! Mock streaming backend for deterministic testing.
//!
//! ```rust
//! use jotwise_inference::mock::MockStreamingBackend;
//!
//! let backend = MockStreamingBackend::new()
//!     .with_tokens(["🎯 PRIORITY TASKS:\n", "* Test\n"]);
//! assert!(backend.get_calls().is_empty());
//! ```

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::stream;

use jotwise_core::{Error, Result};

use crate::openai::{StreamingGeneration, TokenStream};

/// A well-formed three-section answer, split into tokens.
pub const WELL_FORMED_TOKENS: &[&str] = &[
    "🎯 PRIORITY",
    " TASKS:\n* Call the bank (deadline today)\n",
    "* Email Sam\n\n",
    "✅ SUMMARY:\nTwo quick wins ",
    "before lunch.\n\n",
    "💡 PRODUCTIVITY TIP:\n",
    "Batch both tasks into one 🍅 session.",
];

#[derive(Debug, Clone, Default)]
struct MockConfig {
    tokens: Vec<String>,
    open_error: Option<String>,
    fail_after: Option<(usize, String)>,
}

/// Recorded call to the mock backend.
#[derive(Debug, Clone)]
pub struct MockCall {
    pub prompt: String,
}

/// Streaming backend that replays configured tokens.
#[derive(Clone, Default)]
pub struct MockStreamingBackend {
    config: Arc<MockConfig>,
    call_log: Arc<Mutex<Vec<MockCall>>>,
}

impl MockStreamingBackend {
    /// A backend that answers with [`WELL_FORMED_TOKENS`].
    pub fn new() -> Self {
        Self::default().with_tokens(WELL_FORMED_TOKENS.iter().copied())
    }

    pub fn with_tokens<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Arc::make_mut(&mut self.config).tokens = tokens.into_iter().map(Into::into).collect();
        self
    }

    /// Fail when the stream is opened.
    pub fn with_open_error(mut self, message: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).open_error = Some(message.into());
        self
    }

    /// Fail after emitting `count` tokens.
    pub fn with_error_after(mut self, count: usize, message: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).fail_after = Some((count, message.into()));
        self
    }

    pub fn get_calls(&self) -> Vec<MockCall> {
        self.call_log
            .lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.get_calls().len()
    }
}

#[async_trait]
impl StreamingGeneration for MockStreamingBackend {
    async fn generate_stream(&self, prompt: &str) -> Result<TokenStream> {
        if let Ok(mut log) = self.call_log.lock() {
            log.push(MockCall {
                prompt: prompt.to_string(),
            });
        }

        if let Some(message) = &self.config.open_error {
            return Err(Error::Inference(message.clone()));
        }

        let mut items: Vec<Result<String>> = Vec::new();
        match &self.config.fail_after {
            Some((count, message)) => {
                items.extend(self.config.tokens.iter().take(*count).cloned().map(Ok));
                items.push(Err(Error::Inference(message.clone())));
            }
            None => items.extend(self.config.tokens.iter().cloned().map(Ok)),
        }

        Ok(Box::pin(stream::iter(items)))
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}
