//! In-process summarize service: prompt, stream, frame.

use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use tracing::{error, info};

use jotwise_core::{ByteStream, CompletionSource, Error, Result};

use crate::data_stream::{frame_tokens_with, new_message_id, MidStreamError};
use crate::openai::StreamingGeneration;
use crate::prompt::enhancement_prompt;

/// Message returned when the model stream cannot be opened.
pub const GENERATION_FAILED: &str = "Failed to generate summary";

/// Opens framed enhancement streams against a generation backend.
#[derive(Clone)]
pub struct SummarizeService {
    backend: Arc<dyn StreamingGeneration>,
}

impl SummarizeService {
    pub fn new(backend: Arc<dyn StreamingGeneration>) -> Self {
        Self { backend }
    }

    pub fn model_name(&self) -> &str {
        self.backend.model_name()
    }

    /// Start a framed enhancement stream for `content`.
    ///
    /// Blank content is `Error::InvalidInput`; a backend failure before the
    /// first token is returned as-is. A later failure becomes a `3:` part.
    pub async fn stream(&self, content: &str) -> Result<ByteStream> {
        self.stream_with(content, MidStreamError::ErrorPart).await
    }

    async fn stream_with(&self, content: &str, on_error: MidStreamError) -> Result<ByteStream> {
        if content.trim().is_empty() {
            return Err(Error::InvalidInput("Content is required".to_string()));
        }

        let prompt = enhancement_prompt(content);
        let message_id = new_message_id();

        let tokens = self.backend.generate_stream(&prompt).await.map_err(|e| {
            error!(
                subsystem = "inference",
                component = "summarize",
                model = %self.backend.model_name(),
                error = %e,
                "Failed to open generation stream"
            );
            e
        })?;

        info!(
            subsystem = "inference",
            component = "summarize",
            model = %self.backend.model_name(),
            message_id = %message_id,
            prompt_len = prompt.len(),
            "Summary stream opened"
        );

        Ok(frame_tokens_with(tokens, message_id, on_error))
    }
}

/// Lets the enhancement cycle run in-process, without an HTTP hop. Open
/// errors carry the same status and message the HTTP endpoint would send;
/// a generation failure mid-stream ends the byte stream as a transport
/// error.
#[async_trait]
impl CompletionSource for SummarizeService {
    async fn open(&self, content: &str) -> Result<ByteStream> {
        let body = self
            .stream_with(content, MidStreamError::Propagate)
            .await
            .map_err(|e| match e {
                Error::InvalidInput(msg) => Error::transport_status(400, msg),
                other => Error::transport_status(500, format!("{}: {}", GENERATION_FAILED, other)),
            })?;

        Ok(Box::pin(body.map(|frame| {
            frame.map_err(|e| Error::Transport {
                status: None,
                message: e.to_string(),
            })
        })))
    }
}
