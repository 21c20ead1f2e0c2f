//! OpenAI-compatible streaming chat backend.
//!
//! Works with any endpoint that speaks the chat completions protocol with
//! `stream: true`, including Gemini's OpenAI compatibility layer (the
//! default), OpenAI, Ollama and vLLM.
//!
//! # Example
//!
//! ```rust,no_run
//! use jotwise_inference::openai::{ChatBackend, ChatBackendConfig, StreamingGeneration};
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = ChatBackend::new(ChatBackendConfig {
//!         base_url: "http://localhost:11434/v1".to_string(),
//!         model: "llama3".to_string(),
//!         ..Default::default()
//!     })
//!     .unwrap();
//!
//!     let _tokens = backend.generate_stream("Hello").await.unwrap();
//! }
//! ```

mod backend;
mod error;
mod streaming;
mod types;

pub use backend::{
    ChatBackend, ChatBackendConfig, DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL,
    DEFAULT_TEMPERATURE, DEFAULT_TIMEOUT_SECS,
};
pub use error::{to_jotwise_error, OpenAIErrorCode};
pub use streaming::{parse_sse_stream, StreamingGeneration, TokenStream};
pub use types::*;
