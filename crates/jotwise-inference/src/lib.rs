//! # jotwise-inference
//!
//! Completion side of note enhancement: builds the enhancement prompt,
//! streams tokens from an OpenAI-compatible chat endpoint, and frames them
//! as a data stream for the enhancement pipeline to consume.

pub mod data_stream;
pub mod openai;
pub mod prompt;
pub mod summarize;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use data_stream::{
    frame_tokens, frame_tokens_with, MidStreamError, DATA_STREAM_HEADER, DATA_STREAM_VERSION,
};
pub use openai::{ChatBackend, ChatBackendConfig, StreamingGeneration, TokenStream};
pub use prompt::enhancement_prompt;
pub use summarize::SummarizeService;
