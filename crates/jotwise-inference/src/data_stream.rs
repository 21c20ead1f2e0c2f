//! Data-stream framing of generated tokens.
//!
//! The summarize endpoint answers with the line-oriented data stream
//! protocol: every line is `<type>:<json>`.
//!
//! ```text
//! f:{"messageId":"msg-..."}
//! 0:"🎯 PRIORITY TASKS:\n"
//! 0:"* Call the bank\n"
//! 3:"error message"            (only when generation fails mid-stream)
//! e:{"finishReason":"stop","isContinued":false}
//! d:{"finishReason":"stop"}
//! ```
//!
//! Tokens are regrouped so that each text part carries one complete line
//! of output; only the last line of a response may lack its line break.
//!
//! A consumer reading the body in-process asks for
//! [`MidStreamError::Propagate`] instead: the byte stream then ends with
//! the generation error itself rather than a `3:` part.

use bytes::Bytes;
use futures::{stream, StreamExt};
use serde_json::{json, Value};
use tracing::warn;
use uuid::Uuid;

use jotwise_core::{ByteStream, Error, Result};

use crate::openai::TokenStream;

/// Response header announcing the data stream protocol.
pub const DATA_STREAM_HEADER: &str = "x-vercel-ai-data-stream";

pub const DATA_STREAM_VERSION: &str = "v1";

/// Fresh message id for one response.
pub fn new_message_id() -> String {
    format!("msg-{}", Uuid::new_v4().simple())
}

/// `0:` part for a run of text.
pub fn text_part(text: &str) -> String {
    format!("0:{}\n", Value::String(text.to_string()))
}

/// `3:` part for a generation error.
pub fn error_part(message: &str) -> String {
    format!("3:{}\n", Value::String(message.to_string()))
}

fn start_part(message_id: &str) -> String {
    format!("f:{}\n", json!({ "messageId": message_id }))
}

fn finish_parts() -> String {
    format!(
        "e:{}\nd:{}\n",
        json!({ "finishReason": "stop", "isContinued": false }),
        json!({ "finishReason": "stop" })
    )
}

/// One `0:` part per line in `text`.
fn line_parts(text: &str) -> String {
    text.split_inclusive('\n').map(text_part).collect()
}

/// How a generation failure after the first token is reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MidStreamError {
    /// Emit a `3:` part, then the usual finish parts.
    #[default]
    ErrorPart,
    /// End the byte stream with the error; no finish parts follow.
    Propagate,
}

enum FramePhase {
    Start,
    Body,
    Finish,
    Done,
}

struct Framer {
    tokens: TokenStream,
    message_id: String,
    line: String,
    phase: FramePhase,
    on_error: MidStreamError,
}

impl Framer {
    async fn next_frame(&mut self) -> Option<Result<Bytes>> {
        loop {
            match self.phase {
                FramePhase::Start => {
                    self.phase = FramePhase::Body;
                    return Some(Ok(Bytes::from(start_part(&self.message_id))));
                }
                FramePhase::Body => match self.tokens.next().await {
                    Some(Ok(token)) => {
                        self.line.push_str(&token);
                        if let Some(idx) = self.line.rfind('\n') {
                            let complete: String = self.line.drain(..=idx).collect();
                            return Some(Ok(Bytes::from(line_parts(&complete))));
                        }
                    }
                    Some(Err(e)) => {
                        warn!(
                            subsystem = "inference",
                            component = "data_stream",
                            message_id = %self.message_id,
                            error = %e,
                            "Generation failed mid-stream"
                        );
                        return Some(self.fail(e));
                    }
                    None => {
                        self.phase = FramePhase::Finish;
                        let partial = self.take_partial_line();
                        if !partial.is_empty() {
                            return Some(Ok(Bytes::from(partial)));
                        }
                    }
                },
                FramePhase::Finish => {
                    self.phase = FramePhase::Done;
                    return Some(Ok(Bytes::from(finish_parts())));
                }
                FramePhase::Done => return None,
            }
        }
    }

    fn fail(&mut self, e: Error) -> Result<Bytes> {
        match self.on_error {
            MidStreamError::ErrorPart => {
                self.phase = FramePhase::Finish;
                let mut frame = self.take_partial_line();
                frame.push_str(&error_part(&e.to_string()));
                Ok(Bytes::from(frame))
            }
            MidStreamError::Propagate => {
                self.phase = FramePhase::Done;
                self.line.clear();
                Err(e)
            }
        }
    }

    fn take_partial_line(&mut self) -> String {
        if self.line.is_empty() {
            String::new()
        } else {
            text_part(&std::mem::take(&mut self.line))
        }
    }
}

/// Frame a token stream as a data stream body.
pub fn frame_tokens(tokens: TokenStream, message_id: String) -> ByteStream {
    frame_tokens_with(tokens, message_id, MidStreamError::ErrorPart)
}

pub fn frame_tokens_with(
    tokens: TokenStream,
    message_id: String,
    on_error: MidStreamError,
) -> ByteStream {
    let framer = Framer {
        tokens,
        message_id,
        line: String::new(),
        phase: FramePhase::Start,
        on_error,
    };

    Box::pin(stream::unfold(framer, |mut framer| async move {
        framer.next_frame().await.map(|frame| (frame, framer))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(items: Vec<Result<&'static str>>) -> TokenStream {
        Box::pin(stream::iter(
            items.into_iter().map(|r| r.map(str::to_string)),
        ))
    }

    async fn body(tokens: TokenStream) -> String {
        let frames: Vec<Bytes> = frame_tokens(tokens, "msg-test".to_string())
            .map(|r| r.unwrap())
            .collect()
            .await;
        frames
            .iter()
            .map(|b| String::from_utf8(b.to_vec()).unwrap())
            .collect()
    }

    #[test]
    fn test_text_part_escapes_json() {
        assert_eq!(text_part("a \"b\"\n"), "0:\"a \\\"b\\\"\\n\"\n");
        assert_eq!(text_part("🎯"), "0:\"🎯\"\n");
    }

    #[test]
    fn test_error_part() {
        assert_eq!(error_part("boom"), "3:\"boom\"\n");
    }

    #[test]
    fn test_message_id_format() {
        let id = new_message_id();
        assert!(id.starts_with("msg-"));
        assert_eq!(id.len(), 4 + 32);
    }

    #[tokio::test]
    async fn test_tokens_regrouped_by_line() {
        let out = body(tokens(vec![
            Ok("🎯 PRIORITY"),
            Ok(" TASKS:\n* Do"),
            Ok(" X\n\n✅ SUMMARY:"),
            Ok("\nAll good."),
        ]))
        .await;

        assert_eq!(
            out,
            concat!(
                "f:{\"messageId\":\"msg-test\"}\n",
                "0:\"🎯 PRIORITY TASKS:\\n\"\n",
                "0:\"* Do X\\n\"\n",
                "0:\"\\n\"\n",
                "0:\"✅ SUMMARY:\\n\"\n",
                "0:\"All good.\"\n",
                "e:{\"finishReason\":\"stop\",\"isContinued\":false}\n",
                "d:{\"finishReason\":\"stop\"}\n",
            )
        );
    }

    #[tokio::test]
    async fn test_empty_generation_still_framed() {
        let out = body(tokens(vec![])).await;
        assert_eq!(
            out,
            "f:{\"messageId\":\"msg-test\"}\ne:{\"finishReason\":\"stop\",\"isContinued\":false}\nd:{\"finishReason\":\"stop\"}\n"
        );
    }

    #[tokio::test]
    async fn test_mid_stream_error_emits_error_part() {
        let out = body(tokens(vec![
            Ok("partial"),
            Err(Error::Inference("Stream error: reset".to_string())),
            Ok("never sent"),
        ]))
        .await;

        assert!(out.contains("0:\"partial\"\n3:\"Inference error: Stream error: reset\"\n"));
        assert!(!out.contains("never sent"));
        assert!(out.ends_with("d:{\"finishReason\":\"stop\"}\n"));
    }

    #[tokio::test]
    async fn test_mid_stream_error_propagates_when_asked() {
        let items: Vec<Result<Bytes>> = frame_tokens_with(
            tokens(vec![
                Ok("line one\npartial"),
                Err(Error::Inference("Stream error: reset".to_string())),
                Ok("never sent"),
            ]),
            "msg-test".to_string(),
            MidStreamError::Propagate,
        )
        .collect()
        .await;

        assert_eq!(items.len(), 3);
        assert_eq!(&items[1].as_ref().unwrap()[..], b"0:\"line one\\n\"\n");
        match &items[2] {
            Err(Error::Inference(msg)) => assert_eq!(msg, "Stream error: reset"),
            other => panic!("Expected inference error, got {:?}", other),
        }
    }
}
