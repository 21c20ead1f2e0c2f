//! SSE stream parsing for OpenAI-compatible streaming responses.
//!
//! Network chunks do not respect SSE line boundaries, so bytes are
//! buffered until a full line is available before it is parsed.

use std::pin::Pin;

use futures::{future, stream, Stream, StreamExt};

use jotwise_core::{Error, Result};

use super::types::ChatCompletionChunk;

/// Stream of generation tokens.
pub type TokenStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Line buffer for one SSE response.
#[derive(Debug, Default)]
struct SseBuffer {
    pending: Vec<u8>,
    done: bool,
}

impl SseBuffer {
    /// Append bytes and return the tokens carried by every completed line.
    fn push(&mut self, bytes: &[u8]) -> Vec<Result<String>> {
        if self.done {
            return Vec::new();
        }
        self.pending.extend_from_slice(bytes);

        let mut out = Vec::new();
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            match parse_sse_line(&line) {
                SseLine::Token(token) => out.push(Ok(token)),
                SseLine::Error(e) => out.push(Err(e)),
                SseLine::Done => {
                    self.done = true;
                    self.pending.clear();
                    break;
                }
                SseLine::Skip => {}
            }
        }
        out
    }
}

enum SseLine {
    Token(String),
    Error(Error),
    Done,
    Skip,
}

/// Parse SSE stream from an OpenAI-compatible endpoint.
pub fn parse_sse_stream(
    stream: impl Stream<Item = std::result::Result<bytes::Bytes, reqwest::Error>> + Send + 'static,
) -> TokenStream {
    let token_stream = stream
        .scan(SseBuffer::default(), |buffer, chunk| {
            let items = match chunk {
                Ok(bytes) => buffer.push(&bytes),
                Err(e) => vec![Err(Error::Inference(format!("Stream error: {}", e)))],
            };
            future::ready(Some(stream::iter(items)))
        })
        .flatten();

    Box::pin(token_stream)
}

/// Parse a single SSE line.
fn parse_sse_line(line: &str) -> SseLine {
    let line = line.trim();

    // Skip empty lines and comments
    if line.is_empty() || line.starts_with(':') {
        return SseLine::Skip;
    }

    let Some(data) = line.strip_prefix("data:") else {
        return SseLine::Skip;
    };
    let data = data.trim_start();

    if data == "[DONE]" {
        return SseLine::Done;
    }

    match serde_json::from_str::<ChatCompletionChunk>(data) {
        Ok(chunk) => {
            let content: String = chunk
                .choices
                .into_iter()
                .filter_map(|choice| choice.delta.content)
                .collect();
            if content.is_empty() {
                SseLine::Skip
            } else {
                SseLine::Token(content)
            }
        }
        Err(e) => SseLine::Error(Error::Inference(format!(
            "Failed to parse SSE chunk: {}",
            e
        ))),
    }
}

/// Streaming generation.
#[async_trait::async_trait]
pub trait StreamingGeneration: Send + Sync {
    /// Generate text with streaming response.
    async fn generate_stream(&self, prompt: &str) -> Result<TokenStream>;

    /// Model identifier, for logging.
    fn model_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(buffer: &mut SseBuffer, input: &str) -> Vec<String> {
        buffer
            .push(input.as_bytes())
            .into_iter()
            .map(|r| r.unwrap())
            .collect()
    }

    #[test]
    fn test_parse_line_with_content() {
        let line = r#"data: {"id":"test","choices":[{"index":0,"delta":{"content":"Hello"},"finish_reason":null}]}"#;
        assert!(matches!(parse_sse_line(line), SseLine::Token(t) if t == "Hello"));
    }

    #[test]
    fn test_parse_line_done() {
        assert!(matches!(parse_sse_line("data: [DONE]"), SseLine::Done));
    }

    #[test]
    fn test_parse_line_role_only() {
        let line = r#"data: {"id":"test","choices":[{"index":0,"delta":{"role":"assistant"},"finish_reason":null}]}"#;
        assert!(matches!(parse_sse_line(line), SseLine::Skip));
    }

    #[test]
    fn test_parse_line_comment_and_empty() {
        assert!(matches!(parse_sse_line(": keep-alive"), SseLine::Skip));
        assert!(matches!(parse_sse_line(""), SseLine::Skip));
    }

    #[test]
    fn test_parse_line_invalid_json() {
        assert!(matches!(
            parse_sse_line("data: {invalid json}"),
            SseLine::Error(Error::Inference(_))
        ));
    }

    #[test]
    fn test_buffer_joins_line_split_across_chunks() {
        let mut buffer = SseBuffer::default();
        let line = "data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"🎯 PRIORITY\"},\"finish_reason\":null}]}\n\n";
        let (a, b) = line.split_at(25);
        assert!(tokens(&mut buffer, a).is_empty());
        assert_eq!(tokens(&mut buffer, b), vec!["🎯 PRIORITY".to_string()]);
    }

    #[test]
    fn test_buffer_emoji_split_inside_line() {
        let mut buffer = SseBuffer::default();
        let line = "data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"💡\"},\"finish_reason\":null}]}\n";
        let bytes = line.as_bytes();
        let cut = line.find('💡').unwrap() + 2;
        assert!(buffer.push(&bytes[..cut]).is_empty());
        let out: Vec<String> = buffer
            .push(&bytes[cut..])
            .into_iter()
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(out, vec!["💡".to_string()]);
    }

    #[test]
    fn test_buffer_stops_after_done() {
        let mut buffer = SseBuffer::default();
        let input = concat!(
            "data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"a\"},\"finish_reason\":null}]}\n\n",
            "data: [DONE]\n\n",
            "data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"late\"},\"finish_reason\":null}]}\n\n",
        );
        assert_eq!(tokens(&mut buffer, input), vec!["a".to_string()]);
        assert!(buffer.push(b"data: anything\n").is_empty());
    }

    #[tokio::test]
    async fn test_parse_sse_stream_orders_tokens() {
        let body = concat!(
            "data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"Hello\"},\"finish_reason\":null}]}\n\n",
            "data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\" World\"},\"finish_reason\":\"stop\"}]}\n\n",
            "data: [DONE]\n\n",
        );
        let chunks: Vec<std::result::Result<bytes::Bytes, reqwest::Error>> = body
            .as_bytes()
            .chunks(7)
            .map(|c| Ok(bytes::Bytes::copy_from_slice(c)))
            .collect();

        let out: Vec<String> = parse_sse_stream(stream::iter(chunks))
            .map(|r| r.unwrap())
            .collect()
            .await;
        assert_eq!(out.concat(), "Hello World");
    }
}
