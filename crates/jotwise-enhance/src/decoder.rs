//! Incremental UTF-8 decoding of a streamed completion.
//!
//! Transports cut the byte stream wherever they like, including in the
//! middle of a multi-byte character (emoji headers are four bytes wide).
//! [`Utf8StreamDecoder`] holds back an incomplete trailing sequence and
//! completes it with the start of the next chunk, so decoding chunk by
//! chunk yields exactly what decoding the whole body at once would.

use std::time::Instant;

use futures::{Stream, StreamExt};
use tracing::{debug, trace};

use jotwise_core::{Error, Result};

/// The text decoded so far for one enhancement cycle.
///
/// Append-only while the stream is read; a fresh, empty buffer is created
/// for every cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccumulatedText(String);

impl AccumulatedText {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_str(&mut self, text: &str) {
        self.0.push_str(text);
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Stateful UTF-8 decoder that tolerates characters split across chunks.
#[derive(Debug, Default)]
pub struct Utf8StreamDecoder {
    /// Leading bytes of a character whose remaining bytes have not arrived.
    pending: Vec<u8>,
    /// Bytes consumed so far, for error offsets.
    consumed: usize,
}

impl Utf8StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode one chunk, returning all complete characters available.
    ///
    /// Fails on byte sequences that are invalid rather than merely
    /// incomplete.
    pub fn decode(&mut self, chunk: &[u8]) -> Result<String> {
        let mut buf = std::mem::take(&mut self.pending);
        buf.extend_from_slice(chunk);

        let valid_up_to = match std::str::from_utf8(&buf) {
            Ok(_) => buf.len(),
            Err(e) => match e.error_len() {
                Some(_) => {
                    return Err(Error::Decode(format!(
                        "invalid UTF-8 sequence at byte {}",
                        self.consumed + e.valid_up_to()
                    )))
                }
                // Incomplete character at the end of the buffer
                None => e.valid_up_to(),
            },
        };

        self.pending = buf.split_off(valid_up_to);
        self.consumed += valid_up_to;

        String::from_utf8(buf).map_err(|e| Error::Decode(e.to_string()))
    }

    /// Number of bytes held back waiting for the rest of a character.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Signal end-of-stream. Leftover bytes mean the stream was cut inside
    /// a character.
    pub fn finish(self) -> Result<()> {
        if self.pending.is_empty() {
            Ok(())
        } else {
            Err(Error::Decode(format!(
                "stream ended inside a multi-byte character ({} trailing bytes at byte {})",
                self.pending.len(),
                self.consumed
            )))
        }
    }
}

/// Read a byte stream to its end, decoding as it goes.
///
/// A transport error on any chunk aborts the read; no partial text is
/// returned in that case.
pub async fn accumulate<S, B>(mut stream: S) -> Result<AccumulatedText>
where
    S: Stream<Item = Result<B>> + Unpin,
    B: AsRef<[u8]>,
{
    let start = Instant::now();
    let mut decoder = Utf8StreamDecoder::new();
    let mut text = AccumulatedText::new();
    let mut chunk_count = 0usize;
    let mut byte_count = 0usize;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        let bytes = chunk.as_ref();
        chunk_count += 1;
        byte_count += bytes.len();

        let decoded = decoder.decode(bytes)?;
        trace!(
            subsystem = "enhance",
            component = "decoder",
            chunk = %decoded,
            pending = decoder.pending_len(),
            "Raw stream chunk"
        );
        text.push_str(&decoded);
    }

    decoder.finish()?;

    debug!(
        subsystem = "enhance",
        component = "decoder",
        op = "accumulate",
        chunk_count,
        byte_count,
        duration_ms = start.elapsed().as_millis() as u64,
        "Stream complete"
    );

    Ok(text)
}
