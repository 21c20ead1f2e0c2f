//! # jotwise-enhance
//!
//! Turns a streamed AI completion into a clean, validated three-section
//! note enhancement.
//!
//! The pipeline is:
//!
//! 1. [`decoder`]: incremental UTF-8 decoding and accumulation of the raw stream
//! 2. [`strip`]: ordered removal of data-stream framing
//! 3. [`normalize`]: whitespace canonicalization
//! 4. [`validate`]: structural check for the three section markers
//!
//! [`cycle`] drives one enhancement end to end (request, stream, clean,
//! persist) as an explicit state machine, [`gate`] keeps at most one cycle
//! per note in flight, and [`client`] is the HTTP completion source.

pub mod client;
pub mod cycle;
pub mod decoder;
pub mod extract;
pub mod gate;
pub mod normalize;
pub mod rules;
pub mod strip;
pub mod validate;

pub use client::{CompletionClientConfig, HttpCompletionSource};
pub use cycle::{
    CycleOutcome, CyclePhase, CycleRequest, CycleView, EnhancementCycle, FailureNotice,
};
pub use decoder::{accumulate, AccumulatedText, Utf8StreamDecoder};
pub use extract::{
    extract, extract_and_clean, extract_staged, CleanedDocument, CleaningFailure, CleaningStage,
};
pub use gate::{InFlightGuard, InFlightNotes};
pub use normalize::normalize;
pub use strip::{stream_error, strip_artifacts};
pub use validate::validate;
