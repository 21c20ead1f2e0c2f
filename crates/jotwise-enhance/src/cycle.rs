//! The enhancement cycle: request, stream, clean, validate, persist.
//!
//! One cycle runs per enhance action. Progress is published through a
//! `watch` channel carrying a [`CycleView`]; the cycle itself resolves to
//! exactly one [`CycleOutcome`]. Dropping the future returned by
//! [`EnhancementCycle::run`] cancels the cycle: the completion stream is
//! closed, the partial text is discarded, nothing is persisted and the
//! view falls back to the last persisted summary.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::watch;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use jotwise_core::{CompletionSource, Error, Note, Result, SummaryWriter};

use crate::decoder::accumulate;
use crate::extract::{extract_staged, CleanedDocument, CleaningFailure, CleaningStage};
use crate::strip::stream_error;

// =============================================================================
// PHASES
// =============================================================================

/// Where a cycle currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CyclePhase {
    Idle,
    Requesting,
    Streaming,
    StreamComplete,
    Stripping,
    Normalizing,
    Validating,
    Succeeded,
    Failed,
}

impl CyclePhase {
    /// Whether moving from `self` to `next` is a legal transition.
    pub fn can_advance_to(self, next: CyclePhase) -> bool {
        use CyclePhase::*;
        match (self, next) {
            (Idle, Requesting)
            | (Requesting, Streaming)
            | (Streaming, StreamComplete)
            | (StreamComplete, Stripping)
            | (Stripping, Normalizing)
            | (Normalizing, Validating)
            | (Validating, Succeeded) => true,
            (from, Failed) => !from.is_terminal(),
            _ => false,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, CyclePhase::Succeeded | CyclePhase::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CyclePhase::Idle => "idle",
            CyclePhase::Requesting => "requesting",
            CyclePhase::Streaming => "streaming",
            CyclePhase::StreamComplete => "stream_complete",
            CyclePhase::Stripping => "stripping",
            CyclePhase::Normalizing => "normalizing",
            CyclePhase::Validating => "validating",
            CyclePhase::Succeeded => "succeeded",
            CyclePhase::Failed => "failed",
        }
    }
}

impl From<CleaningStage> for CyclePhase {
    fn from(stage: CleaningStage) -> Self {
        match stage {
            CleaningStage::Stripping => CyclePhase::Stripping,
            CleaningStage::Normalizing => CyclePhase::Normalizing,
            CleaningStage::Validating => CyclePhase::Validating,
        }
    }
}

impl std::fmt::Display for CyclePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Enforces legal phase transitions for one cycle.
#[derive(Debug)]
struct PhaseTracker {
    note_id: Uuid,
    phase: CyclePhase,
}

impl PhaseTracker {
    fn new(note_id: Uuid) -> Self {
        Self {
            note_id,
            phase: CyclePhase::Idle,
        }
    }

    fn advance(&mut self, next: CyclePhase) -> Result<()> {
        if !self.phase.can_advance_to(next) {
            error!(
                subsystem = "enhance",
                component = "cycle",
                note_id = %self.note_id,
                from = %self.phase,
                to = %next,
                "Illegal cycle transition"
            );
            return Err(Error::Internal(format!(
                "illegal cycle transition {} -> {}",
                self.phase, next
            )));
        }
        debug!(
            subsystem = "enhance",
            component = "cycle",
            note_id = %self.note_id,
            phase = %next,
            "Cycle phase"
        );
        self.phase = next;
        Ok(())
    }

    fn fail(&mut self) {
        if self.phase.can_advance_to(CyclePhase::Failed) {
            self.phase = CyclePhase::Failed;
        }
    }
}

// =============================================================================
// VIEW AND OUTCOME
// =============================================================================

/// What a note's enhancement panel shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleView {
    pub is_summarizing: bool,
    pub current_summary: Option<String>,
}

impl CycleView {
    /// Resting view for a note with the given persisted summary.
    pub fn idle(persisted_summary: Option<String>) -> Self {
        Self {
            is_summarizing: false,
            current_summary: persisted_summary,
        }
    }
}

/// User-facing reason a cycle failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureNotice {
    /// The note has no content; no request was issued.
    EmptyInput,
    /// The completion could not be opened or read.
    Stream(String),
    /// The completion could not be cleaned into a complete document.
    Unprocessable,
    /// The cleaned document could not be saved.
    SaveFailed(String),
}

impl std::fmt::Display for FailureNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureNotice::EmptyInput => f.write_str("Cannot summarize empty note."),
            FailureNotice::Stream(msg) => write!(f, "Failed to Summarize: {}", msg),
            FailureNotice::Unprocessable => f.write_str("AI summary could not be processed."),
            FailureNotice::SaveFailed(msg) => write!(f, "Failed to Save Summary: {}", msg),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    Succeeded(CleanedDocument),
    Failed(FailureNotice),
}

impl CycleOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CycleOutcome::Succeeded(_))
    }
}

/// Inputs of one cycle, taken from the note at the time of the request.
#[derive(Debug, Clone)]
pub struct CycleRequest {
    pub note_id: Uuid,
    pub content: String,
    pub persisted_summary: Option<String>,
}

impl From<&Note> for CycleRequest {
    fn from(note: &Note) -> Self {
        Self {
            note_id: note.id,
            content: note.content.clone(),
            persisted_summary: note.summary.clone(),
        }
    }
}

/// Puts the view back to the persisted summary unless the cycle succeeded.
/// Runs on every exit path, including cancellation.
struct ViewReset<'a> {
    view: &'a watch::Sender<CycleView>,
    fallback: Option<String>,
    armed: bool,
}

impl<'a> ViewReset<'a> {
    fn start(view: &'a watch::Sender<CycleView>, fallback: Option<String>) -> Self {
        view.send_replace(CycleView {
            is_summarizing: true,
            current_summary: Some(String::new()),
        });
        Self {
            view,
            fallback,
            armed: true,
        }
    }

    fn succeed(mut self, summary: String) {
        self.armed = false;
        self.view.send_replace(CycleView {
            is_summarizing: false,
            current_summary: Some(summary),
        });
    }
}

impl Drop for ViewReset<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.view.send_replace(CycleView::idle(self.fallback.take()));
        }
    }
}

// =============================================================================
// CYCLE
// =============================================================================

/// Runs enhancement cycles against a completion source, writing successful
/// results back through a summary writer.
#[derive(Clone)]
pub struct EnhancementCycle {
    source: Arc<dyn CompletionSource>,
    writer: Arc<dyn SummaryWriter>,
}

impl EnhancementCycle {
    pub fn new(source: Arc<dyn CompletionSource>, writer: Arc<dyn SummaryWriter>) -> Self {
        Self { source, writer }
    }

    /// Run one cycle to completion, publishing progress to `view`.
    pub async fn run(
        &self,
        request: CycleRequest,
        view: &watch::Sender<CycleView>,
    ) -> CycleOutcome {
        let start = Instant::now();
        let note_id = request.note_id;
        let mut phases = PhaseTracker::new(note_id);

        if request.content.trim().is_empty() {
            phases.fail();
            info!(
                subsystem = "enhance",
                component = "cycle",
                note_id = %note_id,
                "Enhancement rejected: empty note"
            );
            return CycleOutcome::Failed(FailureNotice::EmptyInput);
        }

        info!(
            subsystem = "enhance",
            component = "cycle",
            op = "enhance",
            note_id = %note_id,
            prompt_len = request.content.len(),
            "Enhancement started"
        );

        let reset = ViewReset::start(view, request.persisted_summary.clone());

        let outcome = match self.clean(&mut phases, &request.content).await {
            Ok(document) => match self.writer.update_summary(note_id, document.as_str()).await {
                Ok(()) => {
                    // The summary is persisted; an illegal transition is
                    // logged by advance() and does not change the outcome.
                    let _ = phases.advance(CyclePhase::Succeeded);
                    reset.succeed(document.as_str().to_string());
                    CycleOutcome::Succeeded(document)
                }
                Err(e) => {
                    error!(
                        subsystem = "enhance",
                        component = "cycle",
                        note_id = %note_id,
                        error = %e,
                        "Failed to save summary"
                    );
                    phases.fail();
                    CycleOutcome::Failed(FailureNotice::SaveFailed(e.to_string()))
                }
            },
            Err(notice) => {
                phases.fail();
                CycleOutcome::Failed(notice)
            }
        };

        info!(
            subsystem = "enhance",
            component = "cycle",
            op = "enhance",
            note_id = %note_id,
            phase = %phases.phase,
            success = outcome.is_success(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Enhancement finished"
        );

        outcome
    }

    /// Request, stream and clean; everything short of persisting.
    async fn clean(
        &self,
        phases: &mut PhaseTracker,
        content: &str,
    ) -> std::result::Result<CleanedDocument, FailureNotice> {
        let stream_failed = |e: Error| {
            warn!(
                subsystem = "enhance",
                component = "cycle",
                error = %e,
                "Completion stream failed"
            );
            FailureNotice::Stream(e.to_string())
        };

        phases.advance(CyclePhase::Requesting).map_err(stream_failed)?;
        let stream = self.source.open(content).await.map_err(stream_failed)?;

        phases.advance(CyclePhase::Streaming).map_err(stream_failed)?;
        let raw = accumulate(stream).await.map_err(stream_failed)?.into_string();

        if let Some(message) = stream_error(&raw) {
            return Err(stream_failed(Error::Transport {
                status: None,
                message,
            }));
        }

        phases.advance(CyclePhase::StreamComplete).map_err(stream_failed)?;
        let cleaned = extract_staged(&raw, |stage| phases.advance(stage.into()))
            .map_err(stream_failed)?;

        cleaned.map_err(|failure| {
            warn!(
                subsystem = "enhance",
                component = "cycle",
                reason = %failure,
                response_len = raw.len(),
                "Completion could not be processed"
            );
            match failure {
                CleaningFailure::StreamError(message) => FailureNotice::Stream(message),
                _ => FailureNotice::Unprocessable,
            }
        })
    }
}
