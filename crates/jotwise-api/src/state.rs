//! Shared application state.

use std::sync::Arc;

use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    RateLimiter,
};

use jotwise_core::{NoteRepository, SessionGateway};
use jotwise_enhance::InFlightNotes;
use jotwise_inference::SummarizeService;

/// Global rate limiter type (direct quota, no per-client buckets).
pub type GlobalRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub notes: Arc<dyn NoteRepository>,
    pub sessions: Arc<dyn SessionGateway>,
    pub summarize: SummarizeService,
    /// Notes with a server-side enhancement running.
    pub in_flight: InFlightNotes,
    /// `None` when rate limiting is disabled.
    pub rate_limiter: Option<Arc<GlobalRateLimiter>>,
}

impl AppState {
    pub fn new(
        notes: Arc<dyn NoteRepository>,
        sessions: Arc<dyn SessionGateway>,
        summarize: SummarizeService,
    ) -> Self {
        Self {
            notes,
            sessions,
            summarize,
            in_flight: InFlightNotes::new(),
            rate_limiter: None,
        }
    }

    pub fn with_rate_limiter(mut self, limiter: Option<Arc<GlobalRateLimiter>>) -> Self {
        self.rate_limiter = limiter;
        self
    }
}
