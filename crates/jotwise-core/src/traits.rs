//! Core traits for jotwise abstractions.
//!
//! These traits define the interfaces to every external collaborator
//! (table store, completion transport, session service), enabling
//! pluggable backends and substitution of fakes in tests.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// NOTE REPOSITORY TRAITS
// =============================================================================

/// Repository for note CRUD operations.
///
/// Every operation is scoped to `user_id`: a note owned by someone else
/// behaves exactly like a missing note.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// List the user's notes, newest first.
    async fn list(&self, user_id: Uuid) -> Result<Vec<Note>>;

    /// Fetch one note.
    async fn fetch(&self, user_id: Uuid, id: Uuid) -> Result<Note>;

    /// Insert a new note and return it.
    async fn insert(&self, user_id: Uuid, req: CreateNoteRequest) -> Result<Note>;

    /// Apply a partial update and return the updated note.
    async fn update(&self, user_id: Uuid, id: Uuid, req: UpdateNoteRequest) -> Result<Note>;

    /// Permanently delete a note.
    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<()>;

    /// Replace the note's summary and return the updated note.
    async fn update_summary(&self, user_id: Uuid, id: Uuid, summary: &str) -> Result<Note>;
}

/// Write-back target for a successful enhancement cycle.
#[async_trait]
pub trait SummaryWriter: Send + Sync {
    async fn update_summary(&self, note_id: Uuid, summary: &str) -> Result<()>;
}

// =============================================================================
// COMPLETION TRANSPORT
// =============================================================================

/// Raw byte chunks of a streamed completion, in arrival order.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// Opens a streamed completion for a note's content.
///
/// Implementations must not hand back a stream for a non-success
/// response: that case is an `Error::Transport` carrying the status and
/// the server's message.
#[async_trait]
pub trait CompletionSource: Send + Sync {
    async fn open(&self, content: &str) -> Result<ByteStream>;
}

// =============================================================================
// SESSION GATEWAY
// =============================================================================

/// Resolves a session access token to the user it belongs to.
#[async_trait]
pub trait SessionGateway: Send + Sync {
    /// Returns `Error::Unauthorized` for unknown or expired tokens.
    async fn resolve(&self, access_token: &str) -> Result<SessionUser>;
}
