//! Core data models for jotwise.
//!
//! These types are shared across all jotwise crates and represent
//! the core domain entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// NOTE TYPES
// =============================================================================

/// Maximum title length accepted on create/update.
pub const MAX_TITLE_CHARS: usize = 200;

/// A user's note. The `summary` field holds the last persisted AI
/// enhancement, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, utoipa::ToSchema)]
pub struct Note {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    pub summary: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Note {
    /// Whether the note has any content worth enhancing.
    pub fn has_content(&self) -> bool {
        !self.content.trim().is_empty()
    }
}

/// Request for creating a new note.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CreateNoteRequest {
    pub title: String,
    pub content: String,
}

impl CreateNoteRequest {
    /// Validate title and content before any persistence call.
    pub fn validate(&self) -> crate::Result<()> {
        validate_title(&self.title)?;
        if self.content.trim().is_empty() {
            return Err(crate::Error::InvalidInput("Content is required".to_string()));
        }
        Ok(())
    }
}

/// Partial update of a note's editable fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UpdateNoteRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl UpdateNoteRequest {
    pub fn validate(&self) -> crate::Result<()> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        if self.title.is_none() && self.content.is_none() {
            return Err(crate::Error::InvalidInput(
                "Nothing to update: provide title or content".to_string(),
            ));
        }
        Ok(())
    }
}

fn validate_title(title: &str) -> crate::Result<()> {
    let len = title.trim().chars().count();
    if len == 0 {
        return Err(crate::Error::InvalidInput("Title is required".to_string()));
    }
    if len > MAX_TITLE_CHARS {
        return Err(crate::Error::InvalidInput(format!(
            "Title must be at most {} characters",
            MAX_TITLE_CHARS
        )));
    }
    Ok(())
}

// =============================================================================
// SESSION TYPES
// =============================================================================

/// The user a session token resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}
