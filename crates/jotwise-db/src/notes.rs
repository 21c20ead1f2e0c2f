//! Note repository implementation.
//!
//! Every statement carries `user_id = $n` in its WHERE clause; a note that
//! belongs to another user is reported as `NoteNotFound`.

use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres};
use tracing::{debug, info};
use uuid::Uuid;

use jotwise_core::{
    CreateNoteRequest, Error, Note, NoteRepository, Result, UpdateNoteRequest,
};

const NOTE_COLUMNS: &str = "id, user_id, title, content, summary, created_at";

/// PostgreSQL implementation of NoteRepository.
#[derive(Clone)]
pub struct PgNoteRepository {
    pool: Pool<Postgres>,
}

impl PgNoteRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NoteRepository for PgNoteRepository {
    async fn list(&self, user_id: Uuid) -> Result<Vec<Note>> {
        let notes = sqlx::query_as::<_, Note>(&format!(
            "SELECT {NOTE_COLUMNS} FROM notes WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = "notes",
            op = "list",
            user_id = %user_id,
            result_count = notes.len(),
            "Listed notes"
        );
        Ok(notes)
    }

    async fn fetch(&self, user_id: Uuid, id: Uuid) -> Result<Note> {
        sqlx::query_as::<_, Note>(&format!(
            "SELECT {NOTE_COLUMNS} FROM notes WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?
        .ok_or(Error::NoteNotFound(id))
    }

    async fn insert(&self, user_id: Uuid, req: CreateNoteRequest) -> Result<Note> {
        let id = Uuid::now_v7();
        let note = sqlx::query_as::<_, Note>(&format!(
            "INSERT INTO notes (id, user_id, title, content, summary, created_at)
             VALUES ($1, $2, $3, $4, NULL, $5)
             RETURNING {NOTE_COLUMNS}"
        ))
        .bind(id)
        .bind(user_id)
        .bind(req.title.trim())
        .bind(&req.content)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        info!(
            subsystem = "db",
            component = "notes",
            op = "insert",
            note_id = %id,
            user_id = %user_id,
            "Note created"
        );
        Ok(note)
    }

    async fn update(&self, user_id: Uuid, id: Uuid, req: UpdateNoteRequest) -> Result<Note> {
        let title = req.title.as_deref().map(str::trim);
        sqlx::query_as::<_, Note>(&format!(
            "UPDATE notes
             SET title = COALESCE($1, title), content = COALESCE($2, content)
             WHERE id = $3 AND user_id = $4
             RETURNING {NOTE_COLUMNS}"
        ))
        .bind(title)
        .bind(req.content.as_deref())
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?
        .ok_or(Error::NoteNotFound(id))
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM notes WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NoteNotFound(id));
        }

        info!(
            subsystem = "db",
            component = "notes",
            op = "delete",
            note_id = %id,
            user_id = %user_id,
            "Note deleted"
        );
        Ok(())
    }

    async fn update_summary(&self, user_id: Uuid, id: Uuid, summary: &str) -> Result<Note> {
        let start = Instant::now();
        let note = sqlx::query_as::<_, Note>(&format!(
            "UPDATE notes SET summary = $1 WHERE id = $2 AND user_id = $3
             RETURNING {NOTE_COLUMNS}"
        ))
        .bind(summary)
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?
        .ok_or(Error::NoteNotFound(id))?;

        info!(
            subsystem = "db",
            component = "notes",
            op = "update_summary",
            note_id = %id,
            user_id = %user_id,
            response_len = summary.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Note summary saved"
        );
        Ok(note)
    }
}
