//! `POST /api/notes/:id/enhance`: run a full enhancement cycle server-side.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use tokio::sync::watch;
use uuid::Uuid;

use jotwise_core::{NoteRepository, Result, Section, SummaryWriter};
use jotwise_enhance::{CycleOutcome, CycleRequest, CycleView, EnhancementCycle, FailureNotice};

use crate::{auth::AuthUser, error::ApiError, state::AppState};

/// Writes summaries on behalf of one user.
struct UserSummaryWriter {
    notes: Arc<dyn NoteRepository>,
    user_id: Uuid,
}

#[async_trait]
impl SummaryWriter for UserSummaryWriter {
    async fn update_summary(&self, note_id: Uuid, summary: &str) -> Result<()> {
        self.notes
            .update_summary(self.user_id, note_id, summary)
            .await
            .map(|_| ())
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct EnhanceSections {
    pub priority_tasks: String,
    pub summary: String,
    pub productivity_tip: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct EnhanceResponse {
    /// The cleaned document, now stored as the note's summary.
    pub summary: String,
    pub sections: EnhanceSections,
}

#[utoipa::path(post, path = "/api/notes/{id}/enhance", tag = "Enhancement",
    params(("id" = Uuid, Path, description = "Note id")),
    responses(
        (status = 200, description = "Enhancement saved", body = EnhanceResponse),
        (status = 400, description = "Note has no content"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Enhancement already running for this note"),
        (status = 422, description = "Completion failed or could not be processed")))]
pub async fn enhance_note(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> std::result::Result<Json<EnhanceResponse>, ApiError> {
    let note = state.notes.fetch(user.id(), id).await?;
    let _guard = state.in_flight.try_acquire(note.id)?;

    let writer = Arc::new(UserSummaryWriter {
        notes: state.notes.clone(),
        user_id: user.id(),
    });
    let cycle = EnhancementCycle::new(Arc::new(state.summarize.clone()), writer);
    let (view, _) = watch::channel(CycleView::idle(note.summary.clone()));

    match cycle.run(CycleRequest::from(&note), &view).await {
        CycleOutcome::Succeeded(document) => Ok(Json(EnhanceResponse {
            sections: EnhanceSections {
                priority_tasks: document.section(Section::PriorityTasks).to_string(),
                summary: document.section(Section::Summary).to_string(),
                productivity_tip: document.section(Section::ProductivityTip).to_string(),
            },
            summary: document.into_string(),
        })),
        CycleOutcome::Failed(FailureNotice::EmptyInput) => {
            Err(ApiError::BadRequest(FailureNotice::EmptyInput.to_string()))
        }
        CycleOutcome::Failed(notice @ FailureNotice::SaveFailed(_)) => Err(ApiError::Internal(
            jotwise_core::Error::Internal(notice.to_string()),
        )),
        CycleOutcome::Failed(notice) => Err(ApiError::Unprocessable(notice.to_string())),
    }
}
