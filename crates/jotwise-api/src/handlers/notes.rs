//! Note CRUD handlers. Every route acts on the caller's own notes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use jotwise_core::{CreateNoteRequest, Note, UpdateNoteRequest};

use crate::{auth::AuthUser, error::ApiError, state::AppState};

/// Body of `PUT /api/notes/:id/summary`.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SummaryBody {
    pub summary: String,
}

/// List the caller's notes, newest first.
#[utoipa::path(get, path = "/api/notes", tag = "Notes",
    responses((status = 200, description = "Notes, newest first", body = [Note]),
              (status = 401, description = "No valid session")))]
pub async fn list_notes(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<Note>>, ApiError> {
    let notes = state.notes.list(user.id()).await?;
    Ok(Json(notes))
}

#[utoipa::path(post, path = "/api/notes", tag = "Notes",
    request_body = CreateNoteRequest,
    responses((status = 201, description = "Created", body = Note),
              (status = 400, description = "Invalid title or content")))]
pub async fn create_note(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateNoteRequest>,
) -> Result<(StatusCode, Json<Note>), ApiError> {
    req.validate()?;
    let note = state.notes.insert(user.id(), req).await?;
    Ok((StatusCode::CREATED, Json(note)))
}

#[utoipa::path(get, path = "/api/notes/{id}", tag = "Notes",
    params(("id" = Uuid, Path, description = "Note id")),
    responses((status = 200, body = Note), (status = 404, description = "Not found")))]
pub async fn get_note(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Note>, ApiError> {
    Ok(Json(state.notes.fetch(user.id(), id).await?))
}

#[utoipa::path(patch, path = "/api/notes/{id}", tag = "Notes",
    params(("id" = Uuid, Path, description = "Note id")),
    request_body = UpdateNoteRequest,
    responses((status = 200, body = Note), (status = 404, description = "Not found")))]
pub async fn update_note(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateNoteRequest>,
) -> Result<Json<Note>, ApiError> {
    req.validate()?;
    Ok(Json(state.notes.update(user.id(), id, req).await?))
}

#[utoipa::path(delete, path = "/api/notes/{id}", tag = "Notes",
    params(("id" = Uuid, Path, description = "Note id")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not found")))]
pub async fn delete_note(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.notes.delete(user.id(), id).await?;
    info!(subsystem = "api", component = "notes", note_id = %id, "Note deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Store a summary produced client-side.
#[utoipa::path(put, path = "/api/notes/{id}/summary", tag = "Notes",
    params(("id" = Uuid, Path, description = "Note id")),
    request_body = SummaryBody,
    responses((status = 200, body = Note), (status = 404, description = "Not found")))]
pub async fn put_summary(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<SummaryBody>,
) -> Result<Json<Note>, ApiError> {
    Ok(Json(
        state
            .notes
            .update_summary(user.id(), id, &body.summary)
            .await?,
    ))
}
