//! OpenAPI document, served at `/openapi.json`.

use axum::{response::IntoResponse, Json};
use utoipa::OpenApi;

use jotwise_core::{CreateNoteRequest, Note, UpdateNoteRequest};

use crate::handlers::{enhance, health, notes, summarize};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Jotwise API",
        description = "Notes with AI-generated priority lists, summaries and productivity tips"
    ),
    paths(
        health::health_check,
        notes::list_notes,
        notes::create_note,
        notes::get_note,
        notes::update_note,
        notes::delete_note,
        notes::put_summary,
        summarize::summarize,
        enhance::enhance_note,
    ),
    components(schemas(
        Note,
        CreateNoteRequest,
        UpdateNoteRequest,
        notes::SummaryBody,
        summarize::SummarizeRequest,
        enhance::EnhanceResponse,
        enhance::EnhanceSections,
    )),
    tags(
        (name = "System", description = "Health"),
        (name = "Notes", description = "Note CRUD operations"),
        (name = "Enhancement", description = "AI enhancement of note content"),
    )
)]
pub struct ApiDoc;

pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
