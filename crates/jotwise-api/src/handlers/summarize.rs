//! `POST /api/summarize`: stream an enhancement as a data stream.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tracing::error;

use jotwise_core::Error;
use jotwise_inference::summarize::GENERATION_FAILED;
use jotwise_inference::{DATA_STREAM_HEADER, DATA_STREAM_VERSION};

use crate::state::AppState;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SummarizeRequest {
    #[serde(default)]
    pub content: Option<String>,
}

fn json_error(status: StatusCode, body: serde_json::Value) -> Response {
    (status, Json(body)).into_response()
}

#[utoipa::path(post, path = "/api/summarize", tag = "Enhancement",
    request_body = SummarizeRequest,
    responses(
        (status = 200, description = "Data stream of the generated enhancement", body = String, content_type = "text/plain"),
        (status = 400, description = "Content is required"),
        (status = 500, description = "Failed to generate summary")))]
pub async fn summarize(
    State(state): State<AppState>,
    Json(req): Json<SummarizeRequest>,
) -> Response {
    let content = req.content.unwrap_or_default();

    match state.summarize.stream(&content).await {
        Ok(stream) => {
            let mut response = Response::new(Body::from_stream(stream));
            let headers = response.headers_mut();
            headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain; charset=utf-8"),
            );
            headers.insert(
                DATA_STREAM_HEADER,
                HeaderValue::from_static(DATA_STREAM_VERSION),
            );
            response
        }
        Err(Error::InvalidInput(msg)) => {
            json_error(StatusCode::BAD_REQUEST, serde_json::json!({ "error": msg }))
        }
        Err(e) => {
            error!(subsystem = "api", component = "summarize", error = %e, "/api/summarize failed");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({ "error": GENERATION_FAILED, "details": e.to_string() }),
            )
        }
    }
}
