use axum::{response::IntoResponse, Json};

#[utoipa::path(get, path = "/health", tag = "System",
    responses((status = 200, description = "Server is up")))]
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
