//! # jotwise-api
//!
//! HTTP server for jotwise: note CRUD scoped to the session's user, the
//! streaming `/api/summarize` endpoint, and server-side enhancement.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod state;

use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

pub use auth::{AuthUser, HostedSessionGateway};
pub use config::ServerConfig;
pub use error::ApiError;
pub use state::{AppState, GlobalRateLimiter};

use handlers::{enhance, health, notes, summarize};
use middleware::{rate_limit_middleware, MakeRequestUuidV7};

/// Default request body limit.
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// Build the application router.
pub fn router(state: AppState, allowed_origins: Vec<HeaderValue>, body_limit: usize) -> Router {
    let api = Router::new()
        .route("/api/summarize", post(summarize::summarize))
        .route("/api/notes", get(notes::list_notes).post(notes::create_note))
        .route(
            "/api/notes/:id",
            get(notes::get_note)
                .patch(notes::update_note)
                .delete(notes::delete_note),
        )
        .route("/api/notes/:id/summary", put(notes::put_summary))
        .route("/api/notes/:id/enhance", post(enhance::enhance_note))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    Router::new()
        .route("/health", get(health::health_check))
        .route("/openapi.json", get(openapi::openapi_json))
        .merge(api)
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(allowed_origins))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
                .allow_credentials(true)
                .max_age(Duration::from_secs(3600)),
        )
        .layer(RequestBodyLimitLayer::new(body_limit))
        .with_state(state)
}
