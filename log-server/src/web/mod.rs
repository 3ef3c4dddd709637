//! Web server module for the dump endpoint.
//!
//! Requests pass through an explicit middleware chain:
//!
//! ```text
//! CORS (answers preflights) → trace → require_application → route
//! ```
//!
//! `/health` is mounted outside the verification layer.

pub mod auth;
pub mod envelope;
pub mod handlers;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use auth::{bearer_token, require_application, verify, AuthError, Verified, VerifyError};
pub use envelope::{Envelope, ErrorCode, Failure, Success};
pub use handlers::{health, put_dump, AppState, DumpError, DumpResponse, HealthResponse};

/// Build the complete application router.
pub fn router(state: AppState) -> Router {
    let max_dump_bytes = state.config.max_dump_bytes;

    Router::new()
        .route("/dump", put(put_dump))
        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::max(max_dump_bytes))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_application,
        ))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
