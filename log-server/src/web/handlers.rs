//! Endpoint handlers.
//!
//! The dump handler only:
//! 1. Mints a correlation id for the verified application
//! 2. Stores the raw body under that id
//! 3. Optionally emails a notification
//! 4. Returns the correlation id
//!
//! Authentication has already happened in [`crate::web::auth`].

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::notify::{parse_frontmatter, Mailer, Notification};
use crate::store::{Application, BlobStore, StoreError, TokenStore};
use crate::util::correlation_id;
use crate::web::auth::Verified;
use crate::web::envelope::Envelope;
use crate::Config;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub tokens: Arc<dyn TokenStore>,
    pub blobs: Arc<dyn BlobStore>,
    pub mailer: Option<Arc<dyn Mailer>>,
    /// Await notifications inside the request instead of spawning them.
    pub inline_notifications: bool,
}

impl AppState {
    pub fn new(config: Config, tokens: Arc<dyn TokenStore>, blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            config: Arc::new(config),
            tokens,
            blobs,
            mailer: None,
            inline_notifications: false,
        }
    }

    /// Attach the mailer used for dump notifications.
    pub fn with_mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.mailer = Some(mailer);
        self
    }

    /// Send notifications before responding, so the mailer has been called
    /// by the time the response is returned.
    pub fn with_inline_notifications(mut self) -> Self {
        self.inline_notifications = true;
        self
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Fallback for unmatched routes (reached only after verification).
pub async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

// =============================================================================
// Dump
// =============================================================================

/// Payload of a successful `PUT /dump`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DumpResponse {
    pub correlation: String,
}

/// Failures that abort a dump.
#[derive(Debug, Error)]
pub enum DumpError {
    #[error("failed to store dump {correlation}: {source}")]
    Store {
        correlation: String,
        #[source]
        source: StoreError,
    },
}

impl IntoResponse for DumpError {
    fn into_response(self) -> Response {
        error!(error = %self, "dump_store_failed");
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    }
}

/// Dump endpoint.
///
/// The write is unconditional; correlation ids are random enough that an
/// existing key is not checked for.
pub async fn put_dump(
    State(state): State<AppState>,
    verified: Verified,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Envelope<DumpResponse>, DumpError> {
    let application = verified.application();
    let correlation = correlation_id(&application.prefix, state.config.mode.separator());

    info!(
        application = %application.name,
        correlation = %correlation,
        body_length = body.len(),
        "dump_received"
    );

    state
        .blobs
        .put(&correlation, body)
        .await
        .map_err(|source| DumpError::Store {
            correlation: correlation.clone(),
            source,
        })?;

    info!(correlation = %correlation, "dump_stored");

    if state.config.mode.notifies() {
        notify_dump(&state, application, &correlation, &headers).await;
    }

    Ok(Envelope::ok(DumpResponse { correlation }))
}

/// Email a notification for a stored dump.
///
/// Both failure points here are discarded on purpose: the dump is already
/// stored and the caller still gets its correlation id. The send runs on its
/// own task unless inline notifications are enabled.
async fn notify_dump(
    state: &AppState,
    application: &Application,
    correlation: &str,
    headers: &HeaderMap,
) {
    let Some(mailer) = state.mailer.as_ref() else {
        warn!(correlation = %correlation, "notify_mailer_missing");
        return;
    };

    let frontmatter = match parse_frontmatter(headers) {
        Ok(block) => block,
        Err(e) => {
            debug!(error = %e, correlation = %correlation, "frontmatter_parse_failed");
            String::new()
        }
    };

    let notification = Notification::for_dump(
        &state.config.notify_from,
        &state.config.notify_to,
        &application.name,
        correlation,
        &frontmatter,
    );

    let send = deliver(mailer.clone(), notification, correlation.to_string());
    if state.inline_notifications {
        send.await;
    } else {
        tokio::spawn(send);
    }
}

/// Send one notification, logging the outcome.
async fn deliver(mailer: Arc<dyn Mailer>, notification: Notification, correlation: String) {
    match mailer.send(&notification).await {
        Ok(()) => info!(correlation = %correlation, "notify_sent"),
        Err(e) => warn!(error = %e, correlation = %correlation, "notify_send_failed"),
    }
}
