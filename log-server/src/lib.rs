//! Log Server - authenticated log dump ingestion.
//!
//! A client presents a bearer token, the server resolves it to an
//! application, stores the request body under a fresh correlation id and
//! (in notify mode) emails a short summary.
//!
//! ## Architecture
//!
//! ```text
//! PUT /dump → CORS → verify bearer token → put_dump → BlobStore (+ Mailer)
//! ```

pub mod config;
pub mod notify;
pub mod store;
pub mod util;
pub mod web;

// Re-export commonly used types
pub use config::{Config, ConfigError, DumpMode};
pub use notify::{MailgunMailer, Mailer, Notification, NotifyError};
pub use store::{
    Application, BlobStore, FsBlobStore, JsonFileTokenStore, MemoryBlobStore, MemoryTokenStore,
    StoreError, TokenStore,
};
pub use web::{router, AppState};
