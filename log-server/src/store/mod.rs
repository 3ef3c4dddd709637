//! Storage collaborators.
//!
//! This module provides:
//! - `TokenStore`: read-only lookup of bearer tokens to applications
//! - `BlobStore`: unconditional key/value writes for dump payloads
//!
//! Each trait has a file-backed implementation for running the server and an
//! in-memory implementation for embedding and tests.

pub mod blobs;
pub mod tokens;

use std::io;

use thiserror::Error;

pub use blobs::{BlobStore, FsBlobStore, MemoryBlobStore};
pub use tokens::{Application, JsonFileTokenStore, MemoryTokenStore, TokenStore};

/// Errors raised by storage backends.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage i/o failed: {0}")]
    Io(#[from] io::Error),

    #[error("stored record is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),
}
