//! Bearer token lookup.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::StoreError;

/// A registered client of the log server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    /// Display name, used in notification emails
    pub name: String,
    /// Storage key prefix for this application's dumps
    pub prefix: String,
}

/// Read-only mapping from bearer token to [`Application`].
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Resolve a token. `Ok(None)` means the token is not registered.
    async fn get(&self, token: &str) -> Result<Option<Application>, StoreError>;
}

/// Token store held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    tokens: HashMap<String, Application>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `token` for `application`, replacing any previous entry.
    pub fn insert(&mut self, token: impl Into<String>, application: Application) {
        self.tokens.insert(token.into(), application);
    }
}

impl FromIterator<(String, Application)> for MemoryTokenStore {
    fn from_iter<I: IntoIterator<Item = (String, Application)>>(iter: I) -> Self {
        Self {
            tokens: iter.into_iter().collect(),
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn get(&self, token: &str) -> Result<Option<Application>, StoreError> {
        Ok(self.tokens.get(token).cloned())
    }
}

/// Token store backed by a JSON file of the form
/// `{ "<token>": { "name": "...", "prefix": "..." } }`.
///
/// The file is re-read on every lookup so tokens can be rotated without
/// restarting the server.
#[derive(Debug, Clone)]
pub struct JsonFileTokenStore {
    path: PathBuf,
}

impl JsonFileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl TokenStore for JsonFileTokenStore {
    async fn get(&self, token: &str) -> Result<Option<Application>, StoreError> {
        let raw = tokio::fs::read(&self.path).await?;
        let mut tokens: HashMap<String, Application> = serde_json::from_slice(&raw)?;

        debug!(
            path = %self.path.display(),
            registered = tokens.len(),
            "token_file_loaded"
        );

        Ok(tokens.remove(token))
    }
}
