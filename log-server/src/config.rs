//! Configuration module for environment variable parsing.
//!
//! Reads all configuration from environment variables, falling back to
//! defaults suitable for local development.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;
use tracing::warn;

use crate::notify::DEFAULT_BASE_URL;

/// How dumps are keyed and whether a notification is sent for each one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DumpMode {
    /// Store only; correlation ids use `_` as separator.
    #[default]
    Plain,
    /// Store and email a notification; correlation ids use `/` as separator.
    Notify,
}

impl DumpMode {
    /// Separator between the application prefix and the random id.
    pub fn separator(self) -> char {
        match self {
            DumpMode::Plain => '_',
            DumpMode::Notify => '/',
        }
    }

    pub fn notifies(self) -> bool {
        matches!(self, DumpMode::Notify)
    }
}

impl FromStr for DumpMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" => Ok(DumpMode::Plain),
            "notify" => Ok(DumpMode::Notify),
            _ => Err(ConfigError::InvalidMode(s.to_string())),
        }
    }
}

impl fmt::Display for DumpMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DumpMode::Plain => f.write_str("plain"),
            DumpMode::Notify => f.write_str("notify"),
        }
    }
}

/// Configuration problems detected at startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown LOG_SERVER_MODE {0:?}, expected \"plain\" or \"notify\"")]
    InvalidMode(String),

    #[error("{0} must be set when LOG_SERVER_MODE=notify")]
    MissingNotifySetting(&'static str),
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the web server to listen on
    pub port: u16,

    /// Dump keying and notification behavior
    pub mode: DumpMode,

    /// JSON file mapping bearer tokens to applications
    pub tokens_path: PathBuf,

    /// Root directory for stored dumps
    pub dump_dir: PathBuf,

    /// Maximum accepted dump body size in bytes
    pub max_dump_bytes: usize,

    // =========================================================================
    // Notification Configuration
    // =========================================================================

    /// Mailgun API key
    pub mailgun_api_key: Option<String>,

    /// Mailgun sending domain
    pub mailgun_domain: Option<String>,

    /// Mailgun API base URL
    pub mailgun_base_url: String,

    /// Sender address for notification emails
    pub notify_from: String,

    /// Recipient address for notification emails
    pub notify_to: String,

    /// HTTP request timeout in milliseconds for outbound mail
    pub request_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            mode: DumpMode::Plain,
            tokens_path: PathBuf::from("tokens.json"),
            dump_dir: PathBuf::from("dumps"),
            max_dump_bytes: 25 * 1024 * 1024,
            mailgun_api_key: None,
            mailgun_domain: None,
            mailgun_base_url: DEFAULT_BASE_URL.to_string(),
            notify_from: "Log Server <logs@localhost>".to_string(),
            notify_to: "logs@localhost".to_string(),
            request_timeout_ms: 8000,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Malformed numeric values are logged and replaced by their defaults; an
    /// unknown mode is an error since it changes what the server stores.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Config::default();

        let mode = match non_empty_var("LOG_SERVER_MODE") {
            Some(raw) => raw.parse()?,
            None => defaults.mode,
        };

        Ok(Config {
            port: parse_var("PORT", defaults.port),

            mode,

            tokens_path: non_empty_var("TOKENS_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.tokens_path),

            dump_dir: non_empty_var("DUMP_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.dump_dir),

            max_dump_bytes: parse_var("MAX_DUMP_BYTES", defaults.max_dump_bytes),

            mailgun_api_key: non_empty_var("MAILGUN_API_KEY"),

            mailgun_domain: non_empty_var("MAILGUN_DOMAIN"),

            mailgun_base_url: non_empty_var("MAILGUN_BASE_URL")
                .unwrap_or(defaults.mailgun_base_url),

            notify_from: non_empty_var("NOTIFY_FROM").unwrap_or(defaults.notify_from),

            notify_to: non_empty_var("NOTIFY_TO").unwrap_or(defaults.notify_to),

            request_timeout_ms: parse_var("REQUEST_TIMEOUT_MS", defaults.request_timeout_ms),
        })
    }

    /// Check settings that depend on each other.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mode.notifies() {
            if self.mailgun_api_key.is_none() {
                return Err(ConfigError::MissingNotifySetting("MAILGUN_API_KEY"));
            }
            if self.mailgun_domain.is_none() {
                return Err(ConfigError::MissingNotifySetting("MAILGUN_DOMAIN"));
            }
        }
        Ok(())
    }
}

/// Read a variable, treating empty or whitespace-only values as unset.
fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse a variable, falling back to `default` when unset or malformed.
fn parse_var<T: FromStr>(name: &str, default: T) -> T {
    let Some(raw) = non_empty_var(name) else {
        return default;
    };

    match raw.parse() {
        Ok(v) => v,
        Err(_) => {
            warn!(env_var = name, value = %raw, "Invalid value, using default");
            default
        }
    }
}
