//! Dump notification emails.
//!
//! In notify mode every stored dump produces a short plain-text email naming
//! the application and the correlation id, followed by any frontmatter the
//! caller attached.
//!
//! ## Flow
//!
//! ```text
//! X-Log-Server-Frontmatter → parse_frontmatter() → Notification::for_dump() → Mailer::send()
//! ```

pub mod frontmatter;
pub mod mailgun;

use async_trait::async_trait;
use thiserror::Error;

pub use frontmatter::{parse_frontmatter, FrontmatterError, FRONTMATTER_HEADER};
pub use mailgun::{MailgunMailer, DEFAULT_BASE_URL};

/// Errors raised while sending a notification.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("mail transport failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("mail provider rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// A plain-text email ready to hand to a [`Mailer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: String,
}

impl Notification {
    /// Compose the notification for one stored dump.
    pub fn for_dump(
        from: &str,
        to: &str,
        application: &str,
        correlation: &str,
        frontmatter: &str,
    ) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            subject: format!("[{}] New log dump {}", application, correlation),
            text: format!(
                "A new log dump was received.\n\nApplication: {}\nCorrelation: {}\n\n{}",
                application, correlation, frontmatter
            ),
        }
    }
}

/// Outbound email transport.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError>;
}
