//! Mailgun HTTP API transport.
//!
//! Messages are sent with a form-encoded POST to
//! `{base_url}/v3/{domain}/messages`, authenticated with HTTP basic auth
//! (`api` / API key).
//! Reference: https://documentation.mailgun.com/docs/mailgun/api-reference/openapi-final/tag/Messages/

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{info, warn};

use super::{Mailer, Notification, NotifyError};

/// Default Mailgun API endpoint (US region).
pub const DEFAULT_BASE_URL: &str = "https://api.mailgun.net";

/// Sends notifications through Mailgun.
#[derive(Clone)]
pub struct MailgunMailer {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl MailgunMailer {
    /// Create a mailer for `domain`.
    ///
    /// `timeout` bounds every send, so a slow provider cannot hold a dump
    /// response open indefinitely.
    pub fn new(
        base_url: &str,
        domain: &str,
        api_key: String,
        timeout: Duration,
    ) -> Result<Self, NotifyError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_key,
            endpoint: messages_endpoint(base_url, domain),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl std::fmt::Debug for MailgunMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailgunMailer")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Mailer for MailgunMailer {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let form = [
            ("from", notification.from.as_str()),
            ("to", notification.to.as_str()),
            ("subject", notification.subject.as_str()),
            ("text", notification.text.as_str()),
        ];

        let resp = self
            .client
            .post(&self.endpoint)
            .basic_auth("api", Some(&self.api_key))
            .form(&form)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(
                status_code = status.as_u16(),
                body_length = body.len(),
                "mailgun_send_rejected"
            );
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        info!(
            to = %notification.to,
            subject = %notification.subject,
            "mailgun_send_complete"
        );

        Ok(())
    }
}

/// Build the messages endpoint, tolerating a trailing slash on the base URL.
fn messages_endpoint(base_url: &str, domain: &str) -> String {
    format!("{}/v3/{}/messages", base_url.trim_end_matches('/'), domain)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_endpoint() {
        assert_eq!(
            messages_endpoint("https://api.mailgun.net", "mg.example.com"),
            "https://api.mailgun.net/v3/mg.example.com/messages"
        );
        assert_eq!(
            messages_endpoint("https://api.eu.mailgun.net/", "mg.example.com"),
            "https://api.eu.mailgun.net/v3/mg.example.com/messages"
        );
    }

    #[test]
    fn test_debug_hides_api_key() {
        let mailer = MailgunMailer::new(
            DEFAULT_BASE_URL,
            "mg.example.com",
            "key-secret".to_string(),
            Duration::from_secs(1),
        )
        .unwrap();

        let debug = format!("{:?}", mailer);
        assert!(debug.contains("mg.example.com"));
        assert!(!debug.contains("key-secret"));
    }

    #[tokio::test]
    async fn test_send_to_unreachable_endpoint_fails() {
        // Port 9 (discard) on localhost is not expected to speak HTTP.
        let mailer = MailgunMailer::new(
            "http://127.0.0.1:9",
            "mg.example.com",
            "key".to_string(),
            Duration::from_millis(500),
        )
        .unwrap();

        let notification = Notification::for_dump("a@x", "b@x", "Foo", "foo/abc123", "");
        assert!(matches!(
            mailer.send(&notification).await,
            Err(NotifyError::Transport(_))
        ));
    }
}
