//! Outbound email delivery
//!
//! Used by the password-reset flow to send temporary passwords. Delivery goes
//! through a generic transactional-email HTTP API; when no API is configured,
//! or the API call fails, the caller degrades gracefully (the reset endpoint
//! returns the temporary password in the response instead).

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::Args;
use crate::types::{CompassError, Result};

/// Sends transactional email
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()>;
}

#[derive(Serialize)]
struct OutboundEmail<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

/// Mailer backed by a transactional-email HTTP API (Resend-style JSON POST)
pub struct HttpMailer {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    from: String,
}

impl HttpMailer {
    pub fn new(api_url: String, api_key: String, from: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            api_key,
            from,
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        debug!(to = %to, subject = %subject, "Sending email via {}", self.api_url);

        let payload = OutboundEmail {
            from: &self.from,
            to,
            subject,
            text: body,
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| CompassError::Mail(format!("Email API request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            warn!(status = %status, "Email API returned error: {}", detail);
            return Err(CompassError::Mail(format!(
                "Email API returned {status}"
            )));
        }

        info!(to = %to, "Email sent");
        Ok(())
    }
}

/// Mailer used when no email API is configured. Always fails with a Mail
/// error so callers take their degraded path.
pub struct DisabledMailer;

#[async_trait]
impl Mailer for DisabledMailer {
    async fn send(&self, to: &str, _subject: &str, _body: &str) -> Result<()> {
        debug!(to = %to, "Email delivery disabled (no EMAIL_API_URL configured)");
        Err(CompassError::Mail("Email delivery is not configured".into()))
    }
}

/// Build the mailer implied by the configuration
pub fn mailer_from_args(args: &Args) -> Box<dyn Mailer> {
    match (&args.email_api_url, &args.email_api_key) {
        (Some(url), Some(key)) => Box::new(HttpMailer::new(
            url.clone(),
            key.clone(),
            args.email_from.clone(),
        )),
        _ => Box::new(DisabledMailer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_mailer_reports_mail_error() {
        let err = DisabledMailer
            .send("a@example.com", "Subject", "Body")
            .await
            .unwrap_err();
        assert!(matches!(err, CompassError::Mail(_)));
    }
}
