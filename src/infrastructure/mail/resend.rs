//! Email delivery through the Resend HTTP API

use async_trait::async_trait;
use serde::Serialize;
use std::fmt::Debug;
use std::time::Duration;

use crate::domain::DomainError;

const RESEND_API_URL: &str = "https://api.resend.com";

/// An outbound email
#[derive(Debug, Clone, Serialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Trait for sending email
#[async_trait]
pub trait Mailer: Send + Sync + Debug {
    /// Deliver a message. A failure here is surfaced to the caller as a
    /// delivery error rather than silently dropped.
    async fn send(&self, message: EmailMessage) -> Result<(), DomainError>;
}

/// Mailer backed by the Resend HTTP API
#[derive(Clone)]
pub struct ResendMailer {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl Debug for ResendMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResendMailer")
            .field("api_key", &"[hidden]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl ResendMailer {
    /// Create a new mailer with the given API key
    pub fn new(api_key: impl Into<String>) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| DomainError::internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: RESEND_API_URL.to_string(),
        })
    }

    /// Override the API base URL (used in tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), DomainError> {
        let url = format!("{}/emails", self.base_url);

        tracing::debug!(to = %message.to, subject = %message.subject, "Sending email");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&message)
            .send()
            .await
            .map_err(|e| DomainError::delivery(format!("Email request failed: {}", e)))?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, %body, "Email provider rejected message");
            return Err(DomainError::delivery(format!(
                "Email provider returned HTTP {}",
                status
            )));
        }

        tracing::info!(to = %message.to, "Email sent");
        Ok(())
    }
}

/// Mailer that logs instead of sending. Used when no API key is configured.
#[derive(Debug, Default, Clone)]
pub struct NoopMailer;

impl NoopMailer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Mailer for NoopMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), DomainError> {
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            "Email delivery disabled, dropping message"
        );
        Ok(())
    }
}
