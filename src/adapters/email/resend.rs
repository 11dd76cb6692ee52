//! Resend transactional email adapter. Implements MailerPort.
//!
//! POSTs `{from, to, subject, html}` with a bearer key. 200, 201 and 202 count as sent.

use crate::domain::{DomainError, OutgoingEmail};
use crate::ports::MailerPort;
use reqwest::Client;
use serde::Serialize;
use tracing::{info, warn};

pub const RESEND_EMAILS_URL: &str = "https://api.resend.com/emails";

const ACCEPTED_STATUSES: [u16; 3] = [200, 201, 202];

/// Resend mailer. Missing key or sender turns every send into a failure.
pub struct ResendMailer {
    client: Client,
    api_url: String,
    api_key: Option<String>,
    sender: Option<String>,
}

impl ResendMailer {
    pub fn new(api_url: String, api_key: Option<String>, sender: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_url,
            api_key,
            sender,
        }
    }
}

#[derive(Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

#[async_trait::async_trait]
impl MailerPort for ResendMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), DomainError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            DomainError::Notification("RESEND_API_KEY is not configured".to_string())
        })?;
        let sender = self.sender.as_deref().ok_or_else(|| {
            DomainError::Notification("SENDER_EMAIL is not configured".to_string())
        })?;

        let request = SendRequest {
            from: sender,
            to: &email.to,
            subject: &email.subject,
            html: &email.html,
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| DomainError::Notification(format!("request failed: {}", e)))?;

        let status = response.status();
        if !ACCEPTED_STATUSES.contains(&status.as_u16()) {
            let text = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %text, "email API returned error");
            return Err(DomainError::Notification(format!(
                "email API error {}: {}",
                status,
                text.chars().take(200).collect::<String>()
            )));
        }

        info!(status = %status, "confirmation email accepted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::serve_once;

    fn email() -> OutgoingEmail {
        OutgoingEmail {
            to: "pat@example.com".to_string(),
            subject: "Your Appointment Confirmation".to_string(),
            html: "<p>hi</p>".to_string(),
        }
    }

    #[tokio::test]
    async fn test_send_posts_payload_with_bearer() {
        let (url, request) = serve_once(202, r#"{"id":"abc"}"#).await;
        let mailer = ResendMailer::new(
            url,
            Some("re_key".to_string()),
            Some("clinic@example.com".to_string()),
        );

        mailer.send(&email()).await.unwrap();

        let raw = request.await.unwrap();
        assert!(raw.starts_with("POST / "));
        assert!(raw.to_lowercase().contains("authorization: bearer re_key"));
        let body = &raw[raw.find("\r\n\r\n").unwrap() + 4..];
        let json: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(json["from"], "clinic@example.com");
        assert_eq!(json["to"], "pat@example.com");
        assert_eq!(json["subject"], "Your Appointment Confirmation");
        assert_eq!(json["html"], "<p>hi</p>");
    }

    #[tokio::test]
    async fn test_send_rejects_status_outside_success_set() {
        let (url, _request) = serve_once(204, "").await;
        let mailer = ResendMailer::new(
            url,
            Some("re_key".to_string()),
            Some("clinic@example.com".to_string()),
        );
        assert!(mailer.send(&email()).await.is_err());
    }

    #[tokio::test]
    async fn test_missing_credentials_fail_without_request() {
        let mailer = ResendMailer::new("http://127.0.0.1:9".to_string(), None, None);
        let err = mailer.send(&email()).await.unwrap_err();
        assert!(err.to_string().contains("RESEND_API_KEY"));

        let mailer = ResendMailer::new(
            "http://127.0.0.1:9".to_string(),
            Some("re_key".to_string()),
            None,
        );
        let err = mailer.send(&email()).await.unwrap_err();
        assert!(err.to_string().contains("SENDER_EMAIL"));
    }
}
