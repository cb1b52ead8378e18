//! Email delivery through a Mailgun-compatible HTTP API.

use accessflow_governance::{EmailMessage, EmailSender, NotificationError, NotificationResult};
use reqwest::Client;
use tracing::debug;

use crate::{build_client, check_status};

/// Connection settings for the mail API.
#[derive(Clone)]
pub struct MailApiConfig {
    /// API base, e.g. `https://api.mailgun.net/v3`.
    pub base_url: String,
    pub api_key: String,
    /// Sending domain; messages are posted to `{base_url}/{domain}/messages`.
    pub domain: String,
    /// Sender address.
    pub from: String,
}

impl std::fmt::Debug for MailApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailApiConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("domain", &self.domain)
            .field("from", &self.from)
            .finish()
    }
}

/// Sends email by posting form data to the mail API.
pub struct HttpEmailSender {
    http_client: Client,
    endpoint: String,
    api_key: String,
    from: String,
}

impl HttpEmailSender {
    /// Create a sender for the given mail API.
    ///
    /// # Errors
    ///
    /// Returns `NotificationError::Configuration` if a required setting is
    /// blank or the HTTP client cannot be built.
    pub fn new(config: MailApiConfig) -> NotificationResult<Self> {
        for (name, value) in [
            ("base_url", &config.base_url),
            ("api_key", &config.api_key),
            ("domain", &config.domain),
            ("from", &config.from),
        ] {
            if value.trim().is_empty() {
                return Err(NotificationError::Configuration(format!(
                    "mail API {name} is empty"
                )));
            }
        }

        Ok(Self {
            http_client: build_client()?,
            endpoint: format!(
                "{}/{}/messages",
                config.base_url.trim_end_matches('/'),
                config.domain
            ),
            api_key: config.api_key,
            from: config.from,
        })
    }
}

#[async_trait::async_trait]
impl EmailSender for HttpEmailSender {
    async fn send_email(&self, message: &EmailMessage) -> NotificationResult<()> {
        let form = [
            ("from", self.from.as_str()),
            ("to", message.to.as_str()),
            ("subject", message.subject.as_str()),
            ("text", message.body.as_str()),
        ];

        let response = self
            .http_client
            .post(&self.endpoint)
            .basic_auth("api", Some(&self.api_key))
            .form(&form)
            .send()
            .await
            .map_err(|e| NotificationError::Transport(e.to_string()))?;

        check_status(&response)?;
        debug!(to = %message.to, subject = %message.subject, "Mail API accepted message");
        Ok(())
    }
}
