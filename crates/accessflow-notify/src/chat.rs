//! Chat notifications through an incoming-webhook URL.

use accessflow_governance::{ChatMessage, ChatSender, NotificationError, NotificationResult};
use reqwest::Client;
use serde_json::{json, Value};

use crate::{build_client, check_status};

/// Posts Office 365 connector `MessageCard` payloads to a webhook.
pub struct WebhookChatSender {
    http_client: Client,
    webhook_url: String,
}

impl WebhookChatSender {
    /// Create a sender for the given incoming-webhook URL.
    ///
    /// # Errors
    ///
    /// Returns `NotificationError::Configuration` if the URL is not http(s)
    /// or the HTTP client cannot be built.
    pub fn new(webhook_url: impl Into<String>) -> NotificationResult<Self> {
        let webhook_url = webhook_url.into();
        if !(webhook_url.starts_with("https://") || webhook_url.starts_with("http://")) {
            return Err(NotificationError::Configuration(
                "chat webhook URL must be http(s)".to_string(),
            ));
        }
        Ok(Self {
            http_client: build_client()?,
            webhook_url,
        })
    }

    /// Render a message as a `MessageCard`.
    pub fn message_card(message: &ChatMessage) -> Value {
        let facts: Vec<Value> = message
            .facts
            .iter()
            .map(|f| json!({ "name": f.name, "value": f.value }))
            .collect();

        json!({
            "@type": "MessageCard",
            "@context": "http://schema.org/extensions",
            "themeColor": message.color,
            "summary": message.title,
            "sections": [{
                "activityTitle": message.title,
                "activitySubtitle": message.subtitle,
                "facts": facts,
                "text": message.text,
            }]
        })
    }
}

#[async_trait::async_trait]
impl ChatSender for WebhookChatSender {
    async fn post_message(&self, message: &ChatMessage) -> NotificationResult<()> {
        let response = self
            .http_client
            .post(&self.webhook_url)
            .json(&Self::message_card(message))
            .send()
            .await
            .map_err(|e| NotificationError::Transport(e.to_string()))?;

        check_status(&response)
    }
}
