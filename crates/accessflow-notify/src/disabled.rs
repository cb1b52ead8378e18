//! No-op senders for channels that are not configured.

use accessflow_governance::{
    ChatMessage, ChatSender, EmailMessage, EmailSender, NotificationResult,
};
use tracing::debug;

/// Email sender used when no mail API is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledEmailSender;

#[async_trait::async_trait]
impl EmailSender for DisabledEmailSender {
    async fn send_email(&self, message: &EmailMessage) -> NotificationResult<()> {
        debug!(
            target: "notification",
            to = %message.to,
            subject = %message.subject,
            "Email channel disabled, skipping"
        );
        Ok(())
    }
}

/// Chat sender used when no webhook is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledChatSender;

#[async_trait::async_trait]
impl ChatSender for DisabledChatSender {
    async fn post_message(&self, message: &ChatMessage) -> NotificationResult<()> {
        debug!(
            target: "notification",
            title = %message.title,
            "Chat channel disabled, skipping"
        );
        Ok(())
    }
}
