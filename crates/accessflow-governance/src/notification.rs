//! Best-effort notification of access request events.
//!
//! Two sender capabilities, [`EmailSender`] and [`ChatSender`], sit behind
//! traits so transports can be swapped. [`RequestNotifier`] composes the
//! messages for each lifecycle event and fans them out. Delivery failures
//! are logged under the `notification` target and never returned to the
//! caller: by the time a notifier runs, the state change is committed.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use crate::catalog;
use crate::types::{AccessRequest, RequestStatus, RequestedItems};

/// Errors that can occur while delivering a notification.
#[derive(Error, Debug)]
pub enum NotificationError {
    /// Channel is missing required configuration.
    #[error("Notification channel misconfigured: {0}")]
    Configuration(String),

    /// Request never got a response (connect, TLS, timeout).
    #[error("Transport error: {0}")]
    Transport(String),

    /// Upstream answered with a non-success status.
    #[error("Upstream rejected notification with status {status}")]
    Rejected { status: u16 },
}

/// Result type for notification operations.
pub type NotificationResult<T> = Result<T, NotificationError>;

// ============================================================================
// Messages
// ============================================================================

/// A plain-text email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// A name/value pair shown on a chat card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatFact {
    pub name: String,
    pub value: String,
}

impl ChatFact {
    fn new(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            value: value.into(),
        }
    }
}

/// A status card posted to the team chat channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub title: String,
    pub subtitle: String,
    pub facts: Vec<ChatFact>,
    pub text: String,
    /// Hex theme color without the leading `#`.
    pub color: String,
}

// ============================================================================
// Sender Traits
// ============================================================================

/// Delivers email.
#[async_trait::async_trait]
pub trait EmailSender: Send + Sync {
    async fn send_email(&self, message: &EmailMessage) -> NotificationResult<()>;
}

/// Posts to the team chat channel.
#[async_trait::async_trait]
pub trait ChatSender: Send + Sync {
    async fn post_message(&self, message: &ChatMessage) -> NotificationResult<()>;
}

// ============================================================================
// Notifier
// ============================================================================

#[derive(Debug, Clone, Copy)]
enum RequestEvent {
    Submitted,
    Approved,
    Rejected,
}

impl RequestEvent {
    fn as_str(self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    fn title(self) -> &'static str {
        match self {
            Self::Submitted => "Access Request Submitted",
            Self::Approved => "Access Request Approved",
            Self::Rejected => "Access Request Rejected",
        }
    }

    fn color(self) -> &'static str {
        match self {
            Self::Submitted => "0078d7",
            Self::Approved => "00ff00",
            Self::Rejected => "ff0000",
        }
    }
}

/// Composes and fans out notifications for access request events.
#[derive(Clone)]
pub struct RequestNotifier {
    email: Arc<dyn EmailSender>,
    chat: Arc<dyn ChatSender>,
    admin_email: Option<String>,
}

impl RequestNotifier {
    pub fn new(email: Arc<dyn EmailSender>, chat: Arc<dyn ChatSender>) -> Self {
        Self {
            email,
            chat,
            admin_email: None,
        }
    }

    /// Also notify this address about new submissions.
    #[must_use]
    pub fn with_admin_email(mut self, admin_email: Option<String>) -> Self {
        self.admin_email = admin_email.filter(|e| !e.trim().is_empty());
        self
    }

    /// Announce a new submission to the requester, the administrator
    /// address and the chat channel.
    #[instrument(skip(self, request), fields(request_id = %request.id))]
    pub async fn dispatch_submitted(&self, request: &AccessRequest) {
        let event = RequestEvent::Submitted;
        self.deliver_email(event, request, submitted_requester_email(request))
            .await;
        if let Some(admin) = &self.admin_email {
            self.deliver_email(event, request, submitted_admin_email(request, admin))
                .await;
        }
        self.deliver_chat(event, request).await;
    }

    /// Announce an approval: granted vs denied items to the requester,
    /// plus a chat status post.
    #[instrument(skip(self, request), fields(request_id = %request.id))]
    pub async fn dispatch_approved(&self, request: &AccessRequest) {
        let event = RequestEvent::Approved;
        self.deliver_email(event, request, approved_email(request))
            .await;
        self.deliver_chat(event, request).await;
    }

    /// Announce a rejection to the requester and the chat channel.
    #[instrument(skip(self, request), fields(request_id = %request.id))]
    pub async fn dispatch_rejected(&self, request: &AccessRequest) {
        let event = RequestEvent::Rejected;
        self.deliver_email(event, request, rejected_email(request))
            .await;
        self.deliver_chat(event, request).await;
    }

    async fn deliver_email(&self, event: RequestEvent, request: &AccessRequest, message: EmailMessage) {
        match self.email.send_email(&message).await {
            Ok(()) => debug!(
                target: "notification",
                channel = "email",
                request_id = %request.id,
                event = event.as_str(),
                "Email notification delivered"
            ),
            Err(e) => warn!(
                target: "notification",
                channel = "email",
                request_id = %request.id,
                event = event.as_str(),
                error = %e,
                "Email notification failed"
            ),
        }
    }

    async fn deliver_chat(&self, event: RequestEvent, request: &AccessRequest) {
        let message = chat_card(event, request);
        match self.chat.post_message(&message).await {
            Ok(()) => debug!(
                target: "notification",
                channel = "chat",
                request_id = %request.id,
                event = event.as_str(),
                "Chat notification delivered"
            ),
            Err(e) => warn!(
                target: "notification",
                channel = "chat",
                request_id = %request.id,
                event = event.as_str(),
                error = %e,
                "Chat notification failed"
            ),
        }
    }
}

// ============================================================================
// Message Composition
// ============================================================================

fn labels(items: &BTreeSet<String>) -> String {
    items
        .iter()
        .map(|name| catalog::display_label(name))
        .collect::<Vec<_>>()
        .join(", ")
}

fn selection_lines(items: &RequestedItems) -> String {
    items
        .iter()
        .filter(|(_, selected)| !selected.is_empty())
        .map(|(category, selected)| format!("- {}: {}", category.label(), labels(selected)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn item_lines(items: &BTreeSet<String>) -> String {
    if items.is_empty() {
        return "- none".to_string();
    }
    items
        .iter()
        .map(|name| format!("- {}", catalog::display_label(name)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn submitted_requester_email(request: &AccessRequest) -> EmailMessage {
    let requester = &request.requester;
    EmailMessage {
        to: requester.email.clone(),
        subject: "Your access request has been received".to_string(),
        body: format!(
            "Hello {},\n\nYour access request ({}) has been received and is pending review.\n\nRequested access:\n{}\n",
            requester.full_name,
            request.id,
            selection_lines(&request.requested_items),
        ),
    }
}

fn submitted_admin_email(request: &AccessRequest, admin: &str) -> EmailMessage {
    let requester = &request.requester;
    EmailMessage {
        to: admin.to_string(),
        subject: format!("New access request from {}", requester.full_name),
        body: format!(
            "A new access request is awaiting review.\n\nRequest ID: {}\nRequester: {} ({})\nDepartment: {}\nJob Title: {}\n\nRequested access:\n{}\n",
            request.id,
            requester.full_name,
            requester.email,
            requester.department,
            requester.job_title,
            selection_lines(&request.requested_items),
        ),
    }
}

fn approved_email(request: &AccessRequest) -> EmailMessage {
    let requester = &request.requester;
    EmailMessage {
        to: requester.email.clone(),
        subject: "Your access request has been approved".to_string(),
        body: format!(
            "Hello {},\n\nYour access request ({}) has been approved.\n\nGranted:\n{}\n\nNot granted:\n{}\n",
            requester.full_name,
            request.id,
            item_lines(&request.granted_items()),
            item_lines(&request.denied_items()),
        ),
    }
}

fn rejected_email(request: &AccessRequest) -> EmailMessage {
    let requester = &request.requester;
    EmailMessage {
        to: requester.email.clone(),
        subject: "Your access request has been rejected".to_string(),
        body: format!(
            "Hello {},\n\nYour access request ({}) has been rejected. If you have any questions, please contact the IT department.\n",
            requester.full_name, request.id,
        ),
    }
}

fn chat_card(event: RequestEvent, request: &AccessRequest) -> ChatMessage {
    let requester = &request.requester;
    let mut text = format!(
        "Requested access:\n{}",
        selection_lines(&request.requested_items)
    );
    if request.status == RequestStatus::Approved {
        text.push_str(&format!("\n\nGranted: {}", labels(&request.granted_items())));
    }

    ChatMessage {
        title: event.title().to_string(),
        subtitle: format!("Request ID: {}", request.id),
        facts: vec![
            ChatFact::new(
                "Requester",
                format!("{} ({})", requester.full_name, requester.email),
            ),
            ChatFact::new("Department", requester.department.as_str()),
            ChatFact::new("Job Title", requester.job_title.clone()),
            ChatFact::new("Status", request.status.label()),
        ],
        text,
        color: event.color().to_string(),
    }
}

// ============================================================================
// In-Memory Senders
// ============================================================================

/// Email sender that records messages instead of delivering them.
#[derive(Debug, Default)]
pub struct InMemoryEmailSender {
    sent: Mutex<Vec<EmailMessage>>,
    fail: bool,
}

impl InMemoryEmailSender {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A sender whose every delivery fails after recording the attempt.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            sent: Mutex::default(),
            fail: true,
        }
    }

    pub async fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().await.clone()
    }
}

#[async_trait::async_trait]
impl EmailSender for InMemoryEmailSender {
    async fn send_email(&self, message: &EmailMessage) -> NotificationResult<()> {
        self.sent.lock().await.push(message.clone());
        if self.fail {
            return Err(NotificationError::Transport("connection refused".to_string()));
        }
        Ok(())
    }
}

/// Chat sender that records messages instead of posting them.
#[derive(Debug, Default)]
pub struct InMemoryChatSender {
    posted: Mutex<Vec<ChatMessage>>,
    fail: bool,
}

impl InMemoryChatSender {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A sender whose every post fails after recording the attempt.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            posted: Mutex::default(),
            fail: true,
        }
    }

    pub async fn posted(&self) -> Vec<ChatMessage> {
        self.posted.lock().await.clone()
    }
}

#[async_trait::async_trait]
impl ChatSender for InMemoryChatSender {
    async fn post_message(&self, message: &ChatMessage) -> NotificationResult<()> {
        self.posted.lock().await.push(message.clone());
        if self.fail {
            return Err(NotificationError::Rejected { status: 502 });
        }
        Ok(())
    }
}
