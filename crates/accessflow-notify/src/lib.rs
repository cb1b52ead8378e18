//! Notification transports for accessflow.
//!
//! Implementations of the [`EmailSender`] and [`ChatSender`] seams from
//! `accessflow-governance`:
//!
//! - [`HttpEmailSender`] - Mailgun-compatible HTTP mail API
//! - [`WebhookChatSender`] - incoming-webhook `MessageCard` posts
//! - [`DisabledEmailSender`] / [`DisabledChatSender`] - used when a channel
//!   is not configured
//!
//! [`EmailSender`]: accessflow_governance::EmailSender
//! [`ChatSender`]: accessflow_governance::ChatSender

mod chat;
mod disabled;
mod email;

pub use chat::WebhookChatSender;
pub use disabled::{DisabledChatSender, DisabledEmailSender};
pub use email::{HttpEmailSender, MailApiConfig};

use std::time::Duration;

use accessflow_governance::NotificationError;
use reqwest::Client;

const USER_AGENT: &str = "accessflow-notify/1.0";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

fn build_client() -> Result<Client, NotificationError> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .map_err(|e| NotificationError::Configuration(format!("Failed to build HTTP client: {e}")))
}

fn check_status(response: &reqwest::Response) -> Result<(), NotificationError> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(NotificationError::Rejected {
            status: status.as_u16(),
        })
    }
}
