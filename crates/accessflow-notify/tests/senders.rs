//! Sender tests against a mock HTTP server.

use accessflow_governance::{
    ChatFact, ChatMessage, ChatSender, EmailMessage, EmailSender, NotificationError,
};
use accessflow_notify::{
    DisabledChatSender, DisabledEmailSender, HttpEmailSender, MailApiConfig, WebhookChatSender,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// =============================================================================
// Test Helpers
// =============================================================================

fn mail_config(base_url: &str) -> MailApiConfig {
    MailApiConfig {
        base_url: base_url.to_string(),
        api_key: "key-123".to_string(),
        domain: "mg.example.com".to_string(),
        from: "accessflow@example.com".to_string(),
    }
}

fn email() -> EmailMessage {
    EmailMessage {
        to: "ama@example.com".to_string(),
        subject: "Approved".to_string(),
        body: "Granted: Vortex".to_string(),
    }
}

fn card() -> ChatMessage {
    ChatMessage {
        title: "Access Request Approved".to_string(),
        subtitle: "Request ID: r-1".to_string(),
        facts: vec![ChatFact {
            name: "Status".to_string(),
            value: "Approved".to_string(),
        }],
        text: "Requested access:\n- Main Cloud Accounts: Vortex".to_string(),
        color: "00ff00".to_string(),
    }
}

// =============================================================================
// HttpEmailSender
// =============================================================================

#[tokio::test]
async fn test_email_posts_form_with_basic_auth() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v3/mg.example.com/messages"))
        .and(header("authorization", "Basic YXBpOmtleS0xMjM="))
        .and(body_string_contains("to=ama%40example.com"))
        .and(body_string_contains("subject=Approved"))
        .and(body_string_contains("from=accessflow%40example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Queued"})))
        .expect(1)
        .mount(&server)
        .await;

    let sender = HttpEmailSender::new(mail_config(&format!("{}/v3/", server.uri()))).unwrap();
    let result = sender.send_email(&email()).await;

    assert!(result.is_ok(), "send failed: {:?}", result.err());
}

#[tokio::test]
async fn test_email_non_success_status_is_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Forbidden"))
        .mount(&server)
        .await;

    let sender = HttpEmailSender::new(mail_config(&server.uri())).unwrap();
    let result = sender.send_email(&email()).await;

    assert!(matches!(
        result,
        Err(NotificationError::Rejected { status: 401 })
    ));
}

#[tokio::test]
async fn test_email_unreachable_server_is_transport_error() {
    let sender = HttpEmailSender::new(mail_config("http://127.0.0.1:1")).unwrap();
    let result = sender.send_email(&email()).await;

    assert!(matches!(result, Err(NotificationError::Transport(_))));
}

#[test]
fn test_email_config_requires_all_settings() {
    let mut config = mail_config("https://api.mailgun.net/v3");
    config.api_key = " ".to_string();

    assert!(matches!(
        HttpEmailSender::new(config),
        Err(NotificationError::Configuration(_))
    ));
}

#[test]
fn test_mail_config_debug_redacts_key() {
    let rendered = format!("{:?}", mail_config("https://api.mailgun.net/v3"));
    assert!(rendered.contains("[REDACTED]"));
    assert!(!rendered.contains("key-123"));
}

// =============================================================================
// WebhookChatSender
// =============================================================================

#[tokio::test]
async fn test_chat_posts_message_card() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/webhook"))
        .and(body_partial_json(json!({
            "@type": "MessageCard",
            "themeColor": "00ff00",
            "summary": "Access Request Approved",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string("1"))
        .expect(1)
        .mount(&server)
        .await;

    let sender = WebhookChatSender::new(format!("{}/webhook", server.uri())).unwrap();
    let result = sender.post_message(&card()).await;

    assert!(result.is_ok(), "post failed: {:?}", result.err());
}

#[tokio::test]
async fn test_chat_server_error_is_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let sender = WebhookChatSender::new(server.uri()).unwrap();
    let result = sender.post_message(&card()).await;

    assert!(matches!(
        result,
        Err(NotificationError::Rejected { status: 500 })
    ));
}

#[test]
fn test_message_card_layout() {
    let value = WebhookChatSender::message_card(&card());

    assert_eq!(value["@context"], "http://schema.org/extensions");
    let section = &value["sections"][0];
    assert_eq!(section["activityTitle"], "Access Request Approved");
    assert_eq!(section["activitySubtitle"], "Request ID: r-1");
    assert_eq!(section["facts"][0]["name"], "Status");
    assert_eq!(section["facts"][0]["value"], "Approved");
}

#[test]
fn test_chat_rejects_non_http_url() {
    assert!(matches!(
        WebhookChatSender::new("ftp://example.com/hook"),
        Err(NotificationError::Configuration(_))
    ));
}

// =============================================================================
// Disabled senders
// =============================================================================

#[tokio::test]
async fn test_disabled_senders_succeed() {
    assert!(DisabledEmailSender.send_email(&email()).await.is_ok());
    assert!(DisabledChatSender.post_message(&card()).await.is_ok());
}
