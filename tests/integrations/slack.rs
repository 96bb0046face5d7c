//! Integration tests for the Slack provider through the `Logger`.

#[path = "../helpers/mod.rs"]
mod helpers;

use commonlog::config::{Config, SendMethod};
use commonlog::{AlertLevel, Attachment, DispatchError, Logger};
use helpers::mock_cache::{CountingCache, CountingConnector};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn web_client_config(server: &MockServer) -> Config {
    let mut config = Config {
        provider: "slack".to_string(),
        send_method: SendMethod::WebClient,
        token: "xoxb-test".to_string(),
        channel: "#ops".to_string(),
        ..Default::default()
    };
    config.endpoints.slack_api_base = server.uri();
    config
}

fn logger(config: Config) -> Logger {
    Logger::with_transport(
        config,
        reqwest::Client::new(),
        Arc::new(CountingConnector(CountingCache::new())),
    )
}

#[tokio::test]
async fn test_web_client_posts_formatted_message() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat.postMessage"))
        .and(header("authorization", "Bearer xoxb-test"))
        .and(body_json(json!({
            "channel": "#ops",
            "text": "*[billing - prod]*\nqueue backlog\n\n*Attachment:* http://grafana/q"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    let config = Config {
        service_name: "billing".to_string(),
        environment: "prod".to_string(),
        ..web_client_config(&server)
    };

    // Act
    let attachment = Attachment::link("http://grafana/q");
    let result = logger(config)
        .send(AlertLevel::Warn, "queue backlog", Some(&attachment), "")
        .await;

    // Assert
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_web_client_api_error_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat.postMessage"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "ok": false, "error": "not_in_channel" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let result = logger(web_client_config(&server))
        .send(AlertLevel::Error, "m", None, "")
        .await;

    match result {
        Err(DispatchError::RemoteApi(msg)) => assert!(msg.contains("not_in_channel")),
        other => panic!("expected RemoteApi, got {:?}", other),
    }
}

#[tokio::test]
async fn test_web_client_without_token_is_config_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = Config {
        token: String::new(),
        ..web_client_config(&server)
    };
    let result = logger(config).send(AlertLevel::Error, "m", None, "").await;
    assert!(matches!(result, Err(DispatchError::Config(_))));
}

#[tokio::test]
async fn test_webhook_url_takes_precedence_over_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/explicit"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let config = Config {
        webhook_url: Some(format!("{}/explicit", server.uri())),
        ..helpers::slack_webhook_config(&server)
    };
    assert!(logger(config).send(AlertLevel::Warn, "m", None, "").await.is_ok());
}

#[tokio::test]
async fn test_unreachable_webhook_is_connection_error() {
    let config = Config {
        send_method: SendMethod::Webhook,
        token: "http://127.0.0.1:1/webhook".to_string(),
        ..Default::default()
    };
    let result = logger(config).send(AlertLevel::Error, "m", None, "").await;
    assert!(matches!(result, Err(DispatchError::Connection(_))));
}
