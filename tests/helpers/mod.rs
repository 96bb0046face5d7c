#![allow(dead_code)]

pub mod mock_cache;

use commonlog::config::{Config, SendMethod};
use wiremock::MockServer;

/// A Lark web-client config pointed at `server`.
pub fn lark_config(server: &MockServer) -> Config {
    let mut config = Config {
        provider: "lark".to_string(),
        send_method: SendMethod::WebClient,
        lark_app: Some(commonlog::config::LarkAppCredentials {
            app_id: "cli_test".to_string(),
            app_secret: "secret".to_string(),
        }),
        channel: "ops-alerts".to_string(),
        service_name: "billing".to_string(),
        environment: "prod".to_string(),
        ..Default::default()
    };
    config.endpoints.lark_api_base = server.uri();
    config
}

/// A Slack webhook config posting to `<server>/webhook`.
pub fn slack_webhook_config(server: &MockServer) -> Config {
    Config {
        provider: "slack".to_string(),
        send_method: SendMethod::Webhook,
        token: format!("{}/webhook", server.uri()),
        channel: "#ops".to_string(),
        ..Default::default()
    }
}
