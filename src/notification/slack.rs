//! A provider for sending alerts to Slack.

use super::post_json;
use crate::config::{Config, SendMethod};
use crate::core::{AlertLevel, Attachment, Provider};
use crate::error::{DispatchError, Result};
use crate::formatting::{SlackTextFormatter, TextFormatter};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, instrument};

const POST_MESSAGE_PATH: &str = "/chat.postMessage";

/// The `ok`/`error` envelope of the Slack web API.
#[derive(Debug, Deserialize)]
struct SlackApiResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Sends alerts through the Slack web API, an incoming webhook, or a generic
/// HTTP endpoint.
pub struct SlackProvider {
    http: reqwest::Client,
    formatter: SlackTextFormatter,
}

impl SlackProvider {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            formatter: SlackTextFormatter,
        }
    }

    async fn send_web_client(&self, text: String, config: &Config, channel: &str) -> Result<()> {
        let token = config
            .slack_token
            .as_deref()
            .filter(|token| !token.is_empty())
            .unwrap_or(config.token.as_str());
        if token.is_empty() {
            return Err(DispatchError::Config(
                "a bot token is required for the Slack web client".to_string(),
            ));
        }

        let url = format!(
            "{}{}",
            config.endpoints.slack_api_base.trim_end_matches('/'),
            POST_MESSAGE_PATH
        );
        let payload = json!({ "channel": channel, "text": text });
        let body = post_json(self.http.post(&url).bearer_auth(token), &payload, "slack").await?;

        let reply: SlackApiResponse = serde_json::from_str(&body)
            .map_err(|e| DispatchError::RemoteApi(format!("malformed slack response: {e}")))?;
        if !reply.ok {
            return Err(DispatchError::RemoteApi(format!(
                "slack API error: {}",
                reply.error.unwrap_or_else(|| "unknown".to_string())
            )));
        }

        info!(channel, "Message sent to Slack");
        Ok(())
    }

    async fn send_webhook(&self, text: String, config: &Config, channel: &str) -> Result<()> {
        let webhook_url = config.webhook_target().ok_or_else(|| {
            DispatchError::Config("webhook URL is required for the Slack webhook method".to_string())
        })?;

        let mut payload = json!({ "text": text });
        if !channel.is_empty() {
            payload["channel"] = Value::from(channel);
        }

        post_json(self.http.post(webhook_url), &payload, "slack webhook").await?;
        info!("Webhook sent to Slack");
        Ok(())
    }

    async fn send_http(&self, text: String, config: &Config, channel: &str) -> Result<()> {
        let url = config
            .http_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                DispatchError::Config("http_url is required for the http method".to_string())
            })?;

        let payload = json!({ "channel": channel, "text": text });
        post_json(self.http.post(url), &payload, "slack http").await?;
        info!(channel, "Alert posted to HTTP endpoint");
        Ok(())
    }
}

#[async_trait]
impl Provider for SlackProvider {
    fn name(&self) -> &str {
        "slack"
    }

    #[instrument(skip_all, fields(provider = "slack", method = %config.send_method, channel = %channel))]
    async fn send_to_channel(
        &self,
        _level: AlertLevel,
        message: &str,
        attachment: Option<&Attachment>,
        config: &Config,
        channel: &str,
    ) -> Result<()> {
        let text = self.formatter.format_alert(message, attachment, config);
        match config.send_method {
            SendMethod::WebClient => self.send_web_client(text, config, channel).await,
            SendMethod::Webhook => self.send_webhook(text, config, channel).await,
            SendMethod::Http => self.send_http(text, config, channel).await,
        }
    }
}
