//! A provider for sending alerts to Lark.
//!
//! The web client path addresses chats by identifier, so every send first
//! obtains a tenant token and resolves the channel name, both through the
//! credential cache.

use super::post_json;
use crate::cache::CacheConnector;
use crate::config::{Config, SendMethod};
use crate::core::{AlertLevel, Attachment, Provider};
use crate::credentials::{get_access_token, resolve_chat_id, DirectoryListing};
use crate::error::{DispatchError, Result};
use crate::formatting::{LarkTextFormatter, TextFormatter};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, instrument};

const SEND_MESSAGE_PATH: &str = "/im/v1/messages?receive_id_type=chat_id";

/// The `code`/`msg` envelope carried by Lark responses.
#[derive(Debug, Default, Deserialize)]
struct LarkStatus {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    msg: String,
}

impl LarkStatus {
    fn check(self, context: &str) -> Result<()> {
        if self.code != 0 {
            return Err(DispatchError::RemoteApi(format!(
                "{} error {}: {}",
                context, self.code, self.msg
            )));
        }
        Ok(())
    }
}

/// Sends alerts through the Lark messaging API or a custom-bot webhook.
pub struct LarkProvider {
    http: reqwest::Client,
    cache: Arc<dyn CacheConnector>,
    formatter: LarkTextFormatter,
}

impl LarkProvider {
    pub fn new(http: reqwest::Client, cache: Arc<dyn CacheConnector>) -> Self {
        Self {
            http,
            cache,
            formatter: LarkTextFormatter,
        }
    }

    async fn send_web_client(&self, text: String, config: &Config, channel: &str) -> Result<()> {
        let cache = self.cache.connect(&config.cache).await?;

        let token = match config.lark_app.as_ref().filter(|app| app.is_complete()) {
            Some(app) => get_access_token(&self.http, cache.as_ref(), config, app).await?,
            None if !config.token.is_empty() => config.token.clone(),
            None => {
                return Err(DispatchError::Config(
                    "lark_app credentials or a token are required for the Lark web client"
                        .to_string(),
                ))
            }
        };

        let listing = DirectoryListing::lark_chats(&config.endpoints);
        let chat_id = resolve_chat_id(&self.http, cache.as_ref(), config, &listing, &token, channel)
            .await
            .map_err(|e| {
                error!(channel, error = %e, "Failed to resolve chat_id");
                e
            })?;

        let url = format!(
            "{}{}",
            config.endpoints.lark_api_base.trim_end_matches('/'),
            SEND_MESSAGE_PATH
        );
        // `content` is itself a JSON document, sent as a string.
        let content = json!({ "text": text }).to_string();
        let payload = json!({
            "receive_id": chat_id,
            "msg_type": "text",
            "content": content,
        });

        let body = post_json(self.http.post(&url).bearer_auth(&token), &payload, "lark").await?;
        let status: LarkStatus = serde_json::from_str(&body)
            .map_err(|e| DispatchError::RemoteApi(format!("malformed lark response: {e}")))?;
        status.check("lark message")?;

        info!(channel, "Message sent to Lark");
        Ok(())
    }

    async fn send_webhook(&self, text: String, config: &Config) -> Result<()> {
        let webhook_url = config.webhook_target().ok_or_else(|| {
            DispatchError::Config("webhook URL is required for the Lark webhook method".to_string())
        })?;

        let payload = json!({ "msg_type": "text", "content": { "text": text } });
        let body = post_json(self.http.post(webhook_url), &payload, "lark webhook").await?;

        // Bot webhooks answer with a code envelope; a non-JSON body counts as accepted.
        if let Ok(status) = serde_json::from_str::<LarkStatus>(&body) {
            status.check("lark webhook")?;
        }

        info!("Webhook sent to Lark");
        Ok(())
    }
}

#[async_trait]
impl Provider for LarkProvider {
    fn name(&self) -> &str {
        "lark"
    }

    #[instrument(skip_all, fields(provider = "lark", method = %config.send_method, channel = %channel))]
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
            SendMethod::Webhook => self.send_webhook(text, config).await,
            method => Err(DispatchError::UnsupportedMethod {
                provider: self.name().to_string(),
                method: method.to_string(),
            }),
        }
    }
}
