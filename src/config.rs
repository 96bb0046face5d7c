//! Configuration management for commonlog
//!
//! This module defines the `Config` value every dispatch call consumes. The
//! library never reads process state itself: `Config::load` is an explicit,
//! opt-in loader that layers defaults, a TOML file, `COMMONLOG_` environment
//! variables and command-line overrides using `figment`.

use crate::cli::Cli;
use crate::core::{ChannelResolver, DefaultChannelResolver};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::sync::Arc;

pub const SLACK_API_BASE: &str = "https://slack.com/api";
pub const LARK_API_BASE: &str = "https://open.larksuite.com/open-apis";
pub const DEFAULT_DIRECTORY_PAGE_SIZE: u32 = 10;

/// How a message reaches the chat platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SendMethod {
    /// Authenticated call to the platform's native message API.
    #[default]
    WebClient,
    /// Pre-shared incoming-webhook URL.
    Webhook,
    /// Arbitrary HTTP endpoint.
    Http,
}

impl fmt::Display for SendMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SendMethod::WebClient => "webclient",
            SendMethod::Webhook => "webhook",
            SendMethod::Http => "http",
        };
        f.write_str(name)
    }
}

/// Long-lived application credentials exchanged for a tenant token.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LarkAppCredentials {
    pub app_id: String,
    pub app_secret: String,
}

impl LarkAppCredentials {
    pub fn is_complete(&self) -> bool {
        !self.app_id.is_empty() && !self.app_secret.is_empty()
    }
}

impl fmt::Debug for LarkAppCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LarkAppCredentials")
            .field("app_id", &self.app_id)
            .field("app_secret", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    #[default]
    Redis,
    /// In-process cache; entries do not outlive the process.
    Memory,
}

/// What to do when a freshly fetched credential cannot be written to the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WriteFailurePolicy {
    /// Fail the whole operation with the cache error.
    #[default]
    Fail,
    /// Log a warning and hand the fetched value back anyway.
    Warn,
}

/// Connection parameters for the credential cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CacheSettings {
    #[serde(default)]
    pub backend: CacheBackend,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub db: i64,
    #[serde(default)]
    pub write_failure: WriteFailurePolicy,
}

/// Base URLs of the platform APIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    pub slack_api_base: String,
    pub lark_api_base: String,
    /// Page size used when listing the Lark chat directory.
    pub directory_page_size: u32,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            slack_api_base: SLACK_API_BASE.to_string(),
            lark_api_base: LARK_API_BASE.to_string(),
            directory_page_size: DEFAULT_DIRECTORY_PAGE_SIZE,
        }
    }
}

/// Everything a dispatch needs. Cloned per send, so amending a copy never
/// touches the caller's value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Provider name ("slack" or "lark"). Unknown names fall back to Slack.
    pub provider: String,
    pub send_method: SendMethod,
    /// Bearer token, or the webhook URL when `webhook_url` is unset.
    #[serde(default)]
    pub token: String,
    /// Bot token for the Slack web API; takes precedence over `token`.
    #[serde(default)]
    pub slack_token: Option<String>,
    #[serde(default)]
    pub lark_app: Option<LarkAppCredentials>,
    #[serde(default)]
    pub webhook_url: Option<String>,
    #[serde(default)]
    pub http_url: Option<String>,
    #[serde(default)]
    pub channel: String,
    /// Level-based routing; read from the `[routing]` table.
    #[serde(
        rename = "routing",
        default,
        deserialize_with = "deserialize_routing",
        skip_serializing
    )]
    pub channel_resolver: Option<Arc<dyn ChannelResolver>>,
    #[serde(default)]
    pub service_name: String,
    #[serde(default)]
    pub environment: String,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub endpoints: Endpoints,
    pub log_level: String,
}

fn deserialize_routing<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<Arc<dyn ChannelResolver>>, D::Error>
where
    D: Deserializer<'de>,
{
    let table = Option::<DefaultChannelResolver>::deserialize(deserializer)?;
    Ok(table.map(|resolver| Arc::new(resolver) as Arc<dyn ChannelResolver>))
}

impl Config {
    /// Loads the configuration, layering defaults, the TOML file named on the
    /// command line, `COMMONLOG_` environment variables and CLI overrides.
    pub fn load(cli: &Cli) -> Result<Self, figment::Error> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
        if let Some(path) = &cli.config {
            figment = figment.merge(Toml::file(path));
        }
        figment
            // e.g. COMMONLOG_CACHE__HOST=redis.internal
            .merge(Env::prefixed("COMMONLOG_").split("__"))
            .merge(cli)
            .extract()
    }

    pub fn with_channel_resolver(mut self, resolver: Arc<dyn ChannelResolver>) -> Self {
        self.channel_resolver = Some(resolver);
        self
    }

    /// The incoming-webhook URL: `webhook_url` if set, otherwise `token`.
    pub fn webhook_target(&self) -> Option<&str> {
        self.webhook_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .or_else(|| Some(self.token.as_str()).filter(|token| !token.is_empty()))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: "slack".to_string(),
            send_method: SendMethod::WebClient,
            token: String::new(),
            slack_token: None,
            lark_app: None,
            webhook_url: None,
            http_url: None,
            channel: String::new(),
            channel_resolver: None,
            service_name: String::new(),
            environment: String::new(),
            cache: CacheSettings::default(),
            endpoints: Endpoints::default(),
            log_level: "info".to_string(),
        }
    }
}
