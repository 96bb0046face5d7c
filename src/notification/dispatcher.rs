//! The `Logger` is the entry point for sending alerts.
//!
//! It resolves the destination channel, folds an optional trace log into the
//! attachment, and delegates to the configured provider. INFO alerts are only
//! written to the local log and never reach a provider.

use super::{create_provider, ProviderKind};
use crate::cache::{connector_for, CacheConnector};
use crate::config::Config;
use crate::core::{merge_trace, AlertLevel, Attachment, Provider};
use crate::error::Result;
use std::sync::Arc;
use tracing::{error, info};

/// What the `Logger` does with a failed delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Return the error to the caller.
    #[default]
    Propagate,
    /// Log the error and report success.
    LogOnly,
}

/// Dispatches alerts to one chat platform.
pub struct Logger {
    config: Config,
    provider: Arc<dyn Provider>,
    http: reqwest::Client,
    cache: Arc<dyn CacheConnector>,
    failure_policy: FailurePolicy,
}

impl Logger {
    /// Creates a `Logger` with a fresh HTTP client and the cache backend named
    /// in `config.cache`.
    pub fn new(config: Config) -> Self {
        let cache = connector_for(&config.cache);
        Self::with_transport(config, reqwest::Client::new(), cache)
    }

    /// Creates a `Logger` on top of existing transport handles.
    pub fn with_transport(config: Config, http: reqwest::Client, cache: Arc<dyn CacheConnector>) -> Self {
        let kind = ProviderKind::from_name(&config.provider);
        let provider = create_provider(kind, http.clone(), cache.clone());
        Self {
            config,
            provider,
            http,
            cache,
            failure_policy: FailurePolicy::default(),
        }
    }

    pub fn with_failure_policy(mut self, failure_policy: FailurePolicy) -> Self {
        self.failure_policy = failure_policy;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// The channel an alert of `level` goes to when no override is given.
    pub fn resolve_channel(&self, level: AlertLevel) -> String {
        match &self.config.channel_resolver {
            Some(resolver) => resolver.resolve_channel(level),
            None => self.config.channel.clone(),
        }
    }

    /// Sends an alert to the routed channel.
    pub async fn send(
        &self,
        level: AlertLevel,
        message: &str,
        attachment: Option<&Attachment>,
        trace: &str,
    ) -> Result<()> {
        self.send_to_channel(level, message, attachment, trace, "").await
    }

    /// Sends an alert to `channel`, or to the routed channel when `channel` is empty.
    pub async fn send_to_channel(
        &self,
        level: AlertLevel,
        message: &str,
        attachment: Option<&Attachment>,
        trace: &str,
        channel: &str,
    ) -> Result<()> {
        self.dispatch(self.provider.as_ref(), level, message, attachment, trace, channel)
            .await
    }

    /// Like `send_to_channel`, but through the provider named `provider`.
    /// Unknown names fall back to Slack.
    pub async fn custom_send(
        &self,
        provider: &str,
        level: AlertLevel,
        message: &str,
        attachment: Option<&Attachment>,
        trace: &str,
        channel: &str,
    ) -> Result<()> {
        let kind = ProviderKind::from_name(provider);
        let provider = create_provider(kind, self.http.clone(), self.cache.clone());
        self.dispatch(provider.as_ref(), level, message, attachment, trace, channel)
            .await
    }

    async fn dispatch(
        &self,
        provider: &dyn Provider,
        level: AlertLevel,
        message: &str,
        attachment: Option<&Attachment>,
        trace: &str,
        channel: &str,
    ) -> Result<()> {
        if level == AlertLevel::Info {
            info!(service = %self.config.service_name, "[INFO] {}", message);
            return Ok(());
        }

        let resolved_channel = if channel.is_empty() {
            self.resolve_channel(level)
        } else {
            channel.to_string()
        };

        let mut send_config = self.config.clone();
        send_config.channel = resolved_channel.clone();

        let attachment = merge_trace(attachment.cloned(), trace);

        let result = provider
            .send_to_channel(level, message, attachment.as_ref(), &send_config, &resolved_channel)
            .await;

        match result {
            Ok(()) => {
                metrics::counter!(
                    "alerts_dispatched_total",
                    "provider" => provider.name().to_string(),
                    "level" => level.as_str()
                )
                .increment(1);
                Ok(())
            }
            Err(e) => {
                metrics::counter!("alerts_failed_total", "provider" => provider.name().to_string())
                    .increment(1);
                error!(
                    provider = provider.name(),
                    channel = %resolved_channel,
                    level = %level,
                    error = %e,
                    "Failed to send alert"
                );
                match self.failure_policy {
                    FailurePolicy::Propagate => Err(e),
                    FailurePolicy::LogOnly => Ok(()),
                }
            }
        }
    }
}
