//! A convenience client with per-environment channel routing.
//!
//! `AlertClient` wraps a `Logger` that only logs delivery failures, so
//! callers can fire alerts without handling errors. In the `unittest`
//! environment nothing is sent at all.

use crate::config::Config;
use crate::core::{AlertLevel, Attachment, DefaultChannelResolver};
use crate::notification::{FailurePolicy, Logger};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{error, info};

/// Deployment environment of the calling service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Staging,
    Production,
    Unittest,
    Other(String),
}

impl Environment {
    pub fn as_str(&self) -> &str {
        match self {
            Environment::Dev => "dev",
            Environment::Staging => "staging",
            Environment::Production => "production",
            Environment::Unittest => "unittest",
            Environment::Other(name) => name.as_str(),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The routing table for `prefix` in `environment`.
///
/// Production uses `#<prefix>-general|warnings|alerts`; other known
/// environments insert their name after the prefix. Unknown environments
/// route everything to `#<prefix>-general`.
pub fn default_routing(prefix: &str, environment: &Environment) -> DefaultChannelResolver {
    let stem = match environment {
        Environment::Production => prefix.to_string(),
        Environment::Other(_) => {
            return DefaultChannelResolver::new(HashMap::new(), format!("#{}-general", prefix));
        }
        known => format!("{}-{}", prefix, known.as_str()),
    };

    let general = format!("#{}-general", stem);
    let channel_map = HashMap::from([
        (AlertLevel::Info, general.clone()),
        (AlertLevel::Warn, format!("#{}-warnings", stem)),
        (AlertLevel::Error, format!("#{}-alerts", stem)),
    ]);
    DefaultChannelResolver::new(channel_map, general)
}

pub struct AlertClient {
    logger: Logger,
    environment: Environment,
}

impl AlertClient {
    /// Builds a client for `service_name`. `config` supplies the provider,
    /// send method and credentials; its service name, environment and routing
    /// are replaced.
    pub fn new(
        service_name: &str,
        environment: Environment,
        channel_prefix: &str,
        mut config: Config,
    ) -> Self {
        config.service_name = service_name.to_string();
        config.environment = environment.to_string();
        config.channel_resolver = Some(Arc::new(default_routing(channel_prefix, &environment)));

        let logger = Logger::new(config).with_failure_policy(FailurePolicy::LogOnly);
        Self {
            logger,
            environment,
        }
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub async fn send_info(&self, message: &str) {
        self.send_or_log(AlertLevel::Info, message, None, "").await
    }

    pub async fn send_warn(&self, message: &str) {
        self.send_or_log(AlertLevel::Warn, message, None, "").await
    }

    pub async fn send_warn_with_attachment(&self, message: &str, attachment: &Attachment) {
        self.send_or_log(AlertLevel::Warn, message, Some(attachment), "")
            .await
    }

    pub async fn send_warn_with_trace(&self, message: &str, trace: &str) {
        self.send_or_log(AlertLevel::Warn, message, None, trace).await
    }

    pub async fn send_error(&self, message: &str) {
        self.send_or_log(AlertLevel::Error, message, None, "").await
    }

    pub async fn send_error_with_attachment(&self, message: &str, attachment: &Attachment) {
        self.send_or_log(AlertLevel::Error, message, Some(attachment), "")
            .await
    }

    pub async fn send_error_with_trace(&self, message: &str, trace: &str) {
        self.send_or_log(AlertLevel::Error, message, None, trace)
            .await
    }

    pub async fn send_error_with_attachment_and_trace(
        &self,
        message: &str,
        attachment: &Attachment,
        trace: &str,
    ) {
        self.send_or_log(AlertLevel::Error, message, Some(attachment), trace)
            .await
    }

    async fn send_or_log(
        &self,
        level: AlertLevel,
        message: &str,
        attachment: Option<&Attachment>,
        trace: &str,
    ) {
        if self.environment == Environment::Unittest {
            info!(
                level = %level,
                attachment = attachment.map(|a| a.file_name.as_str()).unwrap_or(""),
                trace,
                "{}",
                message
            );
            return;
        }

        if let Err(e) = self.logger.send(level, message, attachment, trace).await {
            error!(level = %level, error = %e, "Failed to send alert");
        }
    }
}
