//! Core domain types and service traits for commonlog
//!
//! This module defines the alert vocabulary (levels, attachments), the
//! channel-routing capability, and the `Provider` contract every chat
//! platform transport implements.

use crate::config::Config;
use crate::error::{DispatchError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// File name given to attachments synthesized from a trace log.
pub const TRACE_FILE_NAME: &str = "trace.log";

/// Separator inserted between existing attachment content and a trace log.
pub const TRACE_SEPARATOR: &str = "\n\n--- Trace Log ---\n";

/// Severity of an alert, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    /// Log-only. Never reaches a provider.
    Info,
    Warn,
    Error,
}

impl AlertLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertLevel::Info => "info",
            AlertLevel::Warn => "warn",
            AlertLevel::Error => "error",
        }
    }
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_uppercase())
    }
}

impl FromStr for AlertLevel {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "info" => Ok(AlertLevel::Info),
            "warn" | "warning" => Ok(AlertLevel::Warn),
            "error" => Ok(AlertLevel::Error),
            other => Err(DispatchError::Config(format!("unknown alert level: {other}"))),
        }
    }
}

/// Optional diagnostic payload carried alongside an alert.
///
/// `content` is rendered inline as a code block, `url` as a link line. Either,
/// both, or neither may be set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub url: String,
}

impl Attachment {
    pub fn inline(file_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            content: content.into(),
            url: String::new(),
        }
    }

    pub fn link(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }
}

/// Folds a trace log into an attachment.
///
/// Existing inline content is only ever extended, and a URL is never touched.
/// An attachment without inline content takes the trace as its content and
/// is renamed to `trace.log`.
pub fn merge_trace(attachment: Option<Attachment>, trace: &str) -> Option<Attachment> {
    if trace.is_empty() {
        return attachment;
    }

    match attachment {
        None => Some(Attachment::inline(TRACE_FILE_NAME, trace)),
        Some(mut existing) => {
            if existing.content.is_empty() {
                existing.content = trace.to_string();
                existing.file_name = TRACE_FILE_NAME.to_string();
            } else {
                existing.content.push_str(TRACE_SEPARATOR);
                existing.content.push_str(trace);
            }
            Some(existing)
        }
    }
}

// =============================================================================
// Service Traits
// =============================================================================

/// Maps an alert level to a destination channel name.
pub trait ChannelResolver: Send + Sync {
    fn resolve_channel(&self, level: AlertLevel) -> String;
}

impl fmt::Debug for dyn ChannelResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelResolver")
            .field("info", &self.resolve_channel(AlertLevel::Info))
            .field("warn", &self.resolve_channel(AlertLevel::Warn))
            .field("error", &self.resolve_channel(AlertLevel::Error))
            .finish()
    }
}

/// A level-to-channel table with a fallback channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultChannelResolver {
    #[serde(default)]
    pub channel_map: HashMap<AlertLevel, String>,
    #[serde(default)]
    pub default_channel: String,
}

impl DefaultChannelResolver {
    pub fn new(channel_map: HashMap<AlertLevel, String>, default_channel: impl Into<String>) -> Self {
        Self {
            channel_map,
            default_channel: default_channel.into(),
        }
    }
}

impl ChannelResolver for DefaultChannelResolver {
    fn resolve_channel(&self, level: AlertLevel) -> String {
        self.channel_map
            .get(&level)
            .cloned()
            .unwrap_or_else(|| self.default_channel.clone())
    }
}

/// A transport for one chat platform.
///
/// Providers hold no per-call state; everything a dispatch needs travels in
/// the `Config` passed to each call.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Short platform name (e.g., "slack", "lark"), used for logging and metrics.
    fn name(&self) -> &str;

    /// Sends to the channel configured in `config`.
    async fn send(
        &self,
        level: AlertLevel,
        message: &str,
        attachment: Option<&Attachment>,
        config: &Config,
    ) -> Result<()> {
        self.send_to_channel(level, message, attachment, config, &config.channel)
            .await
    }

    /// Sends to an explicit channel, ignoring `config.channel`.
    async fn send_to_channel(
        &self,
        level: AlertLevel,
        message: &str,
        attachment: Option<&Attachment>,
        config: &Config,
        channel: &str,
    ) -> Result<()>;
}
