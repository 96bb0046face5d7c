//! Chat platform providers and the alert dispatcher.
//!
//! Each platform implements `Provider`; the `Logger` picks one by name,
//! resolves the destination channel, folds trace logs into attachments and
//! hands the alert over.
pub mod dispatcher;
pub mod lark;
pub mod slack;

pub use dispatcher::{FailurePolicy, Logger};
pub use lark::LarkProvider;
pub use slack::SlackProvider;

use crate::cache::CacheConnector;
use crate::core::Provider;
use crate::error::{DispatchError, Result};
use reqwest::{RequestBuilder, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, warn};

/// The supported chat platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Slack,
    Lark,
}

impl ProviderKind {
    /// Maps a provider name to a platform. Unknown names fall back to Slack.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "slack" => ProviderKind::Slack,
            "lark" => ProviderKind::Lark,
            other => {
                warn!(provider = other, "Unknown provider, defaulting to slack");
                ProviderKind::Slack
            }
        }
    }
}

/// Builds the provider for `kind` on top of shared transport handles.
pub fn create_provider(
    kind: ProviderKind,
    http: reqwest::Client,
    cache: Arc<dyn CacheConnector>,
) -> Arc<dyn Provider> {
    match kind {
        ProviderKind::Slack => Arc::new(SlackProvider::new(http)),
        ProviderKind::Lark => Arc::new(LarkProvider::new(http, cache)),
    }
}

/// Posts `payload` and returns the response body. Anything but `200 OK` is
/// a `RemoteApi` error.
pub(crate) async fn post_json(request: RequestBuilder, payload: &Value, platform: &str) -> Result<String> {
    let response = request.json(payload).send().await.map_err(|e| {
        error!(platform, error = %e, "HTTP request failed");
        DispatchError::from(e)
    })?;

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    if status != StatusCode::OK {
        error!(
            platform,
            status = %status,
            body = %body,
            "Notification rejected"
        );
        return Err(DispatchError::RemoteApi(format!(
            "{} response: status {}, body: {}",
            platform, status, body
        )));
    }

    Ok(body)
}
