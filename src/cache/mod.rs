//! Credential cache.
//!
//! Tokens and chat identifiers are expensive to obtain, so both are kept in
//! an external TTL-capable key/value store. The store is reached through a
//! `CacheConnector`, which opens (and health-checks) a fresh handle for every
//! dispatch. There is no client-side locking: two cold callers may both fetch
//! and write the same key, which is harmless because the values are
//! re-derivations of the same remote fact.

pub mod memory;
pub mod redis_cache;

pub use self::memory::MemoryCache;
pub use self::redis_cache::{RedisCache, RedisConnector};

use crate::config::{CacheBackend, CacheSettings, WriteFailurePolicy};
use crate::error::Result;
use async_trait::async_trait;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// A connected key/value store.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Returns `None` when the key is absent; absence is not an error.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value`. `None` (or a zero duration) means no expiry.
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()>;
}

/// Opens a `CacheStore` from connection settings.
#[async_trait]
pub trait CacheConnector: Send + Sync {
    async fn connect(&self, settings: &CacheSettings) -> Result<Arc<dyn CacheStore>>;
}

/// Picks the connector matching the configured backend.
pub fn connector_for(settings: &CacheSettings) -> Arc<dyn CacheConnector> {
    match settings.backend {
        CacheBackend::Redis => Arc::new(RedisConnector),
        CacheBackend::Memory => Arc::new(MemoryCache::default()),
    }
}

/// Namespaced cache keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheKey<'a> {
    /// `token:<app_id>:<app_secret>`
    Token { app_id: &'a str, app_secret: &'a str },
    /// `chat-id:<environment>:<channel>`
    ChatId { environment: &'a str, channel: &'a str },
}

impl CacheKey<'_> {
    pub fn namespace(&self) -> &'static str {
        match self {
            CacheKey::Token { .. } => "token",
            CacheKey::ChatId { .. } => "chat-id",
        }
    }
}

impl fmt::Display for CacheKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::Token { app_id, app_secret } => {
                write!(f, "{}:{}:{}", self.namespace(), app_id, app_secret)
            }
            CacheKey::ChatId {
                environment,
                channel,
            } => write!(f, "{}:{}:{}", self.namespace(), environment, channel),
        }
    }
}

/// A freshly fetched value and how long it may be cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched {
    pub value: String,
    pub ttl: Option<Duration>,
}

impl Fetched {
    pub fn forever(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ttl: None,
        }
    }

    pub fn expiring(value: impl Into<String>, ttl: Duration) -> Self {
        Self {
            value: value.into(),
            ttl: Some(ttl),
        }
    }
}

/// Returns the cached value for `key`, or runs `fetch` and stores its result.
///
/// A cache hit never calls `fetch`. Errors from `fetch` are returned as-is and
/// nothing is written. A failed write either fails the call or is only logged,
/// depending on `write_failure`.
pub async fn get_or_fetch<F, Fut>(
    store: &dyn CacheStore,
    key: &CacheKey<'_>,
    write_failure: WriteFailurePolicy,
    fetch: F,
) -> Result<String>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Fetched>>,
{
    let namespace = key.namespace();
    let rendered = key.to_string();

    // An empty stored value is never a usable credential.
    if let Some(value) = store.get(&rendered).await?.filter(|value| !value.is_empty()) {
        debug!(namespace, "Credential cache hit");
        metrics::counter!("credential_cache_hits_total", "namespace" => namespace).increment(1);
        return Ok(value);
    }

    debug!(namespace, "Credential cache miss");
    metrics::counter!("credential_cache_misses_total", "namespace" => namespace).increment(1);

    let fetched = fetch().await?;
    if fetched.value.is_empty() {
        warn!(namespace, "Fetched an empty value, not caching it");
        return Ok(fetched.value);
    }
    if let Err(e) = store.set(&rendered, &fetched.value, fetched.ttl).await {
        match write_failure {
            WriteFailurePolicy::Fail => return Err(e),
            WriteFailurePolicy::Warn => {
                warn!(namespace, error = %e, "Failed to cache fetched value, using it uncached");
            }
        }
    }

    Ok(fetched.value)
}
