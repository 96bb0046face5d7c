//! Redis-backed credential cache.

use super::{CacheConnector, CacheStore};
use crate::config::CacheSettings;
use crate::error::{DispatchError, Result};
use async_trait::async_trait;
use redis::aio::{ConnectionLike, MultiplexedConnection};
use redis::AsyncCommands;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

/// Builds the `redis://` URL, rejecting an empty host or port.
pub fn redis_address(settings: &CacheSettings) -> Result<String> {
    let host = settings.host.trim();
    match (host.is_empty(), settings.port) {
        (false, Some(port)) => Ok(format!("redis://{}:{}/{}", host, port, settings.db)),
        _ => Err(DispatchError::Config(
            "cache host and port must both be set".to_string(),
        )),
    }
}

/// `PSETEX` milliseconds for `ttl`. Sub-millisecond TTLs round up to 1ms so
/// they never turn into a key without expiry; `None` and zero mean no expiry.
fn expiry_millis(ttl: Option<Duration>) -> Option<u64> {
    let ttl = ttl.filter(|ttl| !ttl.is_zero())?;
    let millis = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
    Some(millis.max(1))
}

/// A single Redis connection, verified with `PING` when opened.
#[derive(Clone)]
pub struct RedisCache {
    connection: MultiplexedConnection,
}

impl RedisCache {
    pub async fn connect(settings: &CacheSettings) -> Result<Self> {
        let address = redis_address(settings)?;
        debug!(host = %settings.host, port = ?settings.port, "Connecting to cache backend");

        let client = redis::Client::open(address.as_str())
            .map_err(|e| DispatchError::Config(format!("invalid cache address: {e}")))?;
        let mut connection = client.get_multiplexed_async_connection().await.map_err(|e| {
            error!(host = %settings.host, error = %e, "Cache backend unreachable");
            DispatchError::from(e)
        })?;
        connection
            .req_packed_command(&redis::cmd("PING"))
            .await
            .map_err(|e| {
                error!(host = %settings.host, error = %e, "Cache backend failed liveness probe");
                DispatchError::from(e)
            })?;

        Ok(Self { connection })
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut connection = self.connection.clone();
        let value: Option<String> = connection.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        let mut connection = self.connection.clone();
        match expiry_millis(ttl) {
            Some(millis) => connection.pset_ex::<_, _, ()>(key, value, millis).await?,
            None => connection.set::<_, _, ()>(key, value).await?,
        }
        Ok(())
    }
}

/// Opens a new `RedisCache` for every dispatch.
#[derive(Debug, Clone, Copy, Default)]
pub struct RedisConnector;

#[async_trait]
impl CacheConnector for RedisConnector {
    async fn connect(&self, settings: &CacheSettings) -> Result<Arc<dyn CacheStore>> {
        let cache = RedisCache::connect(settings).await?;
        Ok(Arc::new(cache))
    }
}
