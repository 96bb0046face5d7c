//! A cache connector that records how the cache is used.

#![allow(dead_code)]

use async_trait::async_trait;
use commonlog::cache::{CacheConnector, CacheStore, MemoryCache};
use commonlog::config::CacheSettings;
use commonlog::Result;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
pub struct CountingCache {
    inner: MemoryCache,
    pub connects: AtomicUsize,
    pub gets: AtomicUsize,
    pub sets: AtomicUsize,
    ttls: Mutex<HashMap<String, Option<Duration>>>,
}

impl CountingCache {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn sets(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }

    pub async fn value(&self, key: &str) -> Option<String> {
        self.inner.get(key).await.unwrap()
    }

    /// The TTL passed with the last write of `key`; `None` if it was never written.
    pub fn ttl(&self, key: &str) -> Option<Option<Duration>> {
        self.ttls.lock().unwrap().get(key).copied()
    }
}

/// Handle returned by `CountingCache::connect`, counting every operation.
struct CountingHandle(Arc<CountingCache>);

#[async_trait]
impl CacheStore for CountingHandle {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.0.gets.fetch_add(1, Ordering::SeqCst);
        self.0.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        self.0.sets.fetch_add(1, Ordering::SeqCst);
        self.0.ttls.lock().unwrap().insert(key.to_string(), ttl);
        self.0.inner.set(key, value, ttl).await
    }
}

/// Connects through an `Arc` so handles can point back at the counters.
pub struct CountingConnector(pub Arc<CountingCache>);

#[async_trait]
impl CacheConnector for CountingConnector {
    async fn connect(&self, _settings: &CacheSettings) -> Result<Arc<dyn CacheStore>> {
        self.0.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(CountingHandle(self.0.clone())))
    }
}
