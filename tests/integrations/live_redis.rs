//! Exercises the Redis cache backend against a server on localhost:6379.
//!
//! Run with `--features live-tests` when a Redis instance is available.

use commonlog::cache::{CacheConnector, RedisConnector};
use commonlog::config::{CacheBackend, CacheSettings};
use std::time::Duration;

fn local_settings() -> CacheSettings {
    CacheSettings {
        backend: CacheBackend::Redis,
        host: "127.0.0.1".to_string(),
        port: Some(6379),
        db: 15,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_values_round_trip_and_expire() {
    let store = RedisConnector.connect(&local_settings()).await.unwrap();

    store
        .set("commonlog-test:forever", "v1", None)
        .await
        .unwrap();
    assert_eq!(
        store.get("commonlog-test:forever").await.unwrap().as_deref(),
        Some("v1")
    );

    store
        .set("commonlog-test:short", "v2", Some(Duration::from_secs(1)))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(store.get("commonlog-test:short").await.unwrap(), None);
}
