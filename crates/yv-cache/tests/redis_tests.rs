//! Redis cache integration tests.

use std::time::Duration;

use yv_cache::{Cache, CacheExt, RedisCache};

fn cache() -> RedisCache {
    dotenvy::dotenv().ok();
    let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
    RedisCache::new(&url, "yv-test:").expect("Failed to create cache")
}

#[tokio::test]
#[ignore = "requires Redis"]
async fn test_redis_roundtrip() {
    let cache = cache();
    cache.ping().await.expect("Redis not reachable");

    cache
        .set("greeting", "hello".to_string(), Duration::from_secs(5))
        .await
        .unwrap();
    assert_eq!(cache.get("greeting").await.unwrap().as_deref(), Some("hello"));
}

#[tokio::test]
#[ignore = "requires Redis"]
async fn test_redis_ttl_expires() {
    let cache = cache();
    assert!(
        cache
            .set_json("short", &vec![1, 2, 3], Duration::from_millis(200))
            .await
    );
    tokio::time::sleep(Duration::from_millis(400)).await;

    let value: Option<Vec<i32>> = cache.get_json("short").await;
    assert_eq!(value, None);
}
