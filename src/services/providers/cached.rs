use std::sync::Arc;

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::AppResult,
    models::{CourseSummary, ViewerContext},
    services::providers::RecommendationProvider,
};

/// Reuses provider output for identical viewer contexts within `ttl` seconds,
/// so reloading a page does not reshuffle the carousel.
#[derive(Clone)]
pub struct CachedProvider {
    inner: Arc<dyn RecommendationProvider>,
    cache: Cache,
    ttl: u64,
}

impl CachedProvider {
    pub fn new(inner: Arc<dyn RecommendationProvider>, cache: Cache, ttl: u64) -> Self {
        Self { inner, cache, ttl }
    }
}

#[async_trait::async_trait]
impl RecommendationProvider for CachedProvider {
    async fn get_recommendations(&self, viewer: &ViewerContext) -> AppResult<Vec<CourseSummary>> {
        let key = CacheKey::Recommendations(viewer.clone());
        let inner = self.inner.clone();
        let viewer = viewer.clone();

        cached!(self.cache, key, self.ttl, async move {
            inner.get_recommendations(&viewer).await
        })
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_redis_client;
    use crate::models::{build_request, from_unix};
    use crate::services::providers::MockRecommendationProvider;
    use ::redis::AsyncCommands;
    use std::time::Duration;

    fn redis_url() -> String {
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string())
    }

    fn course() -> CourseSummary {
        CourseSummary {
            id: 11,
            full_name: "Infection control".to_string(),
            url: "http://lms/course/view.php?id=11".to_string(),
            image_url: "http://lms/img/11.png".to_string(),
            category_label: "Hygiene".to_string(),
            last_modified: from_unix(1_709_596_800),
        }
    }

    async fn clear(client: &::redis::Client, key: &CacheKey) {
        let mut conn = client.get_multiplexed_async_connection().await.unwrap();
        let _: () = conn.del(key.to_string()).await.unwrap();
    }

    // The write lands asynchronously; wait for it before the second call.
    async fn wait_for_entry(cache: &Cache, key: &CacheKey) {
        for _ in 0..50 {
            let entry: Option<Vec<CourseSummary>> = cache.get_from_cache(key).await.unwrap();
            if entry.is_some() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("cache entry for {} never written", key);
    }

    #[tokio::test]
    #[ignore = "requires a running Redis at REDIS_URL"]
    async fn test_identical_requests_hit_provider_once() {
        let client = create_redis_client(&redis_url()).unwrap();
        let (cache, _handle) = Cache::connect(client.clone()).await.unwrap();

        let viewer = build_request(-3, Some("Acme"), Some("Nurse"), Some(4));
        let key = CacheKey::Recommendations(viewer.clone());
        clear(&client, &key).await;

        let mut inner = MockRecommendationProvider::new();
        inner
            .expect_get_recommendations()
            .times(1)
            .returning(|_| Ok(vec![course()]));

        let provider = CachedProvider::new(Arc::new(inner), cache.clone(), 60);

        let first = provider.get_recommendations(&viewer).await.unwrap();
        wait_for_entry(&cache, &key).await;
        let second = provider.get_recommendations(&viewer).await.unwrap();

        assert_eq!(first, vec![course()]);
        assert_eq!(second, first);

        clear(&client, &key).await;
    }

    #[tokio::test]
    #[ignore = "requires a running Redis at REDIS_URL"]
    async fn test_failed_cache_read_falls_through_to_provider() {
        let client = create_redis_client(&redis_url()).unwrap();
        let (cache, handle) = Cache::connect(client.clone()).await.unwrap();

        let viewer = build_request(-4, Some("Acme"), Some("Nurse"), Some(4));
        let key = CacheKey::Recommendations(viewer.clone());
        clear(&client, &key).await;

        // A list under the key makes GET fail with WRONGTYPE
        let mut conn = client.get_multiplexed_async_connection().await.unwrap();
        let _: () = conn.rpush(key.to_string(), "not a string").await.unwrap();
        assert!(cache
            .get_from_cache::<Vec<CourseSummary>>(&key)
            .await
            .is_err());

        let mut inner = MockRecommendationProvider::new();
        inner
            .expect_get_recommendations()
            .times(1)
            .returning(|_| Ok(vec![course()]));

        let provider = CachedProvider::new(Arc::new(inner), cache, 60);
        let courses = provider.get_recommendations(&viewer).await.unwrap();
        assert_eq!(courses, vec![course()]);

        handle.shutdown().await;
        clear(&client, &key).await;
    }
}
