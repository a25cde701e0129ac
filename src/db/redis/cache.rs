use ::redis::aio::ConnectionManager;
use ::redis::AsyncCommands;
use ::redis::Client;
use std::fmt::Display;
use tokio::sync::mpsc;

use crate::error::AppResult;
use crate::models::ViewerContext;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Provider output for one viewer context
    Recommendations(ViewerContext),
}

// The context is embedded as JSON: free-text profile values may contain the
// separator, and case is significant.
impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::Recommendations(ctx) => {
                let ctx = serde_json::to_string(ctx).map_err(|_| std::fmt::Error)?;
                write!(f, "recs:{}", ctx)
            }
        }
    }
}

/// Opens a Redis client; no connection is made until first use
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

struct PendingWrite {
    key: String,
    value: String,
    ttl: u64,
}

/// Redis-backed cache with a background writer task
#[derive(Clone)]
pub struct Cache {
    conn: ConnectionManager,
    write_tx: mpsc::UnboundedSender<PendingWrite>,
}

/// Stops the background writer once pending writes are flushed
pub struct CacheWriterHandle {
    shutdown_tx: mpsc::Sender<()>,
    task: tokio::task::JoinHandle<()>,
}

impl CacheWriterHandle {
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Cache writer task panicked");
        }
    }
}

impl Cache {
    /// Connects to Redis and spawns the writer task
    pub async fn connect(redis_client: Client) -> AppResult<(Self, CacheWriterHandle)> {
        let conn = ConnectionManager::new(redis_client).await?;
        let (write_tx, write_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let task = tokio::spawn(Self::writer(conn.clone(), write_rx, shutdown_rx));

        Ok((
            Self { conn, write_tx },
            CacheWriterHandle { shutdown_tx, task },
        ))
    }

    async fn writer(
        mut conn: ConnectionManager,
        mut write_rx: mpsc::UnboundedReceiver<PendingWrite>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        tracing::debug!("Cache writer started");

        loop {
            tokio::select! {
                Some(write) = write_rx.recv() => {
                    Self::apply(&mut conn, write).await;
                }
                _ = shutdown_rx.recv() => {
                    let mut flushed = 0usize;
                    while let Ok(write) = write_rx.try_recv() {
                        Self::apply(&mut conn, write).await;
                        flushed += 1;
                    }
                    tracing::info!(flushed, "Cache writer stopped");
                    break;
                }
            }
        }
    }

    async fn apply(conn: &mut ConnectionManager, write: PendingWrite) {
        let result: ::redis::RedisResult<()> =
            conn.set_ex(&write.key, write.value, write.ttl).await;
        if let Err(e) = result {
            tracing::error!(key = %write.key, error = %e, "Cache write failed");
        }
    }

    /// Looks up `key`; entries that no longer deserialize count as a miss
    pub async fn get_from_cache<T: serde::de::DeserializeOwned>(
        &self,
        key: &CacheKey,
    ) -> AppResult<Option<T>> {
        let mut conn = self.conn.clone();
        let cached: Option<String> = conn.get(key.to_string()).await?;

        Ok(cached.and_then(|json| match serde_json::from_str(&json) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Discarding unreadable cache entry");
                None
            }
        }))
    }

    /// Queues a write; returns immediately
    pub fn set_in_background<T: serde::Serialize>(&self, key: &CacheKey, value: &T, ttl: u64) {
        let value = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(error = %e, "Cache serialization error");
                return;
            }
        };

        let write = PendingWrite {
            key: key.to_string(),
            value,
            ttl,
        };

        if self.write_tx.send(write).is_err() {
            tracing::warn!(key = %key, "Cache writer is gone, dropping write");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::build_request;

    fn redis_url() -> String {
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string())
    }

    fn key(institution: &str, role: &str, category_id: Option<i64>) -> String {
        CacheKey::Recommendations(build_request(7, Some(institution), Some(role), category_id))
            .to_string()
    }

    #[test]
    fn test_recommendations_key() {
        let ctx = build_request(42, Some("HPS eAcademy"), Some("Nurse"), Some(5));
        let key = CacheKey::Recommendations(ctx);
        assert_eq!(
            key.to_string(),
            r#"recs:{"user_id":42,"institution":"HPS eAcademy","role_attribute":"Nurse","category_id":5}"#
        );
    }

    #[test]
    fn test_recommendations_key_without_category() {
        let ctx = build_request(7, None, None, None);
        let key = CacheKey::Recommendations(ctx);
        assert_eq!(
            key.to_string(),
            r#"recs:{"user_id":7,"institution":"Unknown","role_attribute":"Unknown","category_id":null}"#
        );
    }

    #[test]
    fn test_separator_in_profile_values_does_not_collide() {
        assert_ne!(key("Acme:Nurse", "Ward", Some(5)), key("Acme", "Nurse:Ward", Some(5)));
        assert_ne!(key("Acme", "Nurse", None), key("Acme", "Nurse", Some(0)));
    }

    #[test]
    fn test_key_is_case_sensitive() {
        assert_ne!(key("Acme", "NURSE", Some(5)), key("Acme", "nurse", Some(5)));
    }

    #[tokio::test]
    #[ignore = "requires a running Redis at REDIS_URL"]
    async fn test_cache_miss() {
        let client = create_redis_client(&redis_url()).unwrap();
        let (cache, _handle) = Cache::connect(client).await.unwrap();

        let key = CacheKey::Recommendations(build_request(-1, None, None, Some(999_999)));
        let retrieved: Option<Vec<String>> = cache.get_from_cache(&key).await.unwrap();

        assert_eq!(retrieved, None);
    }

    #[tokio::test]
    #[ignore = "requires a running Redis at REDIS_URL"]
    async fn test_shutdown_flushes_pending_writes() {
        let client = create_redis_client(&redis_url()).unwrap();
        let (cache, handle) = Cache::connect(client.clone()).await.unwrap();

        let key = CacheKey::Recommendations(build_request(-2, Some("test"), None, Some(1)));
        let value = vec!["flushed".to_string()];

        cache.set_in_background(&key, &value, 60);
        handle.shutdown().await;

        let retrieved: Option<Vec<String>> = cache.get_from_cache(&key).await.unwrap();
        assert_eq!(retrieved, Some(value));

        let mut conn = client.get_multiplexed_async_connection().await.unwrap();
        let _: () = conn.del(key.to_string()).await.unwrap();
    }
}
