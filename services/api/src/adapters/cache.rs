//! services/api/src/adapters/cache.rs
//!
//! Shared-cache adapter backed by Redis. Implements the `SharedCache` port
//! used by the movie-metadata cache; values are serialized movie records and
//! expire after the configured TTL (or never, when none is configured).

use async_trait::async_trait;
use movie_tracker_core::ports::{ChatError, ChatResult, SharedCache};
use redis::aio::MultiplexedConnection;

/// Namespace for movie records within the shared Redis instance.
const KEY_PREFIX: &str = "movie:";

#[derive(Clone)]
pub struct RedisCacheAdapter {
    client: redis::Client,
    ttl_seconds: Option<u64>,
}

impl RedisCacheAdapter {
    pub fn new(redis_url: &str, ttl_seconds: Option<u64>) -> ChatResult<Self> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| ChatError::Storage(e.to_string()))?;
        Ok(Self {
            client,
            ttl_seconds,
        })
    }

    async fn connection(&self) -> ChatResult<MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| ChatError::Storage(e.to_string()))
    }

    fn namespaced(key: &str) -> String {
        format!("{KEY_PREFIX}{key}")
    }
}

#[async_trait]
impl SharedCache for RedisCacheAdapter {
    async fn get(&self, key: &str) -> ChatResult<Option<String>> {
        let mut conn = self.connection().await?;
        redis::cmd("GET")
            .arg(Self::namespaced(key))
            .query_async(&mut conn)
            .await
            .map_err(|e| ChatError::Storage(e.to_string()))
    }

    async fn set(&self, key: &str, value: &str) -> ChatResult<()> {
        let mut conn = self.connection().await?;
        let namespaced = Self::namespaced(key);
        match self.ttl_seconds {
            Some(ttl) => redis::cmd("SETEX")
                .arg(namespaced)
                .arg(ttl)
                .arg(value)
                .query_async::<()>(&mut conn)
                .await
                .map_err(|e| ChatError::Storage(e.to_string())),
            None => redis::cmd("SET")
                .arg(namespaced)
                .arg(value)
                .query_async::<()>(&mut conn)
                .await
                .map_err(|e| ChatError::Storage(e.to_string())),
        }
    }
}
