//! crates/movie_tracker_core/src/movie_cache.rs
//!
//! Cache-aside resolution of movie ids into enriched view models. Within a
//! single turn every referenced id is resolved concurrently; individually
//! failing ids are logged and omitted rather than failing the batch.

use crate::domain::{MovieReference, MovieViewModel};
use crate::ports::{MovieMetadataProvider, SharedCache};
use std::sync::Arc;
use tracing::{debug, warn};

/// Cache-aside resolver over the shared cache and the metadata provider.
///
/// Resolution is idempotent; duplicate concurrent misses for the same id may
/// both fetch and both write (last write wins). No single-flight guarantee.
#[derive(Clone)]
pub struct MovieCache {
    cache: Arc<dyn SharedCache>,
    metadata: Arc<dyn MovieMetadataProvider>,
}

impl MovieCache {
    pub fn new(cache: Arc<dyn SharedCache>, metadata: Arc<dyn MovieMetadataProvider>) -> Self {
        Self { cache, metadata }
    }

    /// Resolves one movie id, consulting the cache before the provider.
    ///
    /// Returns `None` when the id is malformed or the provider call fails;
    /// the caller simply omits that entry.
    pub async fn resolve(&self, movie_id: &str) -> Option<MovieViewModel> {
        match self.cache.get(movie_id).await {
            Ok(Some(json)) => match serde_json::from_str::<MovieViewModel>(&json) {
                Ok(movie) => {
                    debug!(movie_id, "movie served from cache");
                    return Some(movie);
                }
                Err(e) => {
                    // Unreadable cache entry; fall through to a fresh fetch.
                    warn!(movie_id, error = %e, "discarding undecodable cache entry");
                }
            },
            Ok(None) => {}
            Err(e) => {
                warn!(movie_id, error = %e, "cache lookup failed; falling back to provider");
            }
        }

        let numeric_id: i32 = match movie_id.parse() {
            Ok(id) => id,
            Err(_) => {
                warn!(movie_id, "skipping malformed movie id");
                return None;
            }
        };

        let movie = match self.metadata.movie_details(numeric_id).await {
            Ok(movie) => movie,
            Err(e) => {
                warn!(movie_id, error = %e, "metadata lookup failed; skipping movie");
                return None;
            }
        };

        match serde_json::to_string(&movie) {
            Ok(json) => {
                if let Err(e) = self.cache.set(movie_id, &json).await {
                    warn!(movie_id, error = %e, "cache write failed");
                }
            }
            Err(e) => warn!(movie_id, error = %e, "failed to serialize movie for cache"),
        }

        Some(movie)
    }

    /// Resolves every referenced movie concurrently (one task per id) and
    /// joins the handles in submission order, so the returned list preserves
    /// the order of `references` modulo omitted failures.
    pub async fn resolve_all(&self, references: &[MovieReference]) -> Vec<MovieViewModel> {
        let mut tasks = Vec::with_capacity(references.len());
        for reference in references {
            let resolver = self.clone();
            let movie_id = reference.id.clone();
            tasks.push(tokio::spawn(
                async move { resolver.resolve(&movie_id).await },
            ));
        }

        let mut movies = Vec::with_capacity(tasks.len());
        for task in tasks {
            match task.await {
                Ok(Some(movie)) => movies.push(movie),
                Ok(None) => {}
                Err(e) => warn!(error = %e, "movie resolution task panicked"),
            }
        }
        movies
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MovieViewModel;
    use crate::ports::{ChatError, ChatResult};
    use async_trait::async_trait;
    use mockall::mock;
    use std::collections::HashMap;
    use std::sync::Mutex;

    mock! {
        MetadataProvider {}

        #[async_trait]
        impl MovieMetadataProvider for MetadataProvider {
            async fn movie_details(&self, movie_id: i32) -> ChatResult<MovieViewModel>;
        }
    }

    /// In-memory stand-in for the shared cache.
    #[derive(Default)]
    struct MemoryCache {
        entries: Mutex<HashMap<String, String>>,
    }

    #[async_trait]
    impl SharedCache for MemoryCache {
        async fn get(&self, key: &str) -> ChatResult<Option<String>> {
            Ok(self.entries.lock().unwrap().get(key).cloned())
        }

        async fn set(&self, key: &str, value: &str) -> ChatResult<()> {
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }
    }

    fn sample_movie(id: &str, title: &str) -> MovieViewModel {
        MovieViewModel {
            poster_path: Some(format!("/poster-{id}.jpg")),
            adult: false,
            overview: format!("Overview of {title}"),
            release_date: Some("2010-07-16".to_string()),
            genre_ids: vec![28, 878],
            id: id.to_string(),
            original_title: title.to_string(),
            original_language: "en".to_string(),
            title: title.to_string(),
            backdrop_path: None,
            popularity: 51.2,
            vote_count: 31000,
            favorite: false,
            vote_average: 8.4,
            imdb_id: "tt1375666".to_string(),
        }
    }

    fn reference(id: &str) -> MovieReference {
        MovieReference { id: id.to_string(), name: format!("movie {id}") }
    }

    #[tokio::test]
    async fn second_resolve_is_served_from_cache() {
        let mut provider = MockMetadataProvider::new();
        provider
            .expect_movie_details()
            .times(1)
            .returning(|id| Ok(sample_movie(&id.to_string(), "Inception")));

        let cache = MovieCache::new(Arc::new(MemoryCache::default()), Arc::new(provider));

        let first = cache.resolve("27205").await.unwrap();
        let second = cache.resolve("27205").await.unwrap();
        // Byte-for-byte equal data; the provider mock enforces a single call.
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn malformed_id_is_skipped_without_provider_call() {
        let mut provider = MockMetadataProvider::new();
        provider.expect_movie_details().times(0);

        let cache = MovieCache::new(Arc::new(MemoryCache::default()), Arc::new(provider));
        assert!(cache.resolve("tt0133093").await.is_none());
    }

    #[tokio::test]
    async fn provider_failure_is_skipped() {
        let mut provider = MockMetadataProvider::new();
        provider
            .expect_movie_details()
            .returning(|_| Err(ChatError::Upstream("tmdb unavailable".to_string())));

        let cache = MovieCache::new(Arc::new(MemoryCache::default()), Arc::new(provider));
        assert!(cache.resolve("27205").await.is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_resolution_preserves_order_and_omits_failures() {
        let mut provider = MockMetadataProvider::new();
        provider.expect_movie_details().returning(|id| {
            if id == 603 {
                Err(ChatError::Upstream("boom".to_string()))
            } else {
                Ok(sample_movie(&id.to_string(), "Some Movie"))
            }
        });

        let cache = MovieCache::new(Arc::new(MemoryCache::default()), Arc::new(provider));
        let refs = vec![
            reference("27205"),
            reference("603"),       // provider failure, omitted
            reference("not-an-id"), // malformed, omitted
            reference("550"),
            reference("680"),
        ];

        let movies = cache.resolve_all(&refs).await;
        let ids: Vec<&str> = movies.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["27205", "550", "680"]);
    }

    #[tokio::test]
    async fn undecodable_cache_entry_falls_through_to_provider() {
        let memory = Arc::new(MemoryCache::default());
        memory.set("27205", "definitely not json").await.unwrap();

        let mut provider = MockMetadataProvider::new();
        provider
            .expect_movie_details()
            .times(1)
            .returning(|_| Ok(sample_movie("27205", "Inception")));

        let cache = MovieCache::new(memory, Arc::new(provider));
        assert!(cache.resolve("27205").await.is_some());
    }
}
