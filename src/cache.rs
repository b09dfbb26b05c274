use crate::error::FetchError;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

/// A pending-or-settled fetch that any number of callers can await.
pub type SharedFetch<T> = Shared<BoxFuture<'static, Result<Arc<T>, FetchError>>>;

// Statistics for cache monitoring
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        if self.hits + self.misses == 0 {
            0.0
        } else {
            self.hits as f64 / (self.hits + self.misses) as f64
        }
    }
}

/// Deduplicating response cache.
///
/// Each key maps to exactly one fetch for the lifetime of the cache, whether
/// that fetch is still in flight, succeeded or failed. Failed entries can be
/// dropped with [`ResponseCache::invalidate_failed`] or
/// [`ResponseCache::evict_failed`]; [`ResponseCache::clear`] forgets everything.
pub struct ResponseCache<T> {
    store: Mutex<HashMap<String, SharedFetch<T>>>,
    stats: Mutex<CacheStats>,
}

impl<T> ResponseCache<T>
where
    T: Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            store: Mutex::new(HashMap::new()),
            stats: Mutex::new(CacheStats::default()),
        }
    }

    /// Return the fetch stored under `key`, starting it with `fetch` if absent.
    ///
    /// A new fetch is spawned onto the runtime so it runs to completion even
    /// when every caller stops awaiting it. Must be called from within a
    /// Tokio runtime.
    pub fn get_or_fetch<F, Fut>(&self, key: &str, fetch: F) -> SharedFetch<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, FetchError>> + Send + 'static,
    {
        let mut store = self.lock_store();

        if let Some(existing) = store.get(key) {
            tracing::debug!("Cache hit for key: {}", key);
            self.record(|stats| stats.hits += 1);
            return existing.clone();
        }

        tracing::debug!("Cache miss for key: {}, starting fetch", key);
        self.record(|stats| stats.misses += 1);

        let task = tokio::spawn(fetch());
        let task_key = key.to_string();
        let shared = async move {
            match task.await {
                Ok(result) => result.map(Arc::new),
                Err(e) => {
                    tracing::error!("Fetch task for key {} did not complete: {}", task_key, e);
                    Err(FetchError::Client(format!("fetch for {task_key} was aborted: {e}")))
                }
            }
        }
        .boxed()
        .shared();

        store.insert(key.to_string(), shared.clone());
        shared
    }

    pub fn clear(&self) {
        let mut store = self.lock_store();
        let size = store.len();
        store.clear();
        tracing::info!("Cleared cache ({} entries)", size);

        // Reset stats
        self.record(|stats| *stats = CacheStats::default());
    }

    /// Forget the entry under `key` if its fetch settled with an error.
    /// Pending and successful entries are kept.
    pub fn invalidate_failed(&self, key: &str) -> bool {
        let mut store = self.lock_store();
        let failed = store.get(key).is_some_and(Self::is_failed);
        if failed {
            store.remove(key);
            tracing::debug!("Invalidated failed cache entry: {}", key);
        }
        failed
    }

    /// Forget every entry whose fetch settled with an error.
    pub fn evict_failed(&self) -> usize {
        let mut store = self.lock_store();
        let before = store.len();
        store.retain(|_, entry| !Self::is_failed(entry));
        let evicted = before - store.len();
        if evicted > 0 {
            tracing::debug!("Evicted {} failed cache entries", evicted);
        }
        evicted
    }

    // Polls once without waiting, so a finished fetch nobody awaited still counts.
    fn is_failed(entry: &SharedFetch<T>) -> bool {
        matches!(entry.clone().now_or_never(), Some(Err(_)))
    }

    pub fn size(&self) -> usize {
        self.lock_store().len()
    }

    // Check if a key exists without touching the stats
    pub fn contains_key(&self, key: &str) -> bool {
        self.lock_store().contains_key(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.lock_store().keys().cloned().collect()
    }

    pub fn stats(&self) -> CacheStats {
        match self.stats.lock() {
            Ok(stats) => stats.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn hit_rate(&self) -> f64 {
        self.stats().hit_rate()
    }

    fn lock_store(&self) -> MutexGuard<'_, HashMap<String, SharedFetch<T>>> {
        match self.store.lock() {
            Ok(store) => store,
            Err(poisoned) => {
                tracing::error!("Cache lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn record(&self, update: impl FnOnce(&mut CacheStats)) {
        match self.stats.lock() {
            Ok(mut stats) => update(&mut stats),
            Err(e) => tracing::error!("Failed to acquire cache stats lock: {}", e),
        }
    }
}

impl<T> Default for ResponseCache<T>
where
    T: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn counted_fetch(
        counter: &Arc<AtomicUsize>,
        result: Result<String, FetchError>,
    ) -> impl FnOnce() -> BoxFuture<'static, Result<String, FetchError>> {
        let counter = counter.clone();
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                result
            }
            .boxed()
        }
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_fetch() {
        let cache: Arc<ResponseCache<String>> = Arc::new(ResponseCache::new());
        let counter = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..10 {
            let cache = cache.clone();
            let counter = counter.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_fetch("pokemon-25", counted_fetch(&counter, Ok("pikachu".to_string())))
                    .await
            }));
        }

        for handle in handles {
            let value = handle.await.unwrap().unwrap();
            assert_eq!(value.as_str(), "pikachu");
        }
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(cache.size(), 1);
    }

    #[tokio::test]
    async fn test_failure_is_shared_and_cached() {
        let cache: ResponseCache<String> = ResponseCache::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let first = cache.get_or_fetch("pokemon-9999", counted_fetch(&counter, Err(FetchError::NotFound)));
        let second = cache.get_or_fetch("pokemon-9999", counted_fetch(&counter, Ok("x".to_string())));

        assert_eq!(first.await.unwrap_err(), FetchError::NotFound);
        assert_eq!(second.await.unwrap_err(), FetchError::NotFound);

        let later = cache.get_or_fetch("pokemon-9999", counted_fetch(&counter, Ok("x".to_string())));
        assert_eq!(later.await.unwrap_err(), FetchError::NotFound);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_settled_value_is_reused() {
        let cache: ResponseCache<String> = ResponseCache::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let first = cache
            .get_or_fetch("list-1000", counted_fetch(&counter, Ok("index".to_string())))
            .await
            .unwrap();
        let second = cache
            .get_or_fetch("list-1000", counted_fetch(&counter, Ok("other".to_string())))
            .await
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1 });
        assert_eq!(cache.hit_rate(), 0.5);
    }

    #[tokio::test]
    async fn test_clear_forces_refetch() {
        let cache: ResponseCache<String> = ResponseCache::new();
        let counter = Arc::new(AtomicUsize::new(0));

        cache
            .get_or_fetch("species-6", counted_fetch(&counter, Ok("a".to_string())))
            .await
            .unwrap();
        assert!(cache.contains_key("species-6"));

        cache.clear();
        assert_eq!(cache.size(), 0);
        assert!(!cache.contains_key("species-6"));
        assert_eq!(cache.stats(), CacheStats::default());

        let refetched = cache
            .get_or_fetch("species-6", counted_fetch(&counter, Ok("b".to_string())))
            .await
            .unwrap();
        assert_eq!(refetched.as_str(), "b");
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_abandoned_fetch_still_completes() {
        let cache: ResponseCache<String> = ResponseCache::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let abandoned = cache.get_or_fetch("evolution-x", counted_fetch(&counter, Ok("chain".to_string())));
        drop(abandoned);
        tokio::time::sleep(Duration::from_millis(50)).await;

        let value = cache
            .get_or_fetch("evolution-x", counted_fetch(&counter, Ok("other".to_string())))
            .now_or_never()
            .expect("fetch should already be settled")
            .unwrap();
        assert_eq!(value.as_str(), "chain");
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalidate_failed_keeps_successes() {
        let cache: ResponseCache<String> = ResponseCache::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let ok = cache.get_or_fetch("pokemon-1", counted_fetch(&counter, Ok("a".to_string())));
        let failed = cache.get_or_fetch("pokemon-2", counted_fetch(&counter, Err(FetchError::ServiceUnavailable)));
        let pending = cache.get_or_fetch("pokemon-3", counted_fetch(&counter, Ok("c".to_string())));
        assert!(ok.await.is_ok());
        assert!(failed.await.is_err());

        assert!(!cache.invalidate_failed("pokemon-1"));
        assert!(!cache.invalidate_failed("pokemon-3"));
        assert!(!cache.invalidate_failed("missing"));
        assert!(cache.invalidate_failed("pokemon-2"));
        assert!(!cache.contains_key("pokemon-2"));

        let retried = cache
            .get_or_fetch("pokemon-2", counted_fetch(&counter, Ok("b".to_string())))
            .await
            .unwrap();
        assert_eq!(retried.as_str(), "b");
        assert!(pending.await.is_ok());
        assert_eq!(counter.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_evict_failed_drops_only_errors() {
        let cache: ResponseCache<String> = ResponseCache::new();
        let counter = Arc::new(AtomicUsize::new(0));

        cache
            .get_or_fetch("species-1", counted_fetch(&counter, Ok("a".to_string())))
            .await
            .unwrap();
        for key in ["species-2", "species-3"] {
            let result = cache
                .get_or_fetch(key, counted_fetch(&counter, Err(FetchError::Connectivity)))
                .await;
            assert!(result.is_err());
        }

        drop(cache.get_or_fetch("species-4", counted_fetch(&counter, Err(FetchError::Connectivity))));
        tokio::time::sleep(Duration::from_millis(60)).await;

        assert_eq!(cache.evict_failed(), 3);
        let mut keys = cache.keys();
        keys.sort();
        assert_eq!(keys, vec!["species-1"]);
        assert_eq!(cache.evict_failed(), 0);
    }

    #[tokio::test]
    async fn test_distinct_keys_fetch_independently() {
        let cache: ResponseCache<String> = ResponseCache::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let a = cache.get_or_fetch("pokemon-1", counted_fetch(&counter, Ok("a".to_string())));
        let b = cache.get_or_fetch("pokemon-2", counted_fetch(&counter, Ok("b".to_string())));
        let (a, b) = futures::join!(a, b);

        assert_eq!(a.unwrap().as_str(), "a");
        assert_eq!(b.unwrap().as_str(), "b");
        assert_eq!(counter.load(Ordering::SeqCst), 2);
        let mut keys = cache.keys();
        keys.sort();
        assert_eq!(keys, vec!["pokemon-1", "pokemon-2"]);
    }
}
