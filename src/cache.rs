use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use tracing::{debug, warn};

use crate::catalog::FetchError;

/// Outcome of a retrieval as seen by every requester of the same key
pub type FetchResult<T> = Result<Arc<Vec<T>>, FetchError>;

/// A retrieval that may still be in flight. Clones all resolve to the same value.
pub type Pending<T> = Shared<BoxFuture<'static, FetchResult<T>>>;

/// Request cache keyed by resource URL.
///
/// The first lookup of a key stores a shared future for the retrieval, later
/// lookups get a clone of it. Entries are never evicted on their own, failures
/// included; `invalidate` is the only way to force a second retrieval.
pub struct FetchCache<T> {
    entries: Mutex<HashMap<String, Pending<T>>>,
}

impl<T> FetchCache<T>
where
    T: Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Return the pending result for `key`, calling `make` to start the
    /// retrieval only when the key has never been seen.
    pub fn get_or_insert_with<F, Fut>(&self, key: &str, make: F) -> Pending<T>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<Vec<T>, FetchError>> + Send + 'static,
    {
        let mut entries = self.entries.lock().unwrap();

        if let Some(pending) = entries.get(key) {
            debug!(key, "cache hit");
            return pending.clone();
        }

        debug!(key, "cache miss, starting retrieval");
        let retrieval = make(key.to_string());
        let owned_key = key.to_string();
        let pending = async move {
            match retrieval.await {
                Ok(items) => Ok(Arc::new(items)),
                Err(e) => {
                    warn!(key = %owned_key, error = %e, "retrieval failed");
                    Err(e)
                }
            }
        }
        .boxed()
        .shared();

        entries.insert(key.to_string(), pending.clone());
        pending
    }

    /// Forget `key`. Returns whether an entry was present.
    pub fn invalidate(&self, key: &str) -> bool {
        let removed = self.entries.lock().unwrap().remove(key).is_some();
        if removed {
            debug!(key, "cache entry invalidated");
        }
        removed
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().unwrap().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for FetchCache<T>
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
    use tokio::sync::oneshot;

    fn counting_fetch(
        calls: &Arc<AtomicUsize>,
        result: Result<Vec<u32>, FetchError>,
    ) -> impl FnOnce(String) -> BoxFuture<'static, Result<Vec<u32>, FetchError>> {
        let calls = calls.clone();
        move |_key| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { result }.boxed()
        }
    }

    #[tokio::test]
    async fn test_concurrent_requests_share_one_retrieval() {
        let cache: FetchCache<u32> = FetchCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let (release, gate) = oneshot::channel::<()>();

        let first = {
            let calls = calls.clone();
            cache.get_or_insert_with("k", move |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    let _ = gate.await;
                    Ok(vec![1, 2, 3])
                }
            })
        };
        // Second lookup happens while the first is still unresolved
        let second = cache.get_or_insert_with("k", counting_fetch(&calls, Ok(vec![9])));

        let waiter = tokio::spawn(second);
        release.send(()).unwrap();

        let a = first.await.unwrap();
        let b = waiter.await.unwrap().unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(*a, vec![1, 2, 3]);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn test_failure_is_cached() {
        let cache: FetchCache<u32> = FetchCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let failure = FetchError::RetrievalFailed("HTTP 500".to_string());

        let first = cache
            .get_or_insert_with("k", counting_fetch(&calls, Err(failure.clone())))
            .await;
        let second = cache
            .get_or_insert_with("k", counting_fetch(&calls, Ok(vec![1])))
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(first.unwrap_err(), failure);
        assert_eq!(second.unwrap_err(), failure);
    }

    #[tokio::test]
    async fn test_invalidate_allows_retry() {
        let cache: FetchCache<u32> = FetchCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let failed = cache
            .get_or_insert_with(
                "k",
                counting_fetch(&calls, Err(FetchError::RetrievalFailed("down".into()))),
            )
            .await;
        assert!(failed.is_err());

        assert!(cache.invalidate("k"));
        assert!(!cache.contains("k"));

        let retried = cache
            .get_or_insert_with("k", counting_fetch(&calls, Ok(vec![7])))
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(*retried, vec![7]);
    }

    #[tokio::test]
    async fn test_distinct_keys_retrieve_independently() {
        let cache: FetchCache<u32> = FetchCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let a = cache.get_or_insert_with("a", counting_fetch(&calls, Ok(vec![1])));
        let b = cache.get_or_insert_with("b", counting_fetch(&calls, Ok(vec![2])));

        assert_eq!(*a.await.unwrap(), vec![1]);
        assert_eq!(*b.await.unwrap(), vec![2]);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 2);
        assert!(!cache.invalidate("missing"));
    }
}
