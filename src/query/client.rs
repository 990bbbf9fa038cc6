//! Session-scoped query cache.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use tokio::time::{Instant, sleep};
use tracing::{debug, warn};

use super::policy::{QueryPolicy, retry_delay};

/// Hierarchical cache key, e.g. `["users", "2"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(parts.into_iter().map(Into::into).collect())
    }

    #[must_use]
    pub fn parts(&self) -> &[String] {
        &self.0
    }

    /// Whether `prefix` matches the leading parts of this key.
    #[must_use]
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl From<&str> for QueryKey {
    fn from(part: &str) -> Self {
        Self(vec![part.to_string()])
    }
}

impl<const N: usize> From<[&str; N]> for QueryKey {
    fn from(parts: [&str; N]) -> Self {
        Self::new(parts)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

struct CacheEntry {
    data: Arc<dyn Any + Send + Sync>,
    updated_at: Instant,
    last_accessed: Instant,
    invalidated: bool,
}

impl fmt::Debug for CacheEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheEntry")
            .field("updated_at", &self.updated_at)
            .field("last_accessed", &self.last_accessed)
            .field("invalidated", &self.invalidated)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
struct QueryClientInner {
    policy: QueryPolicy,
    cache: RwLock<HashMap<QueryKey, CacheEntry>>,
}

/// Data-fetching client for one session.
///
/// Clones are handles to the same cache. Separate sessions must build
/// separate clients (see [`super::QueryProvider`]).
#[derive(Debug)]
pub struct QueryClient {
    inner: Arc<QueryClientInner>,
}

impl Clone for QueryClient {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl QueryClient {
    #[must_use]
    pub fn new(policy: QueryPolicy) -> Self {
        Self {
            inner: Arc::new(QueryClientInner {
                policy,
                cache: RwLock::new(HashMap::new()),
            }),
        }
    }

    #[must_use]
    pub fn policy(&self) -> &QueryPolicy {
        &self.inner.policy
    }

    /// Whether both handles point at the same client.
    #[must_use]
    pub fn same_client(&self, other: &QueryClient) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Return cached data while fresh, otherwise run `fetcher`.
    ///
    /// Failed fetches are retried up to the policy's query retry count.
    /// Successful results replace the cached value; errors leave it untouched.
    pub async fn fetch_query<T, E, F, Fut>(
        &self,
        key: impl Into<QueryKey>,
        mut fetcher: F,
    ) -> Result<T, E>
    where
        T: Clone + Send + Sync + 'static,
        E: fmt::Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let key = key.into();

        if let Some(data) = self.fresh_data::<T>(&key) {
            debug!(name: "query.cache.hit", key = %key, "Serving fresh cached data");
            return Ok(data);
        }

        debug!(name: "query.fetch", key = %key, "Fetching query");
        let data = with_retry(self.inner.policy.queries.retry, "query", &mut fetcher).await?;
        self.set_query_data(key, data.clone());
        Ok(data)
    }

    /// Run a write, retrying up to the policy's mutation retry count.
    pub async fn mutate<T, E, F, Fut>(&self, mut op: F) -> Result<T, E>
    where
        E: fmt::Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        with_retry(self.inner.policy.mutations.retry, "mutation", &mut op).await
    }

    /// Cached data for `key`, fresh or not.
    pub fn get_query_data<T>(&self, key: impl Into<QueryKey>) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let key = key.into();
        let mut cache = self.inner.cache.write().unwrap_or_else(PoisonError::into_inner);
        let entry = cache.get_mut(&key)?;
        entry.last_accessed = Instant::now();
        entry.data.downcast_ref::<T>().cloned()
    }

    pub fn set_query_data<T>(&self, key: impl Into<QueryKey>, data: T)
    where
        T: Send + Sync + 'static,
    {
        let now = Instant::now();
        let mut cache = self.inner.cache.write().unwrap_or_else(PoisonError::into_inner);
        cache.insert(
            key.into(),
            CacheEntry {
                data: Arc::new(data),
                updated_at: now,
                last_accessed: now,
                invalidated: false,
            },
        );
    }

    /// Mark every entry under `prefix` stale. Returns how many were marked.
    pub fn invalidate_queries(&self, prefix: impl Into<QueryKey>) -> usize {
        let prefix = prefix.into();
        let mut cache = self.inner.cache.write().unwrap_or_else(PoisonError::into_inner);
        let mut marked = 0;
        for (key, entry) in cache.iter_mut() {
            if key.starts_with(&prefix) {
                entry.invalidated = true;
                marked += 1;
            }
        }
        debug!(name: "query.invalidate", prefix = %prefix, marked, "Invalidated queries");
        marked
    }

    /// Drop every entry under `prefix`. Returns how many were removed.
    pub fn remove_queries(&self, prefix: impl Into<QueryKey>) -> usize {
        let prefix = prefix.into();
        let mut cache = self.inner.cache.write().unwrap_or_else(PoisonError::into_inner);
        let before = cache.len();
        cache.retain(|key, _| !key.starts_with(&prefix));
        before - cache.len()
    }

    /// Missing, invalidated or older than the stale window.
    pub fn is_stale(&self, key: impl Into<QueryKey>) -> bool {
        let key = key.into();
        let cache = self.inner.cache.read().unwrap_or_else(PoisonError::into_inner);
        cache
            .get(&key)
            .is_none_or(|entry| self.entry_is_stale(entry, Instant::now()))
    }

    /// Evict entries not accessed within the eviction window.
    pub fn collect_garbage(&self) -> usize {
        let now = Instant::now();
        let gc_time = self.inner.policy.queries.gc_time;
        let mut cache = self.inner.cache.write().unwrap_or_else(PoisonError::into_inner);
        let before = cache.len();
        cache.retain(|_, entry| now.duration_since(entry.last_accessed) < gc_time);
        let evicted = before - cache.len();
        if evicted > 0 {
            debug!(name: "query.gc", evicted, remaining = cache.len(), "Evicted unused queries");
        }
        evicted
    }

    /// Keys to refetch after the window regains focus.
    ///
    /// Empty unless the policy enables focus refetching.
    pub fn on_window_focus(&self) -> Vec<QueryKey> {
        if !self.inner.policy.queries.refetch_on_window_focus {
            return Vec::new();
        }
        let now = Instant::now();
        let cache = self.inner.cache.read().unwrap_or_else(PoisonError::into_inner);
        let mut keys: Vec<QueryKey> = cache
            .iter()
            .filter(|(_, entry)| self.entry_is_stale(entry, now))
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.inner.cache.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn entry_is_stale(&self, entry: &CacheEntry, now: Instant) -> bool {
        entry.invalidated
            || now.duration_since(entry.updated_at) >= self.inner.policy.queries.stale_time
    }

    fn fresh_data<T>(&self, key: &QueryKey) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let now = Instant::now();
        let mut cache = self.inner.cache.write().unwrap_or_else(PoisonError::into_inner);
        let entry = cache.get_mut(key)?;
        if self.entry_is_stale(entry, now) {
            return None;
        }
        let data = entry.data.downcast_ref::<T>().cloned()?;
        entry.last_accessed = now;
        Some(data)
    }
}

async fn with_retry<T, E, F, Fut>(retries: u32, kind: &'static str, op: &mut F) -> Result<T, E>
where
    E: fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut failures = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(error) if failures < retries => {
                let delay = retry_delay(failures);
                failures += 1;
                warn!(
                    name: "query.retry",
                    kind,
                    attempt = failures,
                    max_retries = retries,
                    delay = ?delay,
                    error = %error,
                    "Attempt failed, retrying"
                );
                sleep(delay).await;
            }
            Err(error) => return Err(error),
        }
    }
}
