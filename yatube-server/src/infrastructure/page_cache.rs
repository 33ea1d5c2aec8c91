//! Fixed-window cache of fully rendered responses.
//!
//! An entry is served unchanged until its window elapses or it is invalidated,
//! even if the rows it was rendered from change in the meantime. The number of
//! entries is capped; the least recently used one makes room for a new page.

use std::num::NonZeroUsize;
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use lru::LruCache;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug, Clone)]
pub(crate) struct CachedPage {
    pub(crate) status: StatusCode,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Bytes,
}

impl IntoResponse for CachedPage {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

struct CacheEntry {
    stored_at: Instant,
    page: CachedPage,
}

pub(crate) struct PageCache {
    ttl: Duration,
    capacity: NonZeroUsize,
    entries: Mutex<LruCache<String, CacheEntry>>,
}

impl PageCache {
    pub(crate) fn new(ttl: Duration, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            ttl,
            capacity,
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub(crate) fn ttl(&self) -> Duration {
        self.ttl
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity.get()
    }

    pub(crate) async fn get(&self, key: &str) -> Option<CachedPage> {
        let mut entries = self.entries.lock().await;
        let fresh = entries
            .get(key)
            .map(|entry| entry.stored_at.elapsed() < self.ttl)?;
        if fresh {
            return entries.peek(key).map(|entry| entry.page.clone());
        }

        entries.pop(key);
        None
    }

    /// Stores `page`, dropping every expired entry first.
    pub(crate) async fn insert(&self, key: impl Into<String>, page: CachedPage) {
        let mut entries = self.entries.lock().await;
        let expired: Vec<String> = entries
            .iter()
            .filter(|(_, entry)| entry.stored_at.elapsed() >= self.ttl)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            entries.pop(key);
        }
        if !expired.is_empty() {
            debug!(purged = expired.len(), "expired pages dropped");
        }

        let entry = CacheEntry {
            stored_at: Instant::now(),
            page,
        };
        entries.put(key.into(), entry);
    }

    pub(crate) async fn invalidate(&self, key: &str) -> bool {
        self.entries.lock().await.pop(key).is_some()
    }

    #[cfg(test)]
    pub(crate) async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}
