//! TTL + LRU memoization per `(probe, video_id, include_raw)` with
//! single-flight lookup-then-compute (component C6, §4.6).

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex as AsyncMutex;
use tokio::sync::OnceCell;

use crate::id::VideoId;
use crate::model::{ProbeResult, now_secs};

type CacheKey = (String, String, bool);

const DEFAULT_CAPACITY: usize = 1024;
const DEFAULT_TTL_SECS: f64 = 600.0;

/// A slot that is either empty (nobody has started computing it yet) or
/// resolving/resolved. [`tokio::sync::OnceCell::get_or_init`] gives us
/// single-flight for free: concurrent callers racing on the same key all
/// join the same initializing future.
type Slot = Arc<OnceCell<(ProbeResult, f64)>>;

pub struct ResultCache {
    entries: DashMap<CacheKey, Slot>,
    /// Insertion/access order, front = least recently used. Guards simple
    /// FIFO-with-touch eviction once `capacity` is exceeded.
    order: AsyncMutex<VecDeque<CacheKey>>,
    capacity: usize,
    ttl_secs: f64,
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_TTL_SECS)
    }
}

impl ResultCache {
    pub fn new(capacity: usize, ttl_secs: f64) -> Self {
        Self {
            entries: DashMap::new(),
            order: AsyncMutex::new(VecDeque::new()),
            capacity,
            ttl_secs,
        }
    }

    /// Returns the cached result for `(classname, id, include_raw)` if it is
    /// fresh, otherwise runs `compute` exactly once across all concurrent
    /// callers and caches the outcome (errors are cached too, per §4.6).
    pub async fn get_or_compute<F, Fut>(
        &self,
        classname: &str,
        id: &VideoId,
        include_raw: bool,
        compute: F,
    ) -> ProbeResult
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ProbeResult>,
    {
        let key: CacheKey = (classname.to_string(), id.as_str().to_string(), include_raw);

        loop {
            let slot = self.entries.entry(key.clone()).or_default().clone();

            if let Some((value, inserted_at)) = slot.get() {
                if now_secs() - inserted_at < self.ttl_secs {
                    self.touch(&key).await;
                    return value.clone();
                }
                // Expired: drop it and let a fresh slot be computed below.
                self.entries.remove(&key);
                continue;
            }

            let (value, _) = slot
                .get_or_init(|| async move { (compute().await, now_secs()) })
                .await;
            self.record_insertion(key).await;
            return value.clone();
        }
    }

    async fn touch(&self, key: &CacheKey) {
        let mut order = self.order.lock().await;
        if let Some(pos) = order.iter().position(|k| k == key) {
            let k = order.remove(pos).unwrap();
            order.push_back(k);
        }
    }

    async fn record_insertion(&self, key: CacheKey) {
        let mut order = self.order.lock().await;
        if !order.contains(&key) {
            order.push_back(key);
        }
        while order.len() > self.capacity {
            if let Some(evicted) = order.pop_front() {
                self.entries.remove(&evicted);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn sample_result() -> ProbeResult {
        ProbeResult {
            archived: true,
            lastupdated: 0.0,
            name: "Test".into(),
            note: String::new(),
            rawraw: None,
            metaonly: false,
            comments: false,
            available: vec![],
            error: None,
            maybe_paywalled: false,
            classname: "Test".into(),
        }
    }

    #[tokio::test]
    async fn caches_within_ttl() {
        let cache = ResultCache::new(1024, 600.0);
        let id = VideoId::parse("dQw4w9WgXcQ").unwrap();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            cache
                .get_or_compute("youtube", &id, false, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    sample_result()
                })
                .await;
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn recomputes_after_ttl_expiry() {
        let cache = ResultCache::new(1024, 0.0);
        let id = VideoId::parse("dQw4w9WgXcQ").unwrap();
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            cache
                .get_or_compute("youtube", &id, false, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    sample_result()
                })
                .await;
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn single_flight_shares_one_in_flight_future() {
        let cache = Arc::new(ResultCache::new(1024, 600.0));
        let id = VideoId::parse("dQw4w9WgXcQ").unwrap();
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            let id = id.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_compute("youtube", &id, false, || async {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                        sample_result()
                    })
                    .await
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn distinct_keys_do_not_share_a_slot() {
        let cache = ResultCache::new(1024, 600.0);
        let a = VideoId::parse("dQw4w9WgXcQ").unwrap();
        let b = VideoId::parse("aqz-KE-bpKQ").unwrap();
        cache
            .get_or_compute("youtube", &a, false, || async { sample_result() })
            .await;
        cache
            .get_or_compute("youtube", &b, false, || async { sample_result() })
            .await;
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn evicts_least_recently_used_beyond_capacity() {
        let cache = ResultCache::new(2, 600.0);
        let ids = ["dQw4w9WgXcQ", "aqz-KE-bpKQ", "jNQXAC9IVRw"]
            .map(|s| VideoId::parse(s).unwrap());
        for id in &ids {
            cache
                .get_or_compute("youtube", id, false, || async { sample_result() })
                .await;
        }
        assert_eq!(cache.len(), 2);
    }
}
