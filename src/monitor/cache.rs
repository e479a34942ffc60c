use crate::core::models::{Call, Stats};
use std::pin::pin;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, Notify};

struct CacheInner {
    calls: Vec<Call>,
    stale: bool,
    last_access: Instant,
    hits: u64,
    refresh: u64,
    fetch_errors: u64,
}

/// Shared state between the poller and the HTTP handlers.
///
/// All transitions happen under one lock, so counters are exact and readers
/// only ever observe fully committed call sequences. The poller is the sole
/// writer; `stale` is true exactly while one of its refresh cycles is in
/// flight, and readers suspend on `committed` until the cycle lands.
#[derive(Clone)]
pub struct MonitorCache {
    inner: Arc<Mutex<CacheInner>>,
    committed: Arc<Notify>,
    started: Instant,
}

impl MonitorCache {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            inner: Arc::new(Mutex::new(CacheInner {
                calls: Vec::new(),
                stale: false,
                last_access: now,
                hits: 0,
                refresh: 0,
                fetch_errors: 0,
            })),
            committed: Arc::new(Notify::new()),
            started: now,
        }
    }

    /// Stamp the access time and count the hit. Called on every `/monitor`
    /// read; stats reads deliberately do not count.
    pub async fn record_access(&self) {
        let mut inner = self.inner.lock().await;
        inner.last_access = Instant::now();
        inner.hits += 1;
    }

    /// True when nobody has read within `threshold`. A zero threshold
    /// disables idle detection entirely, so a `last_access = 0` config keeps
    /// the poller running.
    pub async fn is_idle(&self, threshold: Duration) -> bool {
        if threshold.is_zero() {
            return false;
        }
        self.inner.lock().await.last_access.elapsed() >= threshold
    }

    /// Mark a refresh cycle in flight. Readers arriving after this point
    /// block until the matching commit.
    pub async fn begin_refresh(&self) {
        self.inner.lock().await.stale = true;
    }

    /// Install a freshly scraped sequence, wholesale, and wake readers.
    pub async fn commit_refresh(&self, new_calls: Vec<Call>) {
        {
            let mut inner = self.inner.lock().await;
            inner.calls = new_calls;
            inner.stale = false;
            inner.refresh += 1;
        }
        self.committed.notify_waiters();
    }

    /// Error-path commit: the fetch produced nothing usable, so keep the
    /// previous sequence. The cycle still completes (refresh counter moves,
    /// staleness clears) so readers are never stalled by a failing remote.
    pub async fn commit_unchanged(&self) {
        {
            let mut inner = self.inner.lock().await;
            inner.stale = false;
            inner.refresh += 1;
            inner.fetch_errors += 1;
        }
        self.committed.notify_waiters();
    }

    /// Current call sequence. Suspends while a refresh is in flight and
    /// returns only once the cycle has committed; there is no timeout, a
    /// permanently wedged poller stalls readers by design.
    pub async fn read_snapshot(&self) -> Vec<Call> {
        loop {
            let mut committed = pin!(self.committed.notified());
            {
                let inner = self.inner.lock().await;
                if !inner.stale {
                    return inner.calls.clone();
                }
                // Register for the wakeup before releasing the lock so a
                // commit between unlock and await cannot be missed.
                committed.as_mut().enable();
            }
            committed.await;
        }
    }

    pub async fn stats(&self) -> Stats {
        let inner = self.inner.lock().await;
        Stats {
            stale_cache: inner.stale,
            hits: inner.hits,
            refresh: inner.refresh,
            uptime: self.started.elapsed().as_secs(),
            fetch_errors: inner.fetch_errors,
        }
    }
}

impl Default for MonitorCache {
    fn default() -> Self {
        Self::new()
    }
}
