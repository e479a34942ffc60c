use crate::core::config::Config;
use crate::monitor::cache::MonitorCache;
use crate::monitor::names::NameResolver;
use crate::providers::{CallSource, UserDirectory};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;

/// Fixed wakeup interval. Short enough that a reload timer or an
/// idle→active transition is honored promptly, long enough not to spin.
pub const TICK: Duration = Duration::from_millis(256);

/// The background refresh loop. Sole writer of the cache, sole owner of the
/// name resolver; at most one fetch is ever in flight because each cycle
/// awaits its handoff before the next tick.
pub struct Poller {
    cache: MonitorCache,
    resolver: NameResolver,
    source: Arc<dyn CallSource>,
    idle_threshold: Duration,
    reload: Duration,
    last_refresh: Instant,
}

impl Poller {
    pub fn new(
        cache: MonitorCache,
        source: Arc<dyn CallSource>,
        directory: Arc<dyn UserDirectory>,
        config: &Config,
    ) -> Self {
        Self {
            cache,
            resolver: NameResolver::new(directory, config.users_reload_interval()),
            source,
            idle_threshold: config.idle_threshold(),
            reload: config.reload_interval(),
            last_refresh: Instant::now(),
        }
    }

    pub async fn run(mut self) {
        tracing::info!(
            tick = ?TICK,
            reload = ?self.reload,
            idle_threshold = ?self.idle_threshold,
            "Poller started"
        );

        let mut tick = tokio::time::interval(TICK);
        loop {
            tick.tick().await;
            self.tick_once().await;
        }
    }

    /// One scheduling decision. The idle check runs first and, when idle,
    /// leaves `last_refresh` untouched, so the reload timer is effectively
    /// paused and the first tick after a read refreshes immediately.
    /// Returns whether a refresh cycle ran.
    pub async fn tick_once(&mut self) -> bool {
        if self.cache.is_idle(self.idle_threshold).await {
            return false;
        }
        if self.last_refresh.elapsed() < self.reload {
            return false;
        }
        self.last_refresh = Instant::now();
        self.refresh_cycle().await;
        true
    }

    async fn refresh_cycle(&mut self) {
        self.resolver.maybe_refresh().await;
        self.cache.begin_refresh().await;

        // Offload the scrape; the handoff is consumed exactly once per
        // cycle, and awaiting it here keeps fetches strictly sequential.
        let (tx, rx) = oneshot::channel();
        let source = Arc::clone(&self.source);
        tokio::spawn(async move {
            let _ = tx.send(source.fetch_calls().await);
        });

        match rx.await {
            Ok(Ok(mut calls)) => {
                for call in &mut calls {
                    call.name = self.resolver.lookup(&call.id).to_string();
                }
                tracing::debug!(calls = calls.len(), "Installed fresh call list");
                self.cache.commit_refresh(calls).await;
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Dashboard fetch failed, keeping previous calls");
                self.cache.commit_unchanged().await;
            }
            Err(_) => {
                tracing::warn!("Fetch task dropped its handoff, keeping previous calls");
                self.cache.commit_unchanged().await;
            }
        }
    }
}
