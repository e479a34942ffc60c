use crate::providers::UserDirectory;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Operator-id → display-name cache, refreshed from the user directory on
/// its own timer, independent of the call-cache timer.
///
/// Owned by the poller task alone: the map is written between fetch cycles
/// and read during enrichment, never concurrently, so it carries no lock.
pub struct NameResolver {
    directory: Arc<dyn UserDirectory>,
    names: HashMap<String, String>,
    reload: Duration,
    last_refresh: Instant,
}

impl NameResolver {
    pub fn new(directory: Arc<dyn UserDirectory>, reload: Duration) -> Self {
        Self {
            directory,
            names: HashMap::new(),
            reload,
            last_refresh: Instant::now(),
        }
    }

    /// Refresh the mapping if the timer has expired or we have no data yet.
    /// The clock is stamped before the fetch, so a failure waits out the
    /// full window rather than retrying every tick once the map is non-empty.
    pub async fn maybe_refresh(&mut self) {
        if !self.names.is_empty() && self.last_refresh.elapsed() < self.reload {
            return;
        }
        self.last_refresh = Instant::now();

        match self.directory.fetch_users().await {
            Ok(dump) => {
                let mut names = HashMap::with_capacity(dump.users.len());
                for user in dump.users {
                    names.insert(user.id.to_string(), user.name);
                }
                tracing::info!(entries = names.len(), "Refreshed user directory");
                self.names = names;
            }
            Err(e) => {
                tracing::debug!(error = %e, "User directory refresh failed, keeping previous mapping");
            }
        }
    }

    /// Display name for an operator id; empty for anything never seen in a
    /// successful directory refresh.
    pub fn lookup(&self, id: &str) -> &str {
        self.names.get(id).map(String::as_str).unwrap_or("")
    }
}
