mod dashboard;
mod radioid;

use crate::core::models::{Call, UserDump};
use anyhow::Result;
use async_trait::async_trait;

pub use dashboard::DashboardSource;
pub use radioid::RadioidDirectory;

/// Source of raw call rows, normally the scraped dashboard. The poller only
/// sees this seam, so tests can substitute canned rows or failures.
#[async_trait]
pub trait CallSource: Send + Sync {
    async fn fetch_calls(&self) -> Result<Vec<Call>>;
}

/// Source of the full operator directory used for name resolution.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn fetch_users(&self) -> Result<UserDump>;
}
