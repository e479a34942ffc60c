use crate::core::models::UserDump;
use crate::providers::UserDirectory;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;

// The user dump is several megabytes; give it more room than a page fetch.
const FETCH_TIMEOUT: Duration = Duration::from_secs(60);

/// Fetches the full radioid.net user database dump.
pub struct RadioidDirectory {
    client: reqwest::Client,
    url: String,
}

impl RadioidDirectory {
    pub fn new(url: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .context("Failed to build directory HTTP client")?;

        Ok(Self { client, url })
    }
}

#[async_trait]
impl UserDirectory for RadioidDirectory {
    async fn fetch_users(&self) -> Result<UserDump> {
        let response = self
            .client
            .get(&self.url)
            .header("Content-Type", "application/json")
            .send()
            .await
            .context("Failed to fetch user directory")?;

        if !response.status().is_success() {
            anyhow::bail!("User directory returned {}", response.status());
        }

        response
            .json::<UserDump>()
            .await
            .context("Failed to decode user directory")
    }
}
