use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "./dvsmon.conf";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("can't open config file {path}: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Runtime configuration, loaded once at startup from a JSON file.
///
/// `last_access` is the idle threshold in minutes; `reload` and
/// `users_reload` are in seconds. A zero `reload` polls on every tick and a
/// zero `last_access` disables idle detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub last_access: u64,
    pub page: String,
    pub reload: u64,
    pub users: String,
    pub users_reload: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            last_access: 0,
            page: String::new(),
            reload: 0,
            users: String::new(),
            users_reload: 0,
        }
    }
}

impl Config {
    /// Load the config file. An unreadable file is fatal to the caller;
    /// malformed JSON is logged and degrades to a zero-valued config, which
    /// the legacy implementation did and downstream deployments rely on.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
            path: path.display().to_string(),
            source,
        })?;

        match serde_json::from_str(&content) {
            Ok(config) => {
                tracing::info!(?path, "Loaded config");
                Ok(config)
            }
            Err(e) => {
                tracing::warn!(?path, error = %e, "Trouble parsing config file, using zero-valued defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn idle_threshold(&self) -> Duration {
        Duration::from_secs(self.last_access * 60)
    }

    pub fn reload_interval(&self) -> Duration {
        Duration::from_secs(self.reload)
    }

    pub fn users_reload_interval(&self) -> Duration {
        Duration::from_secs(self.users_reload)
    }
}
