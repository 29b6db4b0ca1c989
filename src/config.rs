//! Runtime settings for the pipeline.
//!
//! Settings come from three layers, later ones winning:
//! built-in defaults, an optional YAML file and command-line overrides
//! (applied by the binary).
//!
//! ```yaml
//! retry:
//!   max_attempts: 8      # 0 retries forever
//!   base_delay_ms: 1000
//!   max_delay_ms: 30000
//! rate_limit_ms: 1000
//! deadline_secs: 120
//! user_agent: "skrapa/0.1"
//! ```

use std::error::Error;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::fetch::RetryPolicy;

/// Backoff configuration for whole-page fetches.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Attempts including the first one. `0` means no ceiling.
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 8,
            base_delay_ms: 1000,
            max_delay_ms: 30_000,
        }
    }
}

/// Everything the pipeline needs to know at construction time.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub retry: RetrySettings,
    /// Pause between article fetches.
    pub rate_limit_ms: u64,
    /// Upper bound on a single consumer operation. `None` waits as long as
    /// the retry policy allows.
    pub deadline_secs: Option<u64>,
    pub user_agent: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            retry: RetrySettings::default(),
            rate_limit_ms: 1000,
            deadline_secs: None,
            user_agent: None,
        }
    }
}

impl Settings {
    /// Load settings from a YAML file. Missing keys keep their defaults.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let settings = Self::from_yaml_str(&raw)?;
        info!(?settings, "Loaded settings");
        Ok(settings)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, serde_yaml::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        let max_attempts = match self.retry.max_attempts {
            0 => None,
            n => Some(n),
        };
        RetryPolicy::new(
            max_attempts,
            Duration::from_millis(self.retry.base_delay_ms),
            Duration::from_millis(self.retry.max_delay_ms),
        )
    }

    pub fn rate_limit(&self) -> Duration {
        Duration::from_millis(self.rate_limit_ms)
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_secs.map(Duration::from_secs)
    }
}
