use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Top-level replay configuration, loaded from xrplay.toml.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReplayConfig {
    #[serde(default)]
    pub replay: ReplaySettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReplaySettings {
    /// Polls of `xrPollEvent` before a captured event is declared missing
    #[serde(default = "default_event_retry_limit")]
    pub event_retry_limit: u32,
    /// Sleep between unsuccessful polls, in nanoseconds
    #[serde(default = "default_event_retry_backoff_ns")]
    pub event_retry_backoff_ns: u64,
    /// Cap on `xrWaitSwapchainImage` retries while the runtime reports
    /// a timeout (None = retry until it succeeds)
    #[serde(default)]
    pub swapchain_wait_retry_limit: Option<u32>,
    /// Proxy image fence wait, in nanoseconds
    #[serde(default = "default_fence_timeout_ns")]
    pub fence_timeout_ns: u64,
}

impl Default for ReplaySettings {
    fn default() -> Self {
        Self {
            event_retry_limit: default_event_retry_limit(),
            event_retry_backoff_ns: default_event_retry_backoff_ns(),
            swapchain_wait_retry_limit: None,
            fence_timeout_ns: default_fence_timeout_ns(),
        }
    }
}

impl ReplayConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, CoreError> {
        toml::from_str(content).map_err(|e| CoreError::ConfigError(e.to_string()))
    }

    /// Load configuration from file if it exists, otherwise return defaults.
    pub fn load_or_default(path: &str) -> Self {
        Self::load(path).unwrap_or_default()
    }
}

/// Returns the default config file path.
/// Search order:
/// 1. System-wide config: `/etc/xrplay/xrplay.toml`
/// 2. Local fallback: `./xrplay.toml`
pub fn default_config_path() -> String {
    let system_path = "/etc/xrplay/xrplay.toml";
    if std::path::Path::new(system_path).exists() {
        return system_path.to_string();
    }
    "xrplay.toml".to_string()
}

fn default_event_retry_limit() -> u32 {
    10_000
}

fn default_event_retry_backoff_ns() -> u64 {
    1
}

fn default_fence_timeout_ns() -> u64 {
    u64::MAX
}
