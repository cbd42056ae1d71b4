use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::options::TransferDefaults;

/// Global configuration loaded from `~/.config/fanout/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FanoutConfig {
    /// Seconds allowed for establishing a connection.
    pub connect_timeout_secs: u64,
    /// Seconds allowed for a whole transfer.
    pub timeout_secs: u64,
    /// Follow `Location` redirects.
    pub follow_redirects: bool,
    /// Maximum redirects followed per transfer.
    pub max_redirects: u32,
    /// Optional `User-Agent` sent with every request.
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Verify TLS peer certificates and host names.
    pub verify_tls: bool,
    /// Longest single block while waiting for network readiness, in milliseconds.
    pub wait_timeout_ms: u64,
}

impl Default for FanoutConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 30,
            timeout_secs: 300,
            follow_redirects: true,
            max_redirects: 10,
            user_agent: None,
            verify_tls: true,
            wait_timeout_ms: 1000,
        }
    }
}

impl FanoutConfig {
    /// Per-request defaults derived from this config.
    pub fn transfer_defaults(&self) -> TransferDefaults {
        TransferDefaults {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            timeout: Duration::from_secs(self.timeout_secs),
            follow_redirects: self.follow_redirects,
            max_redirects: self.max_redirects,
            user_agent: self.user_agent.clone(),
            verify_tls: self.verify_tls,
        }
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_timeout_ms.max(1))
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("fanout")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<FanoutConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = FanoutConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from(&path)
}

/// Load configuration from an explicit file.
pub fn load_from(path: &Path) -> Result<FanoutConfig> {
    let data = fs::read_to_string(path)?;
    let cfg: FanoutConfig = toml::from_str(&data)?;
    Ok(cfg)
}
