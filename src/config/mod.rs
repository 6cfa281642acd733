//! @acp:module "Configuration"
//! @acp:summary "Driver configuration lookup, loading and defaults"
//! @acp:domain cli
//! @acp:layer config
//!
//! Driver configuration loading and defaults.
//!
//! The configuration file is optional. It is looked up in this order:
//!
//! 1. `$PSHDL_CONFIG`
//! 2. `./.pshdl.config.json`
//! 3. `<user config dir>/pshdl/config.json`

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DriverError, Result};
use crate::provider::ProviderManifest;

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "PSHDL_CONFIG";

/// Project-local config file name
pub const CONFIG_FILE: &str = ".pshdl.config.json";

const DEFAULT_ENDPOINT: &str = "http://api.pshdl.org/api/v0.1/compiler/version?localVersion={version}";

/// Main driver configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Providers declared inline
    #[serde(default)]
    pub providers: Vec<ProviderManifest>,

    /// Extra directories searched for `provider.json` manifests
    #[serde(default)]
    pub provider_paths: Vec<PathBuf>,

    /// Update check settings
    #[serde(default)]
    pub update: UpdateConfig,
}

impl Config {
    /// Load config from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| DriverError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| DriverError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Save config to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load from the first location that applies, or fall back to defaults.
    /// An unreadable or malformed file only produces a warning, so help and
    /// version keep working whatever the config file contains.
    pub fn discover_or_default() -> Self {
        match Self::discovered_path() {
            Ok(Some(path)) => Self::load_or_default(path),
            Ok(None) => Self::default(),
            Err(e) => {
                tracing::warn!("Cannot locate config: {}; using defaults", e);
                Self::default()
            }
        }
    }

    /// Load `path`, falling back to defaults with a warning.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        tracing::debug!("Loading config from {}", path.display());
        Self::load(path).unwrap_or_else(|e| {
            tracing::warn!("{}; using defaults", e);
            Self::default()
        })
    }

    fn discovered_path() -> Result<Option<PathBuf>> {
        let cwd = std::env::current_dir()?;
        Ok(locate(
            std::env::var_os(CONFIG_ENV).map(PathBuf::from),
            &cwd,
            dirs::config_dir(),
        ))
    }
}

/// Resolve the config file path.
///
/// An explicit path is returned even if it does not exist, so that a typo in
/// `$PSHDL_CONFIG` is reported instead of silently ignored.
pub fn locate(explicit: Option<PathBuf>, cwd: &Path, user_config: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path);
    }

    let local = cwd.join(CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }

    user_config
        .map(|dir| dir.join("pshdl").join("config.json"))
        .filter(|p| p.is_file())
}

/// Update check configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// URL queried for the latest version; `{version}` is replaced by the
    /// local version
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Minimum number of days between two checks
    #[serde(default = "default_interval_days")]
    pub interval_days: u64,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: default_endpoint(),
            interval_days: default_interval_days(),
        }
    }
}

impl UpdateConfig {
    pub fn endpoint_for(&self, version: &str) -> String {
        self.endpoint.replace("{version}", version)
    }
}

fn default_true() -> bool {
    true
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_interval_days() -> u64 {
    7
}
