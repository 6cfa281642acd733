//! @acp:module "Update Notifier"
//! @acp:summary "Best-effort background check for a newer driver release"
//! @acp:domain cli
//! @acp:layer service
//!
//! Update notifier
//!
//! Best-effort check for a newer driver release. The check runs on a
//! detached thread: the dispatcher never waits for it and the process may
//! exit while it is still running. Every error is swallowed.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use console::style;
use serde::{Deserialize, Serialize};

use crate::config::UpdateConfig;

/// State file name inside `<user config dir>/pshdl`
pub const STATE_FILE: &str = "update-check.json";

const MAX_INTERVAL_DAYS: i64 = 100 * 365;

/// Something the dispatcher can start before resolving the provider.
pub trait UpdateCheck {
    /// Start the check without blocking.
    fn start(&self);
}

/// Persisted advisory state; last writer wins
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateState {
    pub last_check: DateTime<Utc>,
}

/// Outcome of comparing the remote version against ours
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionStatus {
    Current,
    Available(String),
}

/// Update check backed by an HTTP endpoint
#[derive(Debug, Clone)]
pub struct UpdateNotifier {
    config: UpdateConfig,
    state_path: Option<PathBuf>,
    local_version: String,
}

impl UpdateNotifier {
    pub fn new(config: UpdateConfig) -> Self {
        Self {
            config,
            state_path: dirs::config_dir().map(|d| d.join("pshdl").join(STATE_FILE)),
            local_version: crate::VERSION.to_string(),
        }
    }

    pub fn with_state_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.state_path = Some(path.into());
        self
    }

    /// Whether a check should run at `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        if !self.config.enabled {
            return false;
        }
        let last = self
            .state_path
            .as_deref()
            .and_then(load_state)
            .map(|s| s.last_check);
        check_due(last, now, self.config.interval_days)
    }

    /// Blocking check; called on the background thread.
    pub fn run(&self) -> Result<VersionStatus> {
        let url = self.config.endpoint_for(&self.local_version);
        tracing::debug!("Checking for updates at {}", url);

        let body = ureq::get(&url)
            .set("User-Agent", &format!("pshdl/{}", self.local_version))
            .call()
            .context("Failed to query version endpoint")?
            .into_string()
            .context("Failed to read version response")?;

        let status = compare_versions(&self.local_version, &body)?;
        match &status {
            VersionStatus::Available(remote) => {
                eprintln!(
                    "{}",
                    style(format!(
                        "A new version of this compiler is available: {} local version: {}",
                        remote, self.local_version
                    ))
                    .yellow()
                );
            }
            VersionStatus::Current => {
                if let Some(path) = &self.state_path {
                    save_state(
                        path,
                        &UpdateState {
                            last_check: Utc::now(),
                        },
                    )?;
                }
            }
        }
        Ok(status)
    }
}

impl UpdateCheck for UpdateNotifier {
    fn start(&self) {
        if !self.is_due(Utc::now()) {
            return;
        }

        let notifier = self.clone();
        let spawned = std::thread::Builder::new()
            .name("update-check".into())
            .spawn(move || {
                if let Err(e) = notifier.run() {
                    tracing::debug!("Update check failed: {:#}", e);
                }
            });

        // The handle is dropped: nobody joins this thread.
        if let Err(e) = spawned {
            tracing::debug!("Could not start update check: {}", e);
        }
    }
}

/// Due when never checked, or when the last check is at least
/// `interval_days` old. A timestamp in the future counts as stale.
pub fn check_due(last: Option<DateTime<Utc>>, now: DateTime<Utc>, interval_days: u64) -> bool {
    let Some(last) = last else {
        return true;
    };
    if last > now {
        return true;
    }
    let days = i64::try_from(interval_days).unwrap_or(i64::MAX).min(MAX_INTERVAL_DAYS);
    now - last >= chrono::Duration::days(days)
}

pub fn compare_versions(local: &str, remote_body: &str) -> Result<VersionStatus> {
    let remote = remote_body.trim();
    if remote.is_empty() {
        return Err(anyhow!("Empty version response"));
    }
    if remote == local {
        Ok(VersionStatus::Current)
    } else {
        Ok(VersionStatus::Available(remote.to_string()))
    }
}

pub fn load_state(path: &Path) -> Option<UpdateState> {
    let content = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&content).ok()
}

pub fn save_state(path: &Path, state: &UpdateState) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create state directory")?;
    }
    let content = serde_json::to_string_pretty(state)?;
    std::fs::write(path, content).context("Failed to write update state")?;
    Ok(())
}
