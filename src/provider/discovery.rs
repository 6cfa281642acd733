//! @acp:module "Provider Discovery"
//! @acp:summary "Collect providers from config and manifest search paths"
//! @acp:domain cli
//! @acp:layer service
//!
//! Provider discovery.
//!
//! Providers come from two places, in this order:
//!
//! 1. manifests declared inline in the config (`providers`)
//! 2. `provider.json` files in subdirectories of the search paths
//!
//! Discovery never fails the run: a manifest that cannot be read or does not
//! validate is skipped with a warning.

use std::path::{Path, PathBuf};

use super::external::{ExternalProvider, ProviderManifest};
use super::OutputProvider;
use crate::config::Config;

/// Manifest file name looked up in each provider directory
pub const MANIFEST_FILE: &str = "provider.json";

/// Collect every available provider, in registration order.
pub fn discover_providers(config: &Config) -> Vec<Box<dyn OutputProvider>> {
    discover_in(config, &search_paths(config))
}

/// Search paths: config `provider_paths`, `./providers`, then the user
/// config directory.
pub fn search_paths(config: &Config) -> Vec<PathBuf> {
    let mut paths = config.provider_paths.clone();

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join("providers"));
    }

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("pshdl").join("providers"));
    }

    paths
}

/// Discovery against explicit search paths.
pub fn discover_in(config: &Config, search_paths: &[PathBuf]) -> Vec<Box<dyn OutputProvider>> {
    let mut providers: Vec<Box<dyn OutputProvider>> = Vec::new();

    for manifest in &config.providers {
        match manifest.validate() {
            Ok(()) => providers.push(Box::new(ExternalProvider::new(manifest.clone()))),
            Err(e) => tracing::warn!("Skipping provider from config: {}", e),
        }
    }

    for dir in search_paths {
        for manifest in scan_directory(dir) {
            providers.push(Box::new(ExternalProvider::new(manifest)));
        }
    }

    tracing::debug!(
        "Discovered providers: {:?}",
        providers.iter().map(|p| p.name()).collect::<Vec<_>>()
    );
    providers
}

/// Load the manifests of `dir`'s immediate subdirectories, sorted by path.
fn scan_directory(dir: &Path) -> Vec<ProviderManifest> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return Vec::new(),
    };

    let mut manifest_paths: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path().join(MANIFEST_FILE))
        .filter(|p| p.is_file())
        .collect();
    manifest_paths.sort();

    manifest_paths
        .iter()
        .filter_map(|path| match ProviderManifest::load(path) {
            Ok(manifest) => Some(manifest),
            Err(e) => {
                tracing::warn!("{}", e);
                None
            }
        })
        .collect()
}
