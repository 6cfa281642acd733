//! @acp:module "External Providers"
//! @acp:summary "Manifest-described providers run as subprocesses"
//! @acp:domain cli
//! @acp:layer io
//!
//! Subprocess-backed providers described by JSON manifests.
//!
//! An external provider is an executable. The driver forwards the parsed
//! options and residual arguments on its command line, lets it write to
//! stdout directly and collects stderr as the failure message.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::{Deserialize, Serialize};

use super::usage::{OptionDef, UsageDescriptor};
use super::{Invocation, Outcome, OutputProvider};
use crate::error::{DriverError, Result};

/// Environment variable carrying the selected provider name
pub const PROVIDER_ENV: &str = "PSHDL_PROVIDER";

/// Environment variable carrying the driver version
pub const VERSION_ENV: &str = "PSHDL_VERSION";

/// Provider manifest (`provider.json` or an inline config entry)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderManifest {
    /// Dispatch key
    pub name: String,

    /// Invocation summary; defaults to `<name> [OPTIONS] [ARGS...]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Executable; relative paths with a separator resolve against the
    /// manifest's directory
    pub command: String,

    /// Fixed arguments passed before the forwarded ones
    #[serde(default)]
    pub args: Vec<String>,

    #[serde(default)]
    pub env: BTreeMap<String, String>,

    #[serde(default)]
    pub options: Vec<OptionDef>,

    #[serde(default)]
    pub groups: Vec<UsageDescriptor>,

    /// Directory the manifest was loaded from
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl ProviderManifest {
    /// Load a manifest file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| DriverError::Manifest {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let mut manifest: ProviderManifest =
            serde_json::from_str(&content).map_err(|e| DriverError::Manifest {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        manifest.base_dir = path.parent().map(Path::to_path_buf);
        manifest.validate().map_err(|message| DriverError::Manifest {
            path: path.to_path_buf(),
            message,
        })?;
        Ok(manifest)
    }

    /// Check the manifest is usable as a provider.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.name.is_empty() {
            return Err("provider name is empty".into());
        }
        if self.name.starts_with('-') || self.name.chars().any(char::is_whitespace) {
            return Err(format!("provider name '{}' is not a valid command token", self.name));
        }
        if self.command.trim().is_empty() {
            return Err(format!("provider '{}' has no command", self.name));
        }
        let usage = self.usage_descriptor();
        for option in usage.flattened_options() {
            option
                .validate()
                .map_err(|e| format!("provider '{}': {}", self.name, e))?;
        }
        Ok(())
    }

    fn usage_descriptor(&self) -> UsageDescriptor {
        UsageDescriptor {
            usage: self
                .usage
                .clone()
                .unwrap_or_else(|| format!("{} [OPTIONS] [ARGS...]", self.name)),
            description: self.description.clone(),
            options: self.options.clone(),
            children: self.groups.clone(),
        }
    }

    fn program(&self) -> PathBuf {
        let command = Path::new(&self.command);
        match &self.base_dir {
            Some(base) if command.is_relative() && command.components().count() > 1 => {
                base.join(command)
            }
            _ => command.to_path_buf(),
        }
    }
}

/// Provider that runs an external executable
#[derive(Debug, Clone)]
pub struct ExternalProvider {
    manifest: ProviderManifest,
}

impl ExternalProvider {
    pub fn new(manifest: ProviderManifest) -> Self {
        Self { manifest }
    }

    pub fn manifest(&self) -> &ProviderManifest {
        &self.manifest
    }

    /// Arguments passed to the executable for `invocation`.
    ///
    /// Fixed manifest args come first, then present options in declaration
    /// order, then the residual arguments.
    pub fn command_args(&self, invocation: &Invocation) -> Vec<String> {
        let mut args = self.manifest.args.clone();
        let usage = self.manifest.usage_descriptor();

        for option in usage.flattened_options() {
            if !invocation.has_option(&option.name) {
                continue;
            }
            if option.takes_value() {
                for value in invocation.values(&option.name) {
                    args.push(format!("--{}={}", option.name, value));
                }
            } else {
                args.push(format!("--{}", option.name));
            }
        }

        args.extend(invocation.args().iter().cloned());
        args
    }
}

impl OutputProvider for ExternalProvider {
    fn name(&self) -> &str {
        &self.manifest.name
    }

    fn usage(&self) -> UsageDescriptor {
        self.manifest.usage_descriptor()
    }

    fn invoke(&self, invocation: &Invocation) -> Outcome {
        let program = self.manifest.program();
        let args = self.command_args(invocation);
        tracing::debug!("Running {} {:?}", program.display(), args);

        let output = Command::new(&program)
            .args(&args)
            .envs(&self.manifest.env)
            .env(PROVIDER_ENV, &self.manifest.name)
            .env(VERSION_ENV, crate::VERSION)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::piped())
            .output();

        let output = match output {
            Ok(output) => output,
            Err(e) => {
                return Outcome::failure(format!("failed to run {}: {}", program.display(), e))
            }
        };

        let stderr = String::from_utf8_lossy(&output.stderr);
        if output.status.success() {
            if !stderr.is_empty() {
                eprint!("{}", stderr);
            }
            return Outcome::Success;
        }

        let message = stderr.trim();
        if message.is_empty() {
            Outcome::failure(format!("{} exited with {}", program.display(), output.status))
        } else {
            Outcome::failure(message)
        }
    }
}
