//! @acp:module "Output Providers"
//! @acp:summary "Provider trait, invocation context and outcome"
//! @acp:domain cli
//! @acp:layer model
//!
//! Output providers
//!
//! An output provider is a backend that turns the compiler's intermediate
//! representation into some artifact (simulation code, netlists,
//! documentation...). The driver knows nothing about what a provider does;
//! it only needs its name, its usage descriptor and its invoke entry point.
//!
//! ## Overview
//!
//! Providers are collected once at startup by [`discover_providers`], stored
//! in a [`ProviderRegistry`] and selected on the command line by name:
//!
//! ```text
//! pshdl [OPTIONS] <provider> [PROVIDER_OPTIONS] [ARGS...]
//! ```

pub mod discovery;
pub mod external;
pub mod registry;
pub mod usage;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub use discovery::discover_providers;
pub use external::{ExternalProvider, ProviderManifest};
pub use registry::ProviderRegistry;
pub use usage::{OptionDef, UsageDescriptor};

use crate::options::GlobalFlags;

/// Output provider trait - implement for each backend
pub trait OutputProvider: Send + Sync {
    /// Dispatch key and command-line token
    fn name(&self) -> &str;

    /// Invocation summary and the provider's own options
    fn usage(&self) -> UsageDescriptor;

    /// Run the provider against the parsed command line
    fn invoke(&self, invocation: &Invocation) -> Outcome;
}

/// Result of a provider invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// Diagnostic text, printed verbatim on stderr by the driver. An empty
    /// message is still a failure; the dispatcher substitutes a generic one.
    Failure(String),
}

impl Outcome {
    pub fn failure(message: impl Into<String>) -> Self {
        Outcome::Failure(message.into())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }
}

impl<E: fmt::Display> From<std::result::Result<(), E>> for Outcome {
    fn from(result: std::result::Result<(), E>) -> Self {
        match result {
            Ok(()) => Outcome::Success,
            Err(e) => Outcome::Failure(e.to_string()),
        }
    }
}

/// Parsed command line as seen by a provider.
///
/// Holds the global flags, every option that was present (provider options
/// included) and the residual positional arguments. The provider token
/// itself is not part of [`Invocation::args`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    provider: String,
    globals: GlobalFlags,
    options: BTreeMap<String, Vec<String>>,
    args: Vec<String>,
}

impl Invocation {
    pub fn new(provider: impl Into<String>, globals: GlobalFlags) -> Self {
        Self {
            provider: provider.into(),
            globals,
            ..Self::default()
        }
    }

    /// Record a present switch.
    pub fn with_switch(mut self, name: impl Into<String>) -> Self {
        self.options.entry(name.into()).or_default();
        self
    }

    /// Record a present option with its values, in command-line order.
    pub fn with_values(mut self, name: impl Into<String>, values: Vec<String>) -> Self {
        self.options.entry(name.into()).or_default().extend(values);
        self
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Name the provider was selected by
    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn globals(&self) -> &GlobalFlags {
        &self.globals
    }

    pub fn has_option(&self, name: &str) -> bool {
        self.options.contains_key(name)
    }

    /// Last value given for `name`
    pub fn value(&self, name: &str) -> Option<&str> {
        self.options
            .get(name)
            .and_then(|values| values.last())
            .map(String::as_str)
    }

    /// All values given for `name`, empty for switches and absent options
    pub fn values(&self, name: &str) -> &[String] {
        self.options.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Parse the last value of `name`.
    pub fn parse_value<T>(&self, name: &str) -> std::result::Result<Option<T>, String>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        self.value(name)
            .map(|raw| {
                raw.parse::<T>()
                    .map_err(|e| format!("invalid value '{}' for --{}: {}", raw, name, e))
            })
            .transpose()
    }

    /// Present options in name order
    pub fn options(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.options
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Residual positional arguments
    pub fn args(&self) -> &[String] {
        &self.args
    }
}
