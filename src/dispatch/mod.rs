//! @acp:module "Dispatcher"
//! @acp:summary "Parse, route and invoke the selected provider"
//! @acp:domain cli
//! @acp:layer handler
//!
//! Dispatcher
//!
//! Parses the command line against the composed specification, routes the
//! global switches, resolves the provider named by the first positional
//! token and invokes it. The path is linear: every failure is final and no
//! other provider is tried.

pub mod translate;

use std::ffi::OsString;

pub use translate::{translate, ExitStatus, Report};

use crate::options::ComposedSpec;
use crate::provider::{Outcome, ProviderRegistry};
use crate::update::UpdateCheck;

/// What a single dispatch ended with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Composed help text
    Help(String),
    /// Driver version line
    Version(String),
    /// First positional token names no registered provider
    UnknownProvider { name: String, known: Vec<String> },
    /// The provider ran
    Completed(Outcome),
    /// Malformed command line, with the parser's message
    UsageError(String),
}

/// Routes one command line to one provider.
pub struct Dispatcher<'a> {
    registry: &'a ProviderRegistry,
    update_check: Option<&'a dyn UpdateCheck>,
}

impl<'a> Dispatcher<'a> {
    pub fn new(registry: &'a ProviderRegistry) -> Self {
        Self {
            registry,
            update_check: None,
        }
    }

    /// Check started for runs that reach a provider without `--nocheck`
    pub fn with_update_check(mut self, check: &'a dyn UpdateCheck) -> Self {
        self.update_check = Some(check);
        self
    }

    /// Dispatch `args` (without the binary name).
    pub fn dispatch<I, T>(&self, args: I) -> Disposition
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
        let spec = ComposedSpec::compose(self.registry);

        let parsed = match spec.parse(args.iter().cloned()) {
            Ok(parsed) => parsed,
            Err(e) => return Disposition::UsageError(e.to_string()),
        };

        if args.is_empty() || parsed.globals.help {
            return Disposition::Help(spec.help());
        }
        if parsed.globals.version {
            return Disposition::Version(crate::version_line());
        }

        let Some(name) = parsed.provider.clone() else {
            // Only global switches were given
            return Disposition::Help(spec.help());
        };

        let Some(provider) = self.registry.lookup(&name) else {
            tracing::debug!("No provider named '{}'", name);
            return Disposition::UnknownProvider {
                name,
                known: self.registry.names().into_iter().map(String::from).collect(),
            };
        };

        if !parsed.globals.nocheck {
            if let Some(check) = self.update_check {
                check.start();
            }
        }

        let invocation = parsed.into_invocation(&name);
        tracing::debug!(
            "Invoking provider '{}' with {} residual argument(s)",
            name,
            invocation.args().len()
        );
        Disposition::Completed(with_diagnostic(provider.invoke(&invocation), &name))
    }
}

/// A failure always carries text for stderr.
fn with_diagnostic(outcome: Outcome, provider: &str) -> Outcome {
    match outcome {
        Outcome::Failure(message) if message.trim().is_empty() => {
            Outcome::Failure(format!("Provider {} failed", provider))
        }
        other => other,
    }
}
