#![forbid(unsafe_code)]

//! @acp:module "PSHDL Driver Library"
//! @acp:summary "Provider-based command-line driver for the PSHDL compiler"
//! @acp:domain cli
//! @acp:layer api
//!
//! # pshdl - PSHDL compiler driver
//!
//! Command-line driver that delegates all translation work to pluggable
//! output providers.
//!
//! ## Features
//!
//! - **Provider discovery**: providers declared in the config or found as
//!   `provider.json` manifests
//! - **Composed command line**: global switches plus every provider's own
//!   options, in one parse and one help tree
//! - **Plain exit semantics**: see [`ExitStatus`]
//!
//! ## Example
//!
//! ```rust,no_run
//! use pshdl::{discover_providers, translate, Config, Dispatcher, ProviderRegistry};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::discover_or_default();
//!     let registry = ProviderRegistry::from_providers(discover_providers(&config));
//!
//!     let disposition = Dispatcher::new(&registry).dispatch(["verilog", "top.pshdl"]);
//!     let report = translate(&disposition);
//!     report.write_to(&mut std::io::stdout(), &mut std::io::stderr())?;
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod dispatch;
pub mod error;
pub mod options;
pub mod provider;
pub mod update;

// Re-exports
pub use config::{Config, UpdateConfig};
pub use dispatch::{translate, Dispatcher, Disposition, ExitStatus, Report};
pub use error::{DriverError, Result};
pub use options::{ComposedSpec, GlobalFlags, ParsedArgs};
pub use provider::{
    discover_providers, ExternalProvider, Invocation, OptionDef, Outcome, OutputProvider,
    ProviderManifest, ProviderRegistry, UsageDescriptor,
};
pub use update::{UpdateCheck, UpdateNotifier};

/// Driver name, as printed by `--version`
pub const DRIVER_NAME: &str = "pshdl";

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// `pshdl version: <version>`
pub fn version_line() -> String {
    format!("{} version: {}", DRIVER_NAME, VERSION)
}
