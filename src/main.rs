#![forbid(unsafe_code)]
//! PSHDL Command Line Interface

use std::io;
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use pshdl::{discover_providers, translate, Config, Dispatcher, ProviderRegistry, UpdateNotifier};

/// Environment variable holding the log filter
const LOG_ENV: &str = "PSHDL_LOG";

fn setup_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    setup_logging();

    let config = Config::discover_or_default();

    let registry = ProviderRegistry::from_providers(discover_providers(&config));
    let notifier = UpdateNotifier::new(config.update.clone());

    let disposition = Dispatcher::new(&registry)
        .with_update_check(&notifier)
        .dispatch(std::env::args_os().skip(1));

    let report = translate(&disposition);
    if let Err(e) = report.write_to(&mut io::stdout().lock(), &mut io::stderr().lock()) {
        tracing::debug!("Failed to write output: {}", e);
    }

    // Returning does not wait for a pending update check.
    report.status.into()
}
