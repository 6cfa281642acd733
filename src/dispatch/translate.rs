//! @acp:module "Result Translator"
//! @acp:summary "Map dispatch results to exit codes and console text"
//! @acp:domain cli
//! @acp:layer output
//!
//! Result translation: dispatch disposition -> exit status and console text.

use std::io::{self, Write};

use super::Disposition;
use crate::provider::Outcome;

/// Process exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Success, help or version
    Success,
    UnknownProvider,
    /// The provider reported a failure
    ProviderFailure,
    /// Malformed command line
    Usage,
}

impl ExitStatus {
    pub fn code(self) -> u8 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::UnknownProvider => 1,
            ExitStatus::ProviderFailure => 2,
            ExitStatus::Usage => 64,
        }
    }

    pub fn is_success(self) -> bool {
        self == ExitStatus::Success
    }
}

impl From<ExitStatus> for std::process::ExitCode {
    fn from(status: ExitStatus) -> Self {
        std::process::ExitCode::from(status.code())
    }
}

/// Everything the driver prints for one run, plus its exit status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl Report {
    fn new(status: ExitStatus) -> Self {
        Self {
            status,
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    fn with_stdout(mut self, text: impl Into<String>) -> Self {
        self.stdout = with_newline(text.into());
        self
    }

    fn with_stderr(mut self, text: impl Into<String>) -> Self {
        self.stderr = with_newline(text.into());
        self
    }

    /// Write stdout text, flush stdout, then write the diagnostic, so that
    /// provider output and the diagnostic keep their order on a shared
    /// terminal.
    pub fn write_to<O: Write, E: Write>(&self, out: &mut O, err: &mut E) -> io::Result<()> {
        out.write_all(self.stdout.as_bytes())?;
        out.flush()?;
        err.write_all(self.stderr.as_bytes())?;
        err.flush()
    }
}

/// `No such provider: vhdl please try one of: [verilog, sim]`
pub fn unknown_provider_message(name: &str, known: &[String]) -> String {
    format!(
        "No such provider: {} please try one of: [{}]",
        name,
        known.join(", ")
    )
}

pub fn translate(disposition: &Disposition) -> Report {
    match disposition {
        Disposition::Help(text) | Disposition::Version(text) => {
            Report::new(ExitStatus::Success).with_stdout(text.as_str())
        }
        Disposition::UnknownProvider { name, known } => Report::new(ExitStatus::UnknownProvider)
            .with_stdout(unknown_provider_message(name, known)),
        Disposition::Completed(Outcome::Success) => Report::new(ExitStatus::Success),
        Disposition::Completed(Outcome::Failure(message)) => {
            Report::new(ExitStatus::ProviderFailure).with_stderr(message.as_str())
        }
        Disposition::UsageError(message) => Report::new(ExitStatus::Usage).with_stderr(message.as_str()),
    }
}

fn with_newline(mut text: String) -> String {
    if !text.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }
    text
}
