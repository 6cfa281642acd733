//! Dispatch integration tests
//!
//! Drive the whole path (compose, parse, route, resolve, invoke, translate)
//! against fake providers that record their invocations.

use std::cell::Cell;
use std::sync::{Arc, Mutex};


use pshdl::{
    translate, Dispatcher, Disposition, ExitStatus, Invocation, OptionDef, Outcome,
    OutputProvider, ProviderRegistry, Report, UpdateCheck, UsageDescriptor,
};

/// Provider returning a fixed outcome and recording every invocation
struct Recording {
    name: &'static str,
    usage: UsageDescriptor,
    outcome: Outcome,
    calls: Arc<Mutex<Vec<Invocation>>>,
}

impl Recording {
    fn new(name: &'static str, usage: UsageDescriptor) -> (Self, Arc<Mutex<Vec<Invocation>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let provider = Self {
            name,
            usage,
            outcome: Outcome::Success,
            calls: Arc::clone(&calls),
        };
        (provider, calls)
    }

    fn failing(mut self, message: &str) -> Self {
        self.outcome = Outcome::failure(message);
        self
    }
}

impl OutputProvider for Recording {
    fn name(&self) -> &str {
        self.name
    }

    fn usage(&self) -> UsageDescriptor {
        self.usage.clone()
    }

    fn invoke(&self, invocation: &Invocation) -> Outcome {
        self.calls.lock().unwrap().push(invocation.clone());
        self.outcome.clone()
    }
}

#[derive(Default)]
struct CountingCheck(Cell<usize>);

impl UpdateCheck for CountingCheck {
    fn start(&self) {
        self.0.set(self.0.get() + 1);
    }
}

fn verilog_usage() -> UsageDescriptor {
    UsageDescriptor::new("verilog [OPTIONS] <files...>")
        .with_option(OptionDef::value("out", "DIR", "Output directory").with_short('o'))
}

fn sim_usage() -> UsageDescriptor {
    UsageDescriptor::new("sim [OPTIONS] <files...>")
        .with_option(OptionDef::value("depth", "N", "Unroll depth"))
        .with_option(OptionDef::switch("vcd", "Dump a VCD trace"))
}

fn run(registry: &ProviderRegistry, args: &[&str]) -> Report {
    translate(&Dispatcher::new(registry).dispatch(args.iter().copied()))
}

// =============================================================================
// Help and version
// =============================================================================

mod help_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_no_args_prints_composed_help() {
        let (verilog, calls) = Recording::new("verilog", verilog_usage());
        let registry = ProviderRegistry::from_providers(vec![Box::new(verilog)]);

        let report = run(&registry, &[]);

        assert_eq!(report.status, ExitStatus::Success);
        assert!(report
            .stdout
            .starts_with("usage: Compiler [OPTIONS] <verilog> [PROVIDER_OPTIONS]\n"));
        assert!(report.stdout.contains("--help"));
        assert!(report.stdout.contains("--version"));
        assert!(report.stdout.contains("--nocheck"));
        assert!(report.stdout.contains("Provider verilog:"));
        assert!(report.stdout.contains("-o, --out <DIR>  Output directory"));
        assert!(report.stderr.is_empty());
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_no_args_equals_help_flag() {
        let (verilog, _) = Recording::new("verilog", verilog_usage());
        let (sim, _) = Recording::new("sim", sim_usage());
        let registry = ProviderRegistry::from_providers(vec![Box::new(verilog), Box::new(sim)]);

        assert_eq!(run(&registry, &[]), run(&registry, &["--help"]));
        assert_eq!(run(&registry, &[]), run(&registry, &["sim", "--help"]));
    }

    #[test]
    fn test_help_lists_each_provider_once_in_order() {
        let names = ["vhdl", "c", "java", "dart", "verilog"];
        let providers: Vec<Box<dyn OutputProvider>> = names
            .iter()
            .map(|&name| {
                let usage = UsageDescriptor::new(format!("{} [OPTIONS]", name));
                let (p, _) = Recording::new(name, usage);
                Box::new(p) as Box<dyn OutputProvider>
            })
            .collect();
        let registry = ProviderRegistry::from_providers(providers);

        let help = run(&registry, &["--help"]).stdout;

        assert!(help.contains("<vhdl|c|java|dart|verilog>"));
        let mut last = 0;
        for name in names {
            let header = format!("Provider {}:", name);
            assert_eq!(help.matches(&header).count(), 1, "{}", header);
            let pos = help.find(&header).unwrap();
            assert!(pos > last, "{} out of order", name);
            last = pos;
        }
    }

    #[test]
    fn test_provider_options_stay_in_their_block() {
        let (verilog, _) = Recording::new("verilog", verilog_usage());
        let (sim, _) = Recording::new("sim", sim_usage());
        let registry = ProviderRegistry::from_providers(vec![Box::new(verilog), Box::new(sim)]);

        let help = run(&registry, &[]).stdout;
        let sim_block = help.find("Provider sim:").unwrap();
        let verilog_block = help.find("Provider verilog:").unwrap();

        assert!(help.find("--out").unwrap() > verilog_block);
        assert!(help.find("--out").unwrap() < sim_block);
        assert!(help.find("--depth").unwrap() > sim_block);
    }

    #[test]
    fn test_version_skips_provider_lookup() {
        let (verilog, calls) = Recording::new("verilog", verilog_usage());
        let registry = ProviderRegistry::from_providers(vec![Box::new(verilog)]);

        let argument_sets: [&[&str]; 3] = [
            &["--version"],
            &["--version", "verilog"],
            &["--version", "vhdl"],
        ];
        for args in argument_sets {
            let report = run(&registry, args);
            assert_eq!(report.status, ExitStatus::Success);
            assert_eq!(report.stdout, format!("pshdl version: {}\n", pshdl::VERSION));
            assert!(report.stderr.is_empty());
        }
        assert!(calls.lock().unwrap().is_empty());
    }
}

// =============================================================================
// Provider resolution and invocation
// =============================================================================

mod invocation_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sim_with_depth() {
        let (verilog, verilog_calls) = Recording::new("verilog", verilog_usage());
        let (sim, sim_calls) = Recording::new("sim", sim_usage());
        let registry = ProviderRegistry::from_providers(vec![Box::new(verilog), Box::new(sim)]);

        let report = run(&registry, &["sim", "--depth=3"]);

        assert_eq!(report.status, ExitStatus::Success);
        assert!(report.stdout.is_empty());
        assert!(report.stderr.is_empty());

        let calls = sim_calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].provider(), "sim");
        assert_eq!(calls[0].parse_value::<u32>("depth"), Ok(Some(3)));
        assert!(!calls[0].has_option("vcd"));
        assert!(calls[0].args().is_empty());
        assert!(verilog_calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_residual_args_exclude_provider_token() {
        let (sim, calls) = Recording::new("sim", sim_usage());
        let registry = ProviderRegistry::from_providers(vec![Box::new(sim)]);

        run(&registry, &["--nocheck", "sim", "a.pshdl", "--vcd", "b.pshdl"]);

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].args(), ["a.pshdl".to_string(), "b.pshdl".to_string()]);
        assert!(calls[0].has_option("vcd"));
        assert!(calls[0].globals().nocheck);
    }

    #[test]
    fn test_double_dash_passes_hyphenated_args() {
        let (sim, calls) = Recording::new("sim", sim_usage());
        let registry = ProviderRegistry::from_providers(vec![Box::new(sim)]);

        let report = run(&registry, &["sim", "--", "--not-an-option"]);

        assert_eq!(report.status, ExitStatus::Success);
        assert_eq!(calls.lock().unwrap()[0].args(), ["--not-an-option".to_string()]);
    }

    #[test]
    fn test_unknown_provider() {
        let (verilog, calls) = Recording::new("verilog", verilog_usage());
        let registry = ProviderRegistry::from_providers(vec![Box::new(verilog)]);

        let report = run(&registry, &["vhdl"]);

        assert_eq!(report.status, ExitStatus::UnknownProvider);
        assert!(!report.status.is_success());
        assert_eq!(
            report.stdout,
            "No such provider: vhdl please try one of: [verilog]\n"
        );
        assert!(report.stderr.is_empty());
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unknown_provider_lists_all_names() {
        let (verilog, _) = Recording::new("verilog", verilog_usage());
        let (sim, _) = Recording::new("sim", sim_usage());
        let registry = ProviderRegistry::from_providers(vec![Box::new(verilog), Box::new(sim)]);

        let report = run(&registry, &["Sim", "--depth=3"]);

        assert_eq!(report.status, ExitStatus::UnknownProvider);
        assert!(report.stdout.contains("Sim"));
        assert!(report.stdout.contains("[verilog, sim]"));
    }

    #[test]
    fn test_provider_failure_is_reported_verbatim() {
        let (verilog, calls) = Recording::new("verilog", verilog_usage());
        let verilog = verilog.failing("top.pshdl:12: 'clk' is not declared");
        let registry = ProviderRegistry::from_providers(vec![Box::new(verilog)]);

        let report = run(&registry, &["verilog", "top.pshdl"]);

        assert_eq!(report.status, ExitStatus::ProviderFailure);
        assert_ne!(report.status, ExitStatus::UnknownProvider);
        assert!(report.stdout.is_empty());
        assert_eq!(report.stderr, "top.pshdl:12: 'clk' is not declared\n");
        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_malformed_input_invokes_nothing() {
        let (sim, calls) = Recording::new("sim", sim_usage());
        let registry = ProviderRegistry::from_providers(vec![Box::new(sim)]);

        let argument_sets: [&[&str]; 3] = [&["sim", "--depth"], &["sim", "--out=gen"], &["--bogus"]];
        for args in argument_sets {
            let report = run(&registry, args);
            assert_eq!(report.status, ExitStatus::Usage, "{:?}", args);
            assert!(!report.stderr.is_empty());
        }
        assert!(calls.lock().unwrap().is_empty());
    }
}

// =============================================================================
// Update check
// =============================================================================

mod update_check_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_nocheck_never_starts_update_check() {
        let (verilog, _) = Recording::new("verilog", verilog_usage());
        let registry = ProviderRegistry::from_providers(vec![Box::new(verilog)]);
        let check = CountingCheck::default();
        let dispatcher = Dispatcher::new(&registry).with_update_check(&check);

        let argument_sets: [&[&str]; 7] = [
            &["--nocheck"],
            &["--nocheck", "verilog"],
            &["verilog", "--nocheck"],
            &["--nocheck", "verilog", "-o", "gen", "top.pshdl"],
            &["--nocheck", "vhdl"],
            &["--nocheck", "--version"],
            &["--nocheck", "--help", "verilog"],
        ];
        for args in argument_sets {
            dispatcher.dispatch(args.iter().copied());
        }

        assert_eq!(check.0.get(), 0);
    }

    #[test]
    fn test_update_check_does_not_change_outcome() {
        let (verilog, _) = Recording::new("verilog", verilog_usage());
        let registry = ProviderRegistry::from_providers(vec![Box::new(verilog)]);
        let check = CountingCheck::default();

        let with_check = Dispatcher::new(&registry)
            .with_update_check(&check)
            .dispatch(["verilog", "top.pshdl"]);
        let without_check = Dispatcher::new(&registry).dispatch(["verilog", "top.pshdl"]);

        assert_eq!(check.0.get(), 1);
        assert_eq!(with_check, without_check);
        assert_eq!(with_check, Disposition::Completed(Outcome::Success));
    }
}
