//! @acp:module "Option Composer"
//! @acp:summary "Compose global and provider options into one clap command tree"
//! @acp:domain cli
//! @acp:layer logic
//!
//! Option composition
//!
//! Builds the composed option specification: the driver's global switches
//! plus one child per registered provider. The same tree drives parsing
//! (as a runtime-built `clap::Command`) and help output.

pub mod help;

use std::collections::{BTreeMap, HashSet};

use clap::parser::ValueSource;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};

use crate::error::Result;
use crate::provider::{Invocation, OptionDef, ProviderRegistry, UsageDescriptor};

/// Name shown at the head of the usage line
pub const ROOT_NAME: &str = "Compiler";

pub const HELP: &str = "help";
pub const VERSION: &str = "version";
pub const NOCHECK: &str = "nocheck";

/// clap id of the residual positional arguments of a provider; no provider
/// option may use it
pub const RESIDUAL_ARGS: &str = "__args";

/// Global switches, valid before or after the provider token
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GlobalFlags {
    pub help: bool,
    pub version: bool,
    pub nocheck: bool,
}

/// The driver's own options, in display order.
pub fn global_options() -> Vec<OptionDef> {
    vec![
        OptionDef::switch(VERSION, "Print the version of this compiler"),
        OptionDef::switch(HELP, "Print the usage options of this compiler"),
        OptionDef::switch(NOCHECK, "Don't check for an updated version of the command line"),
    ]
}

/// One provider's slot in the composed specification.
#[derive(Debug, Clone)]
pub struct ProviderEntry {
    pub name: String,
    /// The provider's descriptor minus the options the command line cannot
    /// accept (invalid names, duplicates, names taken by global switches)
    pub usage: UsageDescriptor,
}

/// Global switches plus every provider's usage descriptor.
#[derive(Debug, Clone)]
pub struct ComposedSpec {
    globals: Vec<OptionDef>,
    entries: Vec<ProviderEntry>,
}

impl ComposedSpec {
    /// Compose from the registry, in registry order.
    pub fn compose(registry: &ProviderRegistry) -> Self {
        let globals = global_options();
        let entries = registry
            .all()
            .map(|provider| ProviderEntry {
                name: provider.name().to_string(),
                usage: accepted_usage(provider.name(), &provider.usage(), &globals),
            })
            .collect();
        Self { globals, entries }
    }

    /// `Compiler [OPTIONS] <a|b|c> [PROVIDER_OPTIONS]`
    pub fn usage_line(&self) -> String {
        let names: Vec<&str> = self.entries.iter().map(|e| e.name.as_str()).collect();
        format!("{} [OPTIONS] <{}> [PROVIDER_OPTIONS]", ROOT_NAME, names.join("|"))
    }

    pub fn globals(&self) -> &[OptionDef] {
        &self.globals
    }

    pub fn entries(&self) -> &[ProviderEntry] {
        &self.entries
    }

    /// The whole tree as one descriptor: global switches at the root, one
    /// child per provider.
    pub fn root(&self) -> UsageDescriptor {
        UsageDescriptor {
            usage: self.usage_line(),
            description: None,
            options: self.globals.clone(),
            children: self.entries.iter().map(|e| e.usage.clone()).collect(),
        }
    }

    /// Full composed help text.
    pub fn help(&self) -> String {
        help::render(self)
    }

    /// The clap command tree used for parsing.
    pub fn command(&self) -> Command {
        let mut root = Command::new(ROOT_NAME)
            .no_binary_name(true)
            .override_usage(self.usage_line())
            .disable_help_flag(true)
            .disable_version_flag(true)
            .disable_help_subcommand(true)
            .allow_external_subcommands(true)
            .external_subcommand_value_parser(value_parser!(String));

        for option in &self.globals {
            root = root.arg(option_arg(option).global(true));
        }

        for entry in &self.entries {
            root = root.subcommand(provider_command(entry));
        }

        root
    }

    /// Parse `args` (without the binary name) against the composed tree.
    pub fn parse<I, T>(&self, args: I) -> Result<ParsedArgs>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let matches = self.command().try_get_matches_from(args)?;

        let mut parsed = ParsedArgs {
            globals: global_flags(&matches),
            ..ParsedArgs::default()
        };

        let Some((name, sub)) = matches.subcommand() else {
            return Ok(parsed);
        };
        parsed.provider = Some(name.to_string());

        match self.entries.iter().find(|e| e.name == name) {
            Some(entry) => {
                let sub_globals = global_flags(sub);
                parsed.globals.help |= sub_globals.help;
                parsed.globals.version |= sub_globals.version;
                parsed.globals.nocheck |= sub_globals.nocheck;

                for option in entry.usage.flattened_options() {
                    if let Some(values) = option_values(sub, option) {
                        parsed.options.insert(option.name.clone(), values);
                    }
                }
                parsed.args = strings(sub, RESIDUAL_ARGS);
            }
            // Unknown token: everything after it is kept raw for the message
            None => parsed.args = strings(sub, ""),
        }

        Ok(parsed)
    }
}

/// Result of parsing the command line, before provider resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedArgs {
    pub globals: GlobalFlags,
    /// First positional token, the provider selector
    pub provider: Option<String>,
    /// Present provider options and their values
    pub options: BTreeMap<String, Vec<String>>,
    /// Positional arguments after the provider token
    pub args: Vec<String>,
}

impl ParsedArgs {
    /// All positional tokens, provider selector first.
    pub fn positionals(&self) -> Vec<&str> {
        self.provider
            .iter()
            .chain(self.args.iter())
            .map(String::as_str)
            .collect()
    }

    /// Hand the parsed context to the selected provider. The selector token
    /// is not part of the residual arguments.
    pub fn into_invocation(self, provider: &str) -> Invocation {
        let mut invocation = Invocation::new(provider, self.globals);
        for (name, values) in self.options {
            invocation = invocation.with_values(name, values);
        }
        invocation.with_args(self.args)
    }
}

fn accepted_usage(provider: &str, usage: &UsageDescriptor, globals: &[OptionDef]) -> UsageDescriptor {
    let mut names: HashSet<String> = globals.iter().map(|o| o.name.clone()).collect();
    let mut shorts: HashSet<char> = HashSet::new();
    prune(provider, usage, &mut names, &mut shorts)
}

/// Copy of `usage` keeping, depth first, only the options that can be added
/// to the provider's subcommand.
fn prune(
    provider: &str,
    usage: &UsageDescriptor,
    names: &mut HashSet<String>,
    shorts: &mut HashSet<char>,
) -> UsageDescriptor {
    let mut options = Vec::new();

    for option in &usage.options {
        if let Err(e) = option.validate() {
            tracing::warn!("Provider '{}': {}, ignoring", provider, e);
            continue;
        }
        if !names.insert(option.name.clone()) {
            tracing::warn!(
                "Provider '{}': option --{} is already defined, ignoring",
                provider,
                option.name
            );
            continue;
        }
        let mut option = option.clone();
        if let Some(c) = option.short {
            if !shorts.insert(c) {
                tracing::warn!("Provider '{}': short option -{} is already defined", provider, c);
                option.short = None;
            }
        }
        options.push(option);
    }

    let children = usage
        .children
        .iter()
        .map(|child| prune(provider, child, names, shorts))
        .collect();

    UsageDescriptor {
        usage: usage.usage.clone(),
        description: usage.description.clone(),
        options,
        children,
    }
}

fn provider_command(entry: &ProviderEntry) -> Command {
    let mut command = Command::new(entry.name.clone())
        .about(entry.usage.usage.clone())
        .disable_help_flag(true)
        .disable_version_flag(true);

    for option in entry.usage.flattened_options() {
        command = command.arg(option_arg(option));
    }

    command.arg(
        Arg::new(RESIDUAL_ARGS)
            .value_name("ARGS")
            .num_args(0..)
            .action(ArgAction::Append)
            .value_parser(value_parser!(String)),
    )
}

fn option_arg(option: &OptionDef) -> Arg {
    let mut arg = Arg::new(option.name.clone())
        .long(option.name.clone())
        .help(option.help.clone());

    if let Some(c) = option.short {
        arg = arg.short(c);
    }

    match &option.value_name {
        Some(value_name) => arg
            .value_name(value_name.clone())
            .num_args(1)
            .value_parser(value_parser!(String))
            .action(if option.multiple {
                ArgAction::Append
            } else {
                ArgAction::Set
            }),
        None => arg.action(if option.multiple {
            ArgAction::Count
        } else {
            ArgAction::SetTrue
        }),
    }
}

fn global_flags(matches: &ArgMatches) -> GlobalFlags {
    let flag = |id: &str| {
        matches
            .try_get_one::<bool>(id)
            .ok()
            .flatten()
            .copied()
            .unwrap_or(false)
    };
    GlobalFlags {
        help: flag(HELP),
        version: flag(VERSION),
        nocheck: flag(NOCHECK),
    }
}

/// Values of a present option; `Some(vec![])` for a present switch.
fn option_values(matches: &ArgMatches, option: &OptionDef) -> Option<Vec<String>> {
    if matches.value_source(&option.name) != Some(ValueSource::CommandLine) {
        return None;
    }
    if option.takes_value() {
        Some(strings(matches, &option.name))
    } else {
        Some(Vec::new())
    }
}

fn strings(matches: &ArgMatches, id: &str) -> Vec<String> {
    matches
        .try_get_many::<String>(id)
        .ok()
        .flatten()
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}
