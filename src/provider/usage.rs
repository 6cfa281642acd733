//! @acp:module "Usage Descriptors"
//! @acp:summary "Recursive option and usage metadata for providers"
//! @acp:domain cli
//! @acp:layer model
//!
//! Usage descriptors: a provider's invocation summary and option set.
//!
//! Descriptors are recursive. The driver's own root descriptor has the same
//! shape as every provider's, which is what lets the option composer treat
//! the whole command line as one tree.

use serde::{Deserialize, Serialize};

use crate::options::RESIDUAL_ARGS;

/// A single command-line option.
///
/// An option without a `value_name` is a switch; otherwise it takes a value,
/// given either as `--name VALUE` or `--name=VALUE`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionDef {
    /// Long name, used as `--name`
    pub name: String,

    /// Optional single-character alias, used as `-c`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short: Option<char>,

    /// Help text shown in the usage block
    #[serde(default)]
    pub help: String,

    /// Placeholder for the value; `None` makes this a switch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_name: Option<String>,

    /// Whether the option may be given more than once
    #[serde(default)]
    pub multiple: bool,
}

impl OptionDef {
    /// A boolean switch.
    pub fn switch(name: impl Into<String>, help: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            short: None,
            help: help.into(),
            value_name: None,
            multiple: false,
        }
    }

    /// An option taking a single value.
    pub fn value(
        name: impl Into<String>,
        value_name: impl Into<String>,
        help: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            short: None,
            help: help.into(),
            value_name: Some(value_name.into()),
            multiple: false,
        }
    }

    pub fn with_short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    pub fn repeated(mut self) -> Self {
        self.multiple = true;
        self
    }

    pub fn takes_value(&self) -> bool {
        self.value_name.is_some()
    }

    /// Check the option can be put on the command line as `--name`/`-c`.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("option without a name".into());
        }
        if self.name.starts_with('-')
            || self.name.contains('=')
            || self.name.chars().any(char::is_whitespace)
        {
            return Err(format!("option name '{}' is not a valid long option", self.name));
        }
        if self.name == RESIDUAL_ARGS {
            return Err(format!("option name '{}' is reserved", self.name));
        }
        if let Some(c) = self.short {
            if c == '-' || c.is_whitespace() {
                return Err(format!("option --{} has an invalid short alias '{}'", self.name, c));
            }
        }
        Ok(())
    }

    /// Left-hand column of the help line, e.g. `-o, --out <DIR>`.
    pub fn signature(&self) -> String {
        let mut sig = match self.short {
            Some(c) => format!("-{}, --{}", c, self.name),
            None => format!("    --{}", self.name),
        };
        if let Some(value) = &self.value_name {
            sig.push_str(&format!(" <{}>", value));
        }
        if self.multiple {
            sig.push_str("...");
        }
        sig
    }
}

/// Invocation summary plus option set, nestable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageDescriptor {
    /// One-line invocation summary, e.g. `verilog [OPTIONS] <files...>`
    pub usage: String,

    /// Free-form text printed under the summary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub options: Vec<OptionDef>,

    /// Nested option groups
    #[serde(default, rename = "groups")]
    pub children: Vec<UsageDescriptor>,
}

impl UsageDescriptor {
    pub fn new(usage: impl Into<String>) -> Self {
        Self {
            usage: usage.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_option(mut self, option: OptionDef) -> Self {
        self.options.push(option);
        self
    }

    pub fn with_child(mut self, child: UsageDescriptor) -> Self {
        self.children.push(child);
        self
    }

    /// All options of this descriptor and its children, depth first.
    pub fn flattened_options(&self) -> Vec<&OptionDef> {
        let mut out: Vec<&OptionDef> = self.options.iter().collect();
        for child in &self.children {
            out.extend(child.flattened_options());
        }
        out
    }
}
