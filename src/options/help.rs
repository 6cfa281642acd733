//! @acp:module "Help Rendering"
//! @acp:summary "Render composed help text grouped per provider"
//! @acp:domain cli
//! @acp:layer output
//!
//! Composed help output.
//!
//! Layout:
//!
//! ```text
//! usage: Compiler [OPTIONS] <verilog|sim> [PROVIDER_OPTIONS]
//!     --version   Print the version of this compiler
//!     ...
//!
//! Provider verilog:
//!   usage: verilog [OPTIONS] <files...>
//!   -o, --out <DIR>  Output directory
//!   Defines:
//!         --define <K=V>...  Define a constant
//! ```

use std::fmt::Write;

use super::ComposedSpec;
use crate::provider::{OptionDef, UsageDescriptor};

const INDENT: &str = "  ";

/// Render the global switches followed by one block per provider, in
/// registry order.
pub fn render(spec: &ComposedSpec) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "usage: {}", spec.usage_line());
    write_options(&mut out, spec.globals(), 0);

    for entry in spec.entries() {
        out.push('\n');
        let _ = writeln!(out, "Provider {}:", entry.name);
        let _ = writeln!(out, "{}usage: {}", INDENT, entry.usage.usage);
        write_body(&mut out, &entry.usage, 1);
    }

    out
}

fn write_body(out: &mut String, usage: &UsageDescriptor, depth: usize) {
    let indent = INDENT.repeat(depth);

    if let Some(description) = &usage.description {
        for line in description.lines() {
            let _ = writeln!(out, "{}{}", indent, line);
        }
    }

    write_options(out, &usage.options, depth);

    for child in &usage.children {
        let _ = writeln!(out, "{}{}:", indent, child.usage);
        write_body(out, child, depth + 1);
    }
}

fn write_options(out: &mut String, options: &[OptionDef], depth: usize) {
    let indent = INDENT.repeat(depth);
    let signatures: Vec<String> = options.iter().map(OptionDef::signature).collect();
    let width = signatures.iter().map(String::len).max().unwrap_or(0);

    for (option, signature) in options.iter().zip(&signatures) {
        if option.help.is_empty() {
            let _ = writeln!(out, "{}{}", indent, signature);
        } else {
            let _ = writeln!(
                out,
                "{}{:<width$}  {}",
                indent,
                signature,
                option.help,
                width = width
            );
        }
    }
}
