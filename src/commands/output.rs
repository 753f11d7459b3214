//! Printing command results in the selected format

use serde::Serialize;

use crate::cli::OutputFormat;
use crate::commands::dispatch::CommandContext;
use tenex_core::error::Result;

/// Print `text` for humans, or `value` as pretty JSON.
pub fn emit<T: Serialize>(ctx: &CommandContext, text: &str, value: &T) -> Result<()> {
    match ctx.cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Human => println!("{}", text),
    }
    Ok(())
}

/// Status line on stderr, silenced by `--quiet` and JSON output.
pub fn status(ctx: &CommandContext, message: &str) {
    if !ctx.cli.quiet && ctx.cli.format == OutputFormat::Human {
        eprintln!("{}", message);
    }
}
