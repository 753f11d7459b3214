//! Command dispatch logic for tenex-tools

use std::time::Instant;

use crate::cli::Cli;
use tenex_core::error::Result;
use tracing::debug;

mod command;
mod commands;
mod macros;

pub use command::CommandContext;
use command::{Command, NoCommand};
pub(crate) use macros::trace_command;

pub fn run(cli: &Cli, start: Instant) -> Result<()> {
    let mut ctx = CommandContext::new(cli, start)?;

    debug!(elapsed = ?start.elapsed(), "load_config");

    match &cli.command {
        None => NoCommand.execute(&mut ctx),
        Some(cmd) => cmd.execute(&mut ctx),
    }
}
