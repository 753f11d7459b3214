//! MCP server exposing the tool set over stdio
//!
//! Responses go to stdout one JSON object per line; all logging stays on stderr.

pub mod protocol;
pub mod server;
pub mod tools;

use std::io;

use crate::commands::dispatch::CommandContext;
use server::McpServer;
use tenex_core::error::Result;
use tools::Tools;

pub fn serve(ctx: &mut CommandContext) -> Result<()> {
    let db = ctx.open_db()?;
    let users = ctx.known_users(&db)?;
    let relay = ctx.relay_pool();
    tracing::info!(relays = ctx.config.relays.len(), "starting MCP server");

    let mut server = McpServer::new(Tools::new(ctx.config.clone(), db, relay, users));
    let stdin = io::stdin();
    let stdout = io::stdout();
    server.run(stdin.lock(), stdout.lock())
}
