//! Command trait and context for dispatching commands

use std::time::Instant;

use crate::cli::Cli;
use tenex_core::config::Config;
use tenex_core::db::Database;
use tenex_core::error::Result;
use tenex_core::keys::Keys;
use tenex_core::relay::RelayPool;
use tenex_core::users::KnownUsers;

/// Shared context for command execution
pub struct CommandContext<'a> {
    pub cli: &'a Cli,
    pub config: Config,
    pub start: Instant,
}

impl<'a> CommandContext<'a> {
    pub fn new(cli: &'a Cli, start: Instant) -> Result<Self> {
        let config = Config::load_from(cli.config_dir.as_deref())?;
        Ok(Self { cli, config, start })
    }

    pub fn open_db(&self) -> Result<Database> {
        Database::open(&self.config.resolved_db_path()?)
    }

    pub fn relay_pool(&self) -> RelayPool {
        RelayPool::new(self.config.relays.clone(), self.config.relay_timeout())
    }

    pub fn known_users(&self, db: &Database) -> Result<KnownUsers> {
        KnownUsers::load(db)
    }

    pub fn signing_keys(&self, username: Option<&str>) -> Result<Keys> {
        self.config.signing_keys(username)
    }
}

/// Trait for commands that can be executed
pub trait Command {
    fn execute(&self, ctx: &mut CommandContext) -> Result<()>;
}

/// No-op command (when no subcommand is provided)
pub struct NoCommand;

impl Command for NoCommand {
    fn execute(&self, _ctx: &mut CommandContext) -> Result<()> {
        println!("tenex-tools {}", env!("CARGO_PKG_VERSION"));
        println!();
        println!("Publish and find Nostr code snippets, agents and instructions.");
        println!();
        println!("Run `tenex-tools --help` for usage information.");
        Ok(())
    }
}
