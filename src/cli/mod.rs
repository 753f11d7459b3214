//! CLI argument parsing for tenex-tools
//!
//! Global flags: --format, --quiet, --verbose, --log-level, --log-json,
//! --config-dir

pub mod parse;
pub mod snippet;
pub mod social;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use snippet::{FindSnippetsArgs, SnippetCommands};
pub use social::{AgentCommands, InstructionCommands, UserCommands, WotCommands};
pub use tenex_core::format::OutputFormat;

use parse::parse_format;

/// tenex-tools - Nostr snippets, agents and instructions from the command line
#[derive(Parser, Debug)]
#[command(name = "tenex-tools")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (human or json)
    #[arg(long, global = true, value_parser = parse_format, default_value = "human")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Report timing for major phases
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Directory holding config.toml (defaults to the platform config dir)
    #[arg(long, global = true, env = "TENEX_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the MCP server on stdio
    Mcp,

    /// Write settings to the config file
    Setup {
        /// Main signing key (nsec or hex)
        #[arg(long)]
        private_key: Option<String>,

        /// Relay URL (repeatable, replaces the configured list)
        #[arg(long = "relay")]
        relays: Vec<String>,

        /// Editor command used to review snippets
        #[arg(long)]
        editor: Option<String>,

        /// Pubkey or npub whose follows seed the web of trust
        #[arg(long)]
        wot_from: Option<String>,
    },

    /// Find code snippets on relays
    FindSnippets(FindSnippetsArgs),

    /// Snippet files: template, parse, publish
    #[command(subcommand)]
    Snippet(SnippetCommands),

    /// Web of trust summary, or `wot refresh` to harvest follow lists
    #[command(args_conflicts_with_subcommands = true)]
    Wot {
        /// Pubkey or npub to summarise
        pubkey: Option<String>,

        #[command(subcommand)]
        action: Option<WotCommands>,
    },

    /// Search cached profiles
    FindUser {
        /// Name, npub, or any text in the profile
        query: String,
    },

    /// Configured users
    #[command(subcommand)]
    Users(UserCommands),

    /// Roo agents (kind 1338)
    #[command(subcommand)]
    Agent(AgentCommands),

    /// Instructions (kind 1339)
    #[command(subcommand)]
    Instructions(InstructionCommands),

    /// Publish a text note
    Publish {
        /// Note content
        content: String,

        /// Configured user to publish as (defaults to the main key)
        #[arg(long)]
        username: Option<String>,

        /// Wait for a reply from these users (pubkey, npub or name)
        #[arg(long)]
        obey: Vec<String>,
    },
}
