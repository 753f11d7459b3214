use clap::Subcommand;
use std::path::PathBuf;

/// Default location of the Roo modes file
pub const ROOMODES_FILE: &str = ".roomodes";

#[derive(Subcommand, Debug)]
pub enum WotCommands {
    /// Fetch a follow list and the profiles of unknown follows
    Refresh {
        /// Pubkey or npub (defaults to `wot_from`, then the main key)
        pubkey: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// List configured users
    List,

    /// Generate a key for a new user and publish its profile
    Create {
        /// Username used with --username
        name: String,

        /// Profile display name (defaults to the username)
        #[arg(long)]
        display_name: Option<String>,

        /// Profile about text
        #[arg(long)]
        about: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum AgentCommands {
    /// Search agents by title, description or tag
    Find {
        query: String,

        /// Maximum number of events to fetch
        #[arg(long, default_value_t = tenex_core::agent::DEFAULT_LIMIT)]
        limit: usize,
    },

    /// Install an agent into a .roomodes file
    Get {
        /// Agent event id
        id: String,

        #[arg(long, default_value = ROOMODES_FILE)]
        roomodes: PathBuf,
    },

    /// Publish a mode from a .roomodes file
    Publish {
        /// Mode slug
        slug: String,

        #[arg(long, default_value = ROOMODES_FILE)]
        roomodes: PathBuf,

        /// Configured user to publish as (defaults to the main key)
        #[arg(long)]
        username: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum InstructionCommands {
    /// Search instructions by title, description, tag or content
    Find {
        query: String,

        /// Maximum number of events to fetch
        #[arg(long, default_value_t = tenex_core::instruction::DEFAULT_LIMIT)]
        limit: usize,
    },

    /// Print an instruction's content
    Get {
        /// Instruction event id
        id: String,

        /// Write the content to this file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Publish a file as a new instruction version
    Publish {
        file: PathBuf,

        #[arg(long)]
        title: String,

        #[arg(long)]
        description: String,

        /// Topic tag (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Configured user to publish as (defaults to the main key)
        #[arg(long)]
        username: Option<String>,
    },
}
