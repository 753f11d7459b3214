use clap::{Args, Subcommand};
use std::path::PathBuf;

use tenex_core::snippet::FindSnippetsParams;

/// Filters shared by `find-snippets` and `snippet list`
#[derive(Args, Debug, Clone, Default)]
pub struct FindSnippetsArgs {
    /// Maximum number of events to fetch
    #[arg(long)]
    pub limit: Option<usize>,

    /// Only snippets created at or after this unix timestamp
    #[arg(long)]
    pub since: Option<u64>,

    /// Only snippets created at or before this unix timestamp
    #[arg(long)]
    pub until: Option<u64>,

    /// Languages, comma separated
    #[arg(long, value_delimiter = ',')]
    pub languages: Vec<String>,

    /// Tags to rank by, comma separated
    #[arg(long, value_delimiter = ',')]
    pub tags: Vec<String>,

    /// Authors (name, npub or hex pubkey), comma separated
    #[arg(long, value_delimiter = ',')]
    pub authors: Vec<String>,
}

impl From<&FindSnippetsArgs> for FindSnippetsParams {
    fn from(args: &FindSnippetsArgs) -> Self {
        FindSnippetsParams {
            limit: args.limit,
            since: args.since,
            until: args.until,
            authors: args.authors.clone(),
            languages: args.languages.clone(),
            tags: args.tags.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum SnippetCommands {
    /// Print an empty snippet file to fill in
    Template {
        /// Pre-fill the language field
        #[arg(long, default_value = "")]
        language: String,
    },

    /// Parse a snippet file and print its fields
    Parse {
        /// Snippet file (`---METADATA---` / `---CODE---`)
        file: PathBuf,
    },

    /// Publish a snippet file
    Publish {
        /// Snippet file (`---METADATA---` / `---CODE---`)
        file: PathBuf,

        /// Configured user to publish as (defaults to the main key)
        #[arg(long)]
        username: Option<String>,

        /// Review the snippet in the editor before signing
        #[arg(long)]
        edit: bool,
    },

    /// List snippet metadata (no code) for a search
    List(FindSnippetsArgs),

    /// Show a snippet by event id
    Show {
        /// Event id (hex)
        id: String,
    },
}
