//! Command trait implementations for the CLI enums

use super::command::{Command, CommandContext};
use crate::cli::{
    AgentCommands, Commands, InstructionCommands, SnippetCommands, UserCommands, WotCommands,
};
use crate::commands;
use tenex_core::error::Result;

impl Command for Commands {
    fn execute(&self, ctx: &mut CommandContext) -> Result<()> {
        match self {
            Commands::Mcp => crate::mcp::serve(ctx),

            Commands::Setup {
                private_key,
                relays,
                editor,
                wot_from,
            } => commands::setup::execute(
                ctx,
                commands::setup::SetupOptions {
                    private_key: private_key.as_deref(),
                    relays,
                    editor: editor.as_deref(),
                    wot_from: wot_from.as_deref(),
                },
            ),

            Commands::FindSnippets(args) => commands::snippets::find(ctx, args),

            Commands::Snippet(cmd) => cmd.execute(ctx),

            Commands::Wot { pubkey, action } => match (action, pubkey) {
                (Some(WotCommands::Refresh { pubkey }), _) => {
                    commands::wot::refresh(ctx, pubkey.as_deref())
                }
                (None, Some(pubkey)) => commands::wot::summary(ctx, pubkey),
                (None, None) => {
                    tenex_core::bail_usage!("missing pubkey. Usage: tenex-tools wot <pubkey>")
                }
            },

            Commands::FindUser { query } => commands::users::find(ctx, query),

            Commands::Users(cmd) => cmd.execute(ctx),

            Commands::Agent(cmd) => cmd.execute(ctx),

            Commands::Instructions(cmd) => cmd.execute(ctx),

            Commands::Publish {
                content,
                username,
                obey,
            } => commands::publish::execute(ctx, content, username.as_deref(), obey),
        }
    }
}

impl Command for SnippetCommands {
    fn execute(&self, ctx: &mut CommandContext) -> Result<()> {
        match self {
            SnippetCommands::Template { language } => commands::snippets::template(ctx, language),
            SnippetCommands::Parse { file } => commands::snippets::parse(ctx, file),
            SnippetCommands::Publish {
                file,
                username,
                edit,
            } => commands::snippets::publish(ctx, file, username.as_deref(), *edit),
            SnippetCommands::List(args) => commands::snippets::list(ctx, args),
            SnippetCommands::Show { id } => commands::snippets::show(ctx, id),
        }
    }
}

impl Command for UserCommands {
    fn execute(&self, ctx: &mut CommandContext) -> Result<()> {
        match self {
            UserCommands::List => commands::users::list(ctx),
            UserCommands::Create {
                name,
                display_name,
                about,
            } => commands::users::create(ctx, name, display_name.as_deref(), about.as_deref()),
        }
    }
}

impl Command for AgentCommands {
    fn execute(&self, ctx: &mut CommandContext) -> Result<()> {
        match self {
            AgentCommands::Find { query, limit } => commands::agents::find(ctx, query, *limit),
            AgentCommands::Get { id, roomodes } => commands::agents::get(ctx, id, roomodes),
            AgentCommands::Publish {
                slug,
                roomodes,
                username,
            } => commands::agents::publish(ctx, slug, roomodes, username.as_deref()),
        }
    }
}

impl Command for InstructionCommands {
    fn execute(&self, ctx: &mut CommandContext) -> Result<()> {
        match self {
            InstructionCommands::Find { query, limit } => {
                commands::instructions::find(ctx, query, *limit)
            }
            InstructionCommands::Get { id, out } => {
                commands::instructions::get(ctx, id, out.as_deref())
            }
            InstructionCommands::Publish {
                file,
                title,
                description,
                tags,
                username,
            } => commands::instructions::publish(
                ctx,
                commands::instructions::PublishOptions {
                    file,
                    title,
                    description,
                    tags,
                    username: username.as_deref(),
                },
            ),
        }
    }
}
