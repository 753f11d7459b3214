//! MCP tool definitions and their dispatch into tenex-core

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use tenex_core::agent::{find_agents, format_agents, install_agent};
use tenex_core::config::Config;
use tenex_core::db::Database;
use tenex_core::editor::{Editor, EditorStdio};
use tenex_core::error::TenexError;
use tenex_core::instruction::{fetch_instruction, find_instructions, format_instructions};
use tenex_core::note::{publish_note, OBEY_TIMEOUT};
use tenex_core::relay::{EventPublisher, EventSource};
use tenex_core::snippet::format::{format_find_result, format_snippet_list, format_snippets};
use tenex_core::snippet::publish::{publish_snippet, review_in_editor};
use tenex_core::snippet::{
    fetch_snippet, find_snippets, Envelope, FindSnippetsParams, Metadata, SnippetCache,
};
use tenex_core::users::{format_usernames, list_usernames, KnownUsers};

/// A tool exposed over MCP and the config key that enables it
pub struct ToolSpec {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    schema: fn() -> Value,
}

fn snippet_filter_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "since": { "type": "number", "description": "Unix timestamp to fetch snippets from" },
            "until": { "type": "number", "description": "Unix timestamp to fetch snippets until" },
            "authors": {
                "type": "array", "items": { "type": "string" },
                "description": "List of author names to filter by (in username format!)"
            },
            "languages": {
                "type": "array", "items": { "type": "string" },
                "description": "List of programming languages to filter by"
            },
            "tags": {
                "type": "array", "items": { "type": "string" },
                "description": "List of tags to filter by, be exhaustive, e.g. [ 'ndk', 'nostr', 'pubkey', 'signer' ]"
            }
        }
    })
}

fn query_schema(what: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "query": { "type": "string", "description": format!("Search query to find matching {}", what) },
            "limit": { "type": "number", "description": format!("Maximum number of {} to return", what) }
        },
        "required": ["query"]
    })
}

fn find_agents_schema() -> Value {
    query_schema("agents")
}

fn find_instructions_schema() -> Value {
    query_schema("instructions")
}

fn find_user_schema() -> Value {
    json!({
        "type": "object",
        "properties": { "query": { "type": "string", "description": "Name, npub or profile text" } },
        "required": ["query"]
    })
}

fn empty_schema() -> Value {
    json!({ "type": "object", "properties": {} })
}

fn fetch_snippet_schema() -> Value {
    json!({
        "type": "object",
        "properties": { "id": { "type": "string", "description": "The ID of the snippet to fetch" } },
        "required": ["id"]
    })
}

fn get_agent_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "eventId": { "type": "string", "description": "Nostr event ID of the agent" },
            "roomodesPath": { "type": "string", "description": "Path to the .roomodes file" }
        },
        "required": ["eventId", "roomodesPath"]
    })
}

fn event_id_schema() -> Value {
    json!({
        "type": "object",
        "properties": { "eventId": { "type": "string", "description": "Nostr event ID" } },
        "required": ["eventId"]
    })
}

fn publish_snippet_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "title": { "type": "string" },
            "description": { "type": "string" },
            "language": { "type": "string" },
            "code": { "type": "string" },
            "tags": { "type": "array", "items": { "type": "string" } },
            "username": {
                "type": "string",
                "description": "Username to publish as (you can see list_usernames to see available usernames)"
            }
        },
        "required": ["title", "description", "language", "code", "tags"]
    })
}

fn publish_note_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "content": { "type": "string", "description": "The content of the note you want to publish" },
            "username": {
                "type": "string",
                "description": "Username to publish as (you can see list_usernames to see available usernames)"
            },
            "obey": {
                "type": "array", "items": { "type": "string" },
                "description": "Array of pubkeys, npubs, or names to wait for replies from"
            }
        },
        "required": ["content"]
    })
}

pub const TOOLS: &[ToolSpec] = &[
    ToolSpec {
        key: "snippets.find",
        name: "find_snippets",
        description: "Find code snippets with optional filtering by author, language, and tags",
        schema: snippet_filter_schema,
    },
    ToolSpec {
        key: "snippets.list",
        name: "list_snippets",
        description: "List code snippets metadata (without code content) with filtering by language and tags. Use this to get a large list of available code snippets.",
        schema: snippet_filter_schema,
    },
    ToolSpec {
        key: "snippet.publish",
        name: "publish_code_snippet",
        description: "Publish a new code snippet to Nostr",
        schema: publish_snippet_schema,
    },
    ToolSpec {
        key: "snippet.fetch",
        name: "fetch_snippet_by_id",
        description: "Fetch and display a snippet by its ID",
        schema: fetch_snippet_schema,
    },
    ToolSpec {
        key: "agents.find",
        name: "find_agents",
        description: "Find Roo agents with optional filtering by query",
        schema: find_agents_schema,
    },
    ToolSpec {
        key: "agent.get",
        name: "get_agent",
        description: "Get a Roo agent by event ID and save it to .roomodes file",
        schema: get_agent_schema,
    },
    ToolSpec {
        key: "instructions.find",
        name: "find_instructions",
        description: "Find instructions with optional filtering by query",
        schema: find_instructions_schema,
    },
    ToolSpec {
        key: "instructions.get",
        name: "get_instruction",
        description: "Get an instruction by event ID",
        schema: event_id_schema,
    },
    ToolSpec {
        key: "note.publish",
        name: "publish",
        description: "Publish a note to Nostr",
        schema: publish_note_schema,
    },
    ToolSpec {
        key: "users.find",
        name: "find_user",
        description: "Find a user by name, npub, or other profile information",
        schema: find_user_schema,
    },
    ToolSpec {
        key: "users.list",
        name: "list_usernames",
        description: "List all available usernames in the system",
        schema: empty_schema,
    },
];

/// `tools/list` entries enabled by `config`
pub fn tool_definitions(config: &Config) -> Vec<Value> {
    TOOLS
        .iter()
        .filter(|tool| config.command_enabled(tool.key))
        .map(|tool| {
            json!({
                "name": tool.name,
                "description": tool.description,
                "inputSchema": (tool.schema)(),
            })
        })
        .collect()
}

/// Why a tool call did not produce a result
#[derive(Debug)]
pub enum CallError {
    /// Unknown or disabled tool, or arguments that do not fit its schema.
    InvalidParams(String),
    /// The tool ran and failed.
    Failed(TenexError),
}

impl From<TenexError> for CallError {
    fn from(err: TenexError) -> Self {
        CallError::Failed(err)
    }
}

type CallResult = std::result::Result<String, CallError>;

fn args<T: DeserializeOwned>(arguments: Value) -> std::result::Result<T, CallError> {
    let arguments = if arguments.is_null() {
        json!({})
    } else {
        arguments
    };
    serde_json::from_value(arguments).map_err(|e| CallError::InvalidParams(e.to_string()))
}

#[derive(Deserialize)]
struct IdArgs {
    id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventIdArgs {
    event_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetAgentArgs {
    event_id: String,
    roomodes_path: std::path::PathBuf,
}

#[derive(Deserialize)]
struct QueryArgs {
    query: String,
    limit: Option<usize>,
}

#[derive(Deserialize)]
struct PublishSnippetArgs {
    title: String,
    description: String,
    language: String,
    code: String,
    #[serde(default)]
    tags: Vec<String>,
    username: Option<String>,
}

#[derive(Deserialize)]
struct PublishNoteArgs {
    content: String,
    username: Option<String>,
    #[serde(default)]
    obey: Vec<String>,
}

/// Everything a tool call may touch
pub struct Tools<R> {
    pub config: Config,
    db: Database,
    relay: R,
    users: KnownUsers,
    cache: SnippetCache,
}

impl<R: EventSource + EventPublisher> Tools<R> {
    pub fn new(config: Config, db: Database, relay: R, users: KnownUsers) -> Self {
        Self {
            config,
            db,
            relay,
            users,
            cache: SnippetCache::new(),
        }
    }

    /// Run tool `name` with JSON `arguments`, returning its text result.
    pub fn call(&mut self, name: &str, arguments: Value) -> CallResult {
        let Some(tool) = TOOLS
            .iter()
            .find(|t| t.name == name && self.config.command_enabled(t.key))
        else {
            return Err(CallError::InvalidParams(format!("Unknown tool: {}", name)));
        };
        tracing::debug!(tool = tool.name, "tools/call");

        match tool.key {
            "snippets.find" => self.find_snippets(args(arguments)?, false),
            "snippets.list" => self.find_snippets(args(arguments)?, true),
            "snippet.publish" => self.publish_snippet(args(arguments)?),
            "snippet.fetch" => self.fetch_snippet(args(arguments)?),
            "agents.find" => self.find_agents(args(arguments)?),
            "agent.get" => self.get_agent(args(arguments)?),
            "instructions.find" => self.find_instructions(args(arguments)?),
            "instructions.get" => self.get_instruction(args(arguments)?),
            "note.publish" => self.publish_note(args(arguments)?),
            "users.find" => {
                let QueryArgs { query, .. } = args(arguments)?;
                Ok(self.users.find_user(&self.db, &query)?)
            }
            "users.list" => Ok(format_usernames(&list_usernames(&self.config)?)),
            other => Err(CallError::InvalidParams(format!("Unknown tool: {}", other))),
        }
    }

    fn find_snippets(&mut self, params: FindSnippetsParams, metadata_only: bool) -> CallResult {
        let matches = find_snippets(
            &self.relay,
            &mut self.db,
            &mut self.cache,
            &self.users,
            &params,
        )?;
        Ok(if metadata_only {
            format_snippet_list(&matches, &self.users)
        } else {
            format_find_result(&matches, &self.users)
        })
    }

    fn fetch_snippet(&mut self, IdArgs { id }: IdArgs) -> CallResult {
        match fetch_snippet(&self.relay, &mut self.db, &mut self.cache, &id)? {
            Some(snippet) => Ok(format_snippets(&[snippet], &self.users)),
            None => Ok(format!("No snippet found with ID: {}", id)),
        }
    }

    fn publish_snippet(&mut self, a: PublishSnippetArgs) -> CallResult {
        let keys = self.config.signing_keys(a.username.as_deref())?;
        let mut envelope = Envelope {
            metadata: Metadata {
                title: a.title,
                description: a.description,
                language: a.language,
                tags: a.tags,
            },
            code: a.code,
        };
        if self.config.review_snippets {
            let editor = Editor::resolve(&self.config)?.with_stdio(EditorStdio::Detached);
            envelope = review_in_editor(&editor, &envelope)?;
        }
        Ok(publish_snippet(&self.relay, &keys, &envelope)?.message())
    }

    fn find_agents(&mut self, QueryArgs { query, limit }: QueryArgs) -> CallResult {
        let limit = limit.unwrap_or(tenex_core::agent::DEFAULT_LIMIT);
        let agents = find_agents(&self.relay, &query, limit)?;
        if agents.is_empty() {
            return Ok("No agents found matching the query.".to_string());
        }
        Ok(format!(
            "Found {} agents:\n\n{}",
            agents.len(),
            format_agents(&agents)
        ))
    }

    fn get_agent(&mut self, a: GetAgentArgs) -> CallResult {
        let mode = install_agent(&self.relay, &a.event_id, &a.roomodes_path)?;
        Ok(format!(
            "Agent \"{}\" saved to {}",
            mode.name,
            a.roomodes_path.display()
        ))
    }

    fn find_instructions(&mut self, QueryArgs { query, limit }: QueryArgs) -> CallResult {
        let limit = limit.unwrap_or(tenex_core::instruction::DEFAULT_LIMIT);
        let found = find_instructions(&self.relay, &query, limit)?;
        if found.is_empty() {
            return Ok("No instructions found matching the query.".to_string());
        }
        Ok(format!(
            "Found {} instructions:\n\n{}",
            found.len(),
            format_instructions(&found)
        ))
    }

    fn get_instruction(&mut self, EventIdArgs { event_id }: EventIdArgs) -> CallResult {
        Ok(match fetch_instruction(&self.relay, &event_id)? {
            Some(event) => event.content,
            None => format!("No instruction found with ID: {}", event_id),
        })
    }

    fn publish_note(&mut self, a: PublishNoteArgs) -> CallResult {
        let keys = self.config.signing_keys(a.username.as_deref())?;
        let outcome = publish_note(
            &self.relay,
            &keys,
            &self.users,
            &self.db,
            &a.content,
            &a.obey,
            OBEY_TIMEOUT,
        )?;
        Ok(outcome.message())
    }
}
