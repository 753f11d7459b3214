//! Agent definitions (kind 1338) and the Roo `.roomodes` file

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TenexError};
use crate::event::{kind, tag, Event, UnsignedEvent};
use crate::keys::Keys;
use crate::relay::{EventPublisher, EventSource, Filter, PublishReport};

pub const DEFAULT_LIMIT: usize = 50;
const AGENT_TOPIC: &str = "roo-agent";
const MODE_GROUPS: [&str; 5] = ["read", "edit", "browser", "command", "mcp"];
const MODE_SOURCE: &str = "project";

/// One entry of `customModes`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RooMode {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub role_definition: String,
    #[serde(default)]
    pub groups: Vec<serde_json::Value>,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub custom_instructions: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub when_to_use: String,
}

impl RooMode {
    /// Build a project mode from an agent event.
    pub fn from_event(event: &Event) -> Self {
        let title = event.tag_value("title").unwrap_or_default();
        Self {
            slug: kebab_case(title),
            name: title.to_string(),
            role_definition: event.tag_value("role").unwrap_or_default().to_string(),
            groups: MODE_GROUPS.iter().map(|g| serde_json::json!(g)).collect(),
            source: MODE_SOURCE.to_string(),
            custom_instructions: event.tag_value("instructions").unwrap_or_default().to_string(),
            when_to_use: event.tag_value("situation").unwrap_or_default().to_string(),
        }
    }
}

/// The `.roomodes` document. Unknown top-level keys are preserved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RooModesFile {
    #[serde(default)]
    pub custom_modes: Vec<RooMode>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl RooModesFile {
    /// Read `path`; a missing or blank file is an empty document.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content =
            fs::read_to_string(path).map_err(|e| TenexError::io_operation("read", path, e))?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(&content).map_err(|e| TenexError::io_operation("parse", path, e))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| TenexError::io_operation("create directory", parent, e))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|e| TenexError::io_operation("write", path, e))
    }

    /// Insert `mode`, replacing any mode with the same slug in place.
    pub fn upsert(&mut self, mode: RooMode) {
        match self.custom_modes.iter_mut().find(|m| m.slug == mode.slug) {
            Some(existing) => *existing = mode,
            None => self.custom_modes.push(mode),
        }
    }

    pub fn get(&self, slug: &str) -> Option<&RooMode> {
        self.custom_modes.iter().find(|m| m.slug == slug)
    }
}

/// `camelCase`, `snake_case` and spaced words become `kebab-case`.
pub fn kebab_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut prev: Option<char> = None;
    for c in input.chars() {
        if c.is_whitespace() || c == '_' {
            if !out.ends_with('-') {
                out.push('-');
            }
        } else {
            if c.is_uppercase() && prev.is_some_and(|p| p.is_lowercase()) {
                out.push('-');
            }
            out.extend(c.to_lowercase());
        }
        prev = Some(c);
    }
    out
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// Agent events whose title, description or `t` tags contain `query`.
pub fn find_agents(
    source: &(impl EventSource + ?Sized),
    query: &str,
    limit: usize,
) -> Result<Vec<Event>> {
    let filter = Filter::new().kind(kind::AGENT).limit(limit);
    let needle = query.to_lowercase();
    let agents: Vec<Event> = source
        .fetch_events(&filter)?
        .into_iter()
        .filter(|event| {
            contains_ci(event.tag_value("title").unwrap_or_default(), &needle)
                || contains_ci(event.tag_value("description").unwrap_or_default(), &needle)
                || event.tag_values("t").iter().any(|t| contains_ci(t, &needle))
        })
        .collect();
    tracing::debug!(query, found = agents.len(), "find_agents");
    Ok(agents)
}

/// Numbered `N. title: description (model)` lines.
pub fn format_agents(agents: &[Event]) -> String {
    if agents.is_empty() {
        return "No agents found.".to_string();
    }
    agents
        .iter()
        .enumerate()
        .map(|(i, agent)| {
            let model = agent
                .tag_value("model")
                .filter(|m| !m.is_empty())
                .map(|m| format!(" ({})", m))
                .unwrap_or_default();
            format!(
                "{}. {}: {}{}",
                i + 1,
                agent.tag_value("title").unwrap_or_default(),
                agent.tag_value("description").unwrap_or_default(),
                model
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn fetch_agent(source: &(impl EventSource + ?Sized), event_id: &str) -> Result<Option<Event>> {
    let filter = Filter::new().kind(kind::AGENT).id(event_id);
    Ok(source.fetch_events(&filter)?.into_iter().next())
}

/// Fetch an agent and save it as a mode in `roomodes_path`.
pub fn install_agent(
    source: &(impl EventSource + ?Sized),
    event_id: &str,
    roomodes_path: &Path,
) -> Result<RooMode> {
    let event =
        fetch_agent(source, event_id)?.ok_or_else(|| TenexError::not_found("agent", event_id))?;
    let mode = RooMode::from_event(&event);

    let mut modes = RooModesFile::load(roomodes_path)?;
    modes.upsert(mode.clone());
    modes.save(roomodes_path)?;
    tracing::info!(slug = %mode.slug, path = %roomodes_path.display(), "installed agent");
    Ok(mode)
}

/// Event tags and content for publishing `mode`.
pub fn agent_event(mode: &RooMode) -> Result<UnsignedEvent> {
    let mut tags = vec![
        tag("title", mode.name.clone()),
        tag("role", mode.role_definition.clone()),
        tag("instructions", mode.custom_instructions.clone()),
        tag("t", AGENT_TOPIC),
        tag("t", mode.slug.clone()),
    ];
    if !mode.when_to_use.is_empty() {
        tags.push(tag("situation", mode.when_to_use.clone()));
    }
    let content = serde_json::to_string(&serde_json::json!({
        "name": mode.name,
        "roleDefinition": mode.role_definition,
        "customInstructions": mode.custom_instructions,
    }))?;
    Ok(UnsignedEvent::new(kind::AGENT, content, tags))
}

/// Publish the mode named `slug` from `roomodes_path`.
pub fn publish_agent(
    publisher: &(impl EventPublisher + ?Sized),
    keys: &Keys,
    roomodes_path: &Path,
    slug: &str,
) -> Result<(RooMode, PublishReport)> {
    if !roomodes_path.exists() {
        return Err(TenexError::not_found("file", roomodes_path.display()));
    }
    let modes = RooModesFile::load(roomodes_path)?;
    let mode = modes
        .get(slug)
        .cloned()
        .ok_or_else(|| TenexError::not_found("agent", slug))?;

    let event = agent_event(&mode)?.sign(keys)?;
    let report = publisher.publish(&event)?;
    tracing::info!(id = %event.id, slug, "published agent");
    Ok((mode, report))
}
