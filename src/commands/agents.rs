//! Agent commands: find, get (install into .roomodes), publish

use std::path::Path;

use serde_json::json;

use super::dispatch::CommandContext;
use super::output::emit;
use tenex_core::agent::{find_agents, format_agents, install_agent, publish_agent};
use tenex_core::error::Result;

pub fn find(ctx: &mut CommandContext, query: &str, limit: usize) -> Result<()> {
    let agents = find_agents(&ctx.relay_pool(), query, limit)?;
    let text = if agents.is_empty() {
        "No agents found matching the query.".to_string()
    } else {
        format!("Found {} agents:\n\n{}", agents.len(), format_agents(&agents))
    };
    let listed: Vec<_> = agents
        .iter()
        .map(|a| {
            json!({
                "id": a.id,
                "title": a.tag_value("title").unwrap_or_default(),
                "description": a.tag_value("description").unwrap_or_default(),
            })
        })
        .collect();
    emit(ctx, &text, &listed)
}

pub fn get(ctx: &mut CommandContext, id: &str, roomodes: &Path) -> Result<()> {
    let mode = install_agent(&ctx.relay_pool(), id, roomodes)?;
    let text = format!("Agent \"{}\" saved to {}", mode.name, roomodes.display());
    emit(ctx, &text, &mode)
}

pub fn publish(
    ctx: &mut CommandContext,
    slug: &str,
    roomodes: &Path,
    username: Option<&str>,
) -> Result<()> {
    let keys = ctx.signing_keys(username)?;
    let (mode, report) = publish_agent(&ctx.relay_pool(), &keys, roomodes, slug)?;
    let text = format!(
        "Agent \"{}\" published successfully with ID: {}",
        mode.name, report.event_id
    );
    emit(ctx, &text, &json!({ "mode": mode, "report": report }))
}
