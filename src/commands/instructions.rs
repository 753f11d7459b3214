//! Instruction commands: find, get, publish

use std::fs;
use std::path::Path;

use serde_json::json;

use super::dispatch::CommandContext;
use super::output::emit;
use tenex_core::error::{Result, TenexError};
use tenex_core::instruction::{
    fetch_instruction, find_instructions, format_instructions, get_version, publish_instruction,
};

pub fn find(ctx: &mut CommandContext, query: &str, limit: usize) -> Result<()> {
    let found = find_instructions(&ctx.relay_pool(), query, limit)?;
    let text = if found.is_empty() {
        "No instructions found matching the query.".to_string()
    } else {
        format!(
            "Found {} instructions:\n\n{}",
            found.len(),
            format_instructions(&found)
        )
    };
    let listed: Vec<_> = found
        .iter()
        .map(|e| {
            json!({
                "id": e.id,
                "title": e.tag_value("title").unwrap_or_default(),
                "description": e.tag_value("description").unwrap_or_default(),
                "version": get_version(e),
            })
        })
        .collect();
    emit(ctx, &text, &listed)
}

pub fn get(ctx: &mut CommandContext, id: &str, out: Option<&Path>) -> Result<()> {
    let event = fetch_instruction(&ctx.relay_pool(), id)?
        .ok_or_else(|| TenexError::not_found("instruction", id))?;
    let version = get_version(&event).to_string();

    if let Some(path) = out {
        fs::write(path, &event.content).map_err(|e| TenexError::io_operation("write", path, e))?;
        let text = format!("Saved version {} to {}", version, path.display());
        return emit(
            ctx,
            &text,
            &json!({ "id": event.id, "version": version, "path": path }),
        );
    }

    emit(
        ctx,
        &event.content,
        &json!({ "id": event.id, "version": version, "content": event.content }),
    )
}

pub struct PublishOptions<'a> {
    pub file: &'a Path,
    pub title: &'a str,
    pub description: &'a str,
    pub tags: &'a [String],
    pub username: Option<&'a str>,
}

pub fn publish(ctx: &mut CommandContext, opts: PublishOptions<'_>) -> Result<()> {
    if !opts.file.exists() {
        return Err(TenexError::not_found("file", opts.file.display()));
    }
    let content = fs::read_to_string(opts.file)
        .map_err(|e| TenexError::io_operation("read", opts.file, e))?;
    let keys = ctx.signing_keys(opts.username)?;
    let published = publish_instruction(
        &ctx.relay_pool(),
        &keys,
        &content,
        opts.title,
        opts.description,
        opts.tags,
    )?;
    emit(ctx, &published.message(), &published)
}
