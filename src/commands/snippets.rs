//! Snippet commands: find, list, show, template, parse, publish

use std::fs;
use std::path::Path;

use serde_json::json;

use super::dispatch::{trace_command, CommandContext};
use super::output::{emit, status};
use crate::cli::FindSnippetsArgs;
use tenex_core::editor::Editor;
use tenex_core::error::{Result, TenexError};
use tenex_core::rank::TagMatches;
use tenex_core::snippet::envelope::MIN_TAGS;
use tenex_core::snippet::format::{format_find_result, format_snippet_list, format_snippets};
use tenex_core::snippet::publish::{publish_snippet, review_in_editor};
use tenex_core::snippet::{
    fetch_snippet, find_snippets, parse_envelope, serialize_envelope, FindSnippetsParams,
    Envelope, Snippet, SnippetCache,
};
use tenex_core::users::KnownUsers;

fn search(
    ctx: &CommandContext,
    args: &FindSnippetsArgs,
) -> Result<(TagMatches<Snippet>, KnownUsers)> {
    let mut db = ctx.open_db()?;
    let users = ctx.known_users(&db)?;
    trace_command!(ctx.cli, ctx.start, "open_db");

    let pool = ctx.relay_pool();
    let mut cache = SnippetCache::new();
    let params = FindSnippetsParams::from(args);
    let matches = find_snippets(&pool, &mut db, &mut cache, &users, &params)?;
    trace_command!(ctx.cli, ctx.start, "find_snippets");
    Ok((matches, users))
}

pub fn find(ctx: &mut CommandContext, args: &FindSnippetsArgs) -> Result<()> {
    let (matches, users) = search(ctx, args)?;
    emit(ctx, &format_find_result(&matches, &users), &matches)
}

pub fn list(ctx: &mut CommandContext, args: &FindSnippetsArgs) -> Result<()> {
    let (matches, users) = search(ctx, args)?;
    emit(ctx, &format_snippet_list(&matches, &users), &matches)
}

pub fn show(ctx: &mut CommandContext, id: &str) -> Result<()> {
    let mut db = ctx.open_db()?;
    let users = ctx.known_users(&db)?;
    let mut cache = SnippetCache::new();
    let snippet = fetch_snippet(&ctx.relay_pool(), &mut db, &mut cache, id)?
        .ok_or_else(|| TenexError::not_found("snippet", id))?;
    emit(
        ctx,
        &format_snippets(std::slice::from_ref(&snippet), &users),
        &snippet,
    )
}

pub fn template(ctx: &mut CommandContext, language: &str) -> Result<()> {
    let text = serialize_envelope("", "", language, &[], "");
    emit(ctx, &text, &json!({ "template": text }))
}

fn read_envelope(file: &Path) -> Result<Envelope> {
    let content =
        fs::read_to_string(file).map_err(|e| TenexError::io_operation("read", file, e))?;
    Ok(parse_envelope(&content)?)
}

pub fn parse(ctx: &mut CommandContext, file: &Path) -> Result<()> {
    let envelope = read_envelope(file)?;
    let meta = &envelope.metadata;
    let text = format!(
        "Title: {}\nDescription: {}\nLanguage: {}\nTags: {}\nCode: {} lines",
        meta.title,
        meta.description,
        meta.language,
        meta.tags.join(", "),
        envelope.code.lines().count()
    );
    emit(ctx, &text, &envelope)
}

pub fn publish(
    ctx: &mut CommandContext,
    file: &Path,
    username: Option<&str>,
    edit: bool,
) -> Result<()> {
    let mut envelope = read_envelope(file)?;
    if edit {
        let editor = Editor::resolve(&ctx.config)?;
        status(ctx, &format!("Waiting for {} to close the file...", editor.program()));
        envelope = review_in_editor(&editor, &envelope)?;
    }
    if envelope.metadata.title.trim().is_empty() {
        tenex_core::bail_usage!("snippet title must not be empty");
    }
    if envelope.metadata.tags.len() < MIN_TAGS {
        tracing::warn!(
            tags = envelope.metadata.tags.len(),
            "snippet has fewer than {} tags",
            MIN_TAGS
        );
    }

    let keys = ctx.signing_keys(username)?;
    let published = publish_snippet(&ctx.relay_pool(), &keys, &envelope)?;
    trace_command!(ctx.cli, ctx.start, "publish_snippet");
    emit(ctx, &published.message(), &published)
}
