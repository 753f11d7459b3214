//! User commands: list, create, find-user

use serde_json::json;

use super::dispatch::CommandContext;
use super::output::emit;
use tenex_core::error::Result;
use tenex_core::users::{create_user, format_usernames, list_usernames};

pub fn list(ctx: &mut CommandContext) -> Result<()> {
    let users = list_usernames(&ctx.config)?;
    emit(ctx, &format_usernames(&users), &users)
}

pub fn create(
    ctx: &mut CommandContext,
    name: &str,
    display_name: Option<&str>,
    about: Option<&str>,
) -> Result<()> {
    let pool = ctx.relay_pool();
    let display_name = display_name.unwrap_or(name);
    let created = create_user(&mut ctx.config, &pool, name, display_name, about)?;
    let text = format!(
        "Created user \"{}\"\nNpub: {}\nPubkey: {}",
        created.username, created.npub, created.pubkey
    );
    emit(ctx, &text, &created)
}

pub fn find(ctx: &mut CommandContext, query: &str) -> Result<()> {
    let db = ctx.open_db()?;
    let users = ctx.known_users(&db)?;
    let text = users.find_user(&db, query)?;
    let pubkeys = users.query(&db, query)?;
    emit(ctx, &text, &json!({ "query": query, "pubkeys": pubkeys }))
}
