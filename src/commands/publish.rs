//! `tenex-tools publish` - text notes, optionally waiting for a reply

use super::dispatch::CommandContext;
use super::output::{emit, status};
use tenex_core::error::Result;
use tenex_core::note::{publish_note, OBEY_TIMEOUT};

pub fn execute(
    ctx: &mut CommandContext,
    content: &str,
    username: Option<&str>,
    obey: &[String],
) -> Result<()> {
    let keys = ctx.signing_keys(username)?;
    let db = ctx.open_db()?;
    let users = ctx.known_users(&db)?;
    if !obey.is_empty() {
        status(ctx, "Waiting for a reply...");
    }
    let outcome = publish_note(
        &ctx.relay_pool(),
        &keys,
        &users,
        &db,
        content,
        obey,
        OBEY_TIMEOUT,
    )?;
    emit(ctx, &outcome.message(), &outcome)
}
