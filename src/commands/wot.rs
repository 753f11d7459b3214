//! Web of trust commands

use super::dispatch::{trace_command, CommandContext};
use super::output::emit;
use tenex_core::error::{Result, TenexError};
use tenex_core::keys::normalize_pubkey;
use tenex_core::wot::{refresh_follow_list, wot_summary};

pub fn summary(ctx: &mut CommandContext, pubkey: &str) -> Result<()> {
    let pubkey = normalize_pubkey(pubkey).map_err(|_| {
        TenexError::UsageError(
            "Invalid pubkey format. Please provide a valid hex pubkey or npub.".to_string(),
        )
    })?;
    let db = ctx.open_db()?;
    let users = ctx.known_users(&db)?;
    let summary = wot_summary(&db, &users, &pubkey)?;
    emit(ctx, &summary.render(), &summary)
}

/// Refresh from `pubkey`, then `wot_from`, then the main key.
pub fn refresh(ctx: &mut CommandContext, pubkey: Option<&str>) -> Result<()> {
    let pubkey = match pubkey.or(ctx.config.wot_from.as_deref()) {
        Some(pk) => normalize_pubkey(pk)?,
        None => ctx.signing_keys(None)?.public_key_hex(),
    };

    let mut db = ctx.open_db()?;
    let mut users = ctx.known_users(&db)?;
    let report = refresh_follow_list(&ctx.relay_pool(), &mut db, &mut users, &pubkey)?;
    trace_command!(ctx.cli, ctx.start, "refresh_follow_list");
    emit(ctx, &report.to_string(), &report)
}
