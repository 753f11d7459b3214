//! `tenex-tools setup` - write settings to config.toml

use serde_json::json;

use super::dispatch::CommandContext;
use super::output::emit;
use tenex_core::error::Result;
use tenex_core::keys::{normalize_pubkey, Keys};

pub struct SetupOptions<'a> {
    pub private_key: Option<&'a str>,
    pub relays: &'a [String],
    pub editor: Option<&'a str>,
    pub wot_from: Option<&'a str>,
}

pub fn execute(ctx: &mut CommandContext, opts: SetupOptions<'_>) -> Result<()> {
    let config = &mut ctx.config;

    if let Some(secret) = opts.private_key {
        // Reject bad keys before they reach the file.
        Keys::parse(secret)?;
        config.private_key = Some(secret.trim().to_string());
    }
    if !opts.relays.is_empty() {
        for relay in opts.relays {
            if !relay.starts_with("wss://") && !relay.starts_with("ws://") {
                tenex_core::bail_invalid!("relay url", relay);
            }
        }
        config.relays = opts.relays.to_vec();
    }
    if let Some(editor) = opts.editor {
        config.editor = Some(editor.to_string());
    }
    if let Some(wot_from) = opts.wot_from {
        config.wot_from = Some(normalize_pubkey(wot_from)?);
    }

    config.save()?;
    tracing::info!(path = %config.config_path().display(), "config saved");

    let pubkey = match config.private_key.as_deref() {
        Some(secret) => Some(Keys::parse(secret)?.npub()?),
        None => None,
    };
    let path = config.config_path();

    let mut text = format!("Configuration saved to {}", path.display());
    if let Some(npub) = &pubkey {
        text.push_str(&format!("\nMain key: {}", npub));
    }
    text.push_str(&format!("\nRelays: {}", config.relays.join(", ")));

    emit(
        ctx,
        &text,
        &json!({
            "config_path": path,
            "npub": pubkey,
            "relays": ctx.config.relays,
            "editor": ctx.config.editor,
            "wot_from": ctx.config.wot_from,
        }),
    )
}
