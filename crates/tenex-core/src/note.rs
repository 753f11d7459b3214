//! Text notes (kind 1), optionally waiting for a reply

use std::time::Duration;

use serde::Serialize;

use crate::db::Database;
use crate::error::{Result, TenexError};
use crate::event::{kind, UnsignedEvent};
use crate::keys::{encode_note, encode_npub, Keys};
use crate::relay::{EventPublisher, EventSource, Filter};
use crate::users::KnownUsers;

/// How long `publish --obey` waits for a reply.
pub const OBEY_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NoteOutcome {
    Published { event_id: String, note: String },
    Reply { event_id: String, author: String, content: String },
}

impl NoteOutcome {
    pub fn message(&self) -> String {
        match self {
            NoteOutcome::Published { note, .. } => format!("Published to Nostr with ID: {}", note),
            NoteOutcome::Reply {
                author, content, ..
            } => format!("{} says:\n\n{}", author, content),
        }
    }
}

/// Publish `content` as a text note. With `obey` set, block until one of
/// those users replies to it (an `e` tag referencing the note) and return
/// the reply instead.
pub fn publish_note<R>(
    relay: &R,
    keys: &Keys,
    users: &KnownUsers,
    db: &Database,
    content: &str,
    obey: &[String],
    timeout: Duration,
) -> Result<NoteOutcome>
where
    R: EventSource + EventPublisher + ?Sized,
{
    let mut targets = Vec::new();
    for identifier in obey {
        targets.extend(users.resolve_identifier(db, identifier)?);
    }
    if !obey.is_empty() && targets.is_empty() {
        return Err(TenexError::not_found("user", obey.join(", ")));
    }

    let event = UnsignedEvent::new(kind::TEXT_NOTE, content, Vec::new()).sign(keys)?;
    relay.publish(&event)?;
    tracing::info!(id = %event.id, "published note");

    if targets.is_empty() {
        return Ok(NoteOutcome::Published {
            note: encode_note(&event.id)?,
            event_id: event.id,
        });
    }

    tracing::info!(targets = targets.len(), "waiting for reply");
    let filter = Filter::new()
        .kind(kind::TEXT_NOTE)
        .authors(targets)
        .tag('e', [event.id.clone()]);
    let reply = relay
        .wait_for_event(&filter, timeout)?
        .ok_or_else(|| TenexError::Timeout(format!("a reply to {}", event.id)))?;

    Ok(NoteOutcome::Reply {
        author: reply_author(users, &reply.pubkey)?,
        event_id: reply.id,
        content: reply.content,
    })
}

fn reply_author(users: &KnownUsers, pubkey: &str) -> Result<String> {
    let npub = encode_npub(pubkey)?;
    Ok(match users.name(pubkey) {
        Some(name) => format!("{} ({})", name, npub),
        None => npub,
    })
}
