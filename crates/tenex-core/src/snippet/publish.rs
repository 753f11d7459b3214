//! Publishing snippets, with an optional review pass in the editor

use serde::Serialize;

use super::envelope::{parse_envelope, serialize_envelope, Envelope, Metadata, MIN_TAGS};
use super::snippet_event_tags;
use crate::editor::Editor;
use crate::error::Result;
use crate::event::{kind, UnsignedEvent};
use crate::keys::{encode_note, Keys};
use crate::relay::{EventPublisher, PublishReport};

const SNIPSNIP_URL: &str = "https://snipsnip.dev/snippet";
const NJUMP_URL: &str = "https://njump.me";

/// Outcome of a successful publish
#[derive(Debug, Clone, Serialize)]
pub struct PublishedSnippet {
    pub title: String,
    pub event_id: String,
    pub note: String,
    pub report: PublishReport,
}

impl PublishedSnippet {
    pub fn message(&self) -> String {
        format!(
            "Published code snippet \"{}\" to Nostr: The snippet can be seen in {}/{} or {}/{}",
            self.title, SNIPSNIP_URL, self.event_id, NJUMP_URL, self.note
        )
    }
}

/// Combine an edited envelope with the one handed to the editor. Empty
/// metadata fields keep their original value and the edited code is taken
/// as written. The edited tag list only replaces the original when it has
/// at least [`MIN_TAGS`] entries.
pub fn merge_edited(original: &Envelope, edited: Envelope) -> Envelope {
    let pick = |edited: String, original: &str| {
        if edited.is_empty() {
            original.to_string()
        } else {
            edited
        }
    };

    let Envelope { metadata, code } = edited;
    let tags = if metadata.tags.len() >= MIN_TAGS {
        metadata.tags
    } else {
        original.metadata.tags.clone()
    };

    Envelope {
        metadata: Metadata {
            title: pick(metadata.title, &original.metadata.title),
            description: pick(metadata.description, &original.metadata.description),
            language: pick(metadata.language, &original.metadata.language),
            tags,
        },
        code,
    }
}

/// Open the envelope in `editor` and merge the result back. A file that no
/// longer parses aborts with a format error.
pub fn review_in_editor(editor: &Editor, envelope: &Envelope) -> Result<Envelope> {
    let Metadata {
        title,
        description,
        language,
        tags,
    } = &envelope.metadata;
    let text = serialize_envelope(title, description, language, tags, &envelope.code);
    let edited = editor.edit(&text, language)?;
    let parsed = parse_envelope(&edited)?;
    Ok(merge_edited(envelope, parsed))
}

/// Sign the envelope as a kind 1337 event and send it to the relays.
pub fn publish_snippet(
    publisher: &(impl EventPublisher + ?Sized),
    keys: &Keys,
    envelope: &Envelope,
) -> Result<PublishedSnippet> {
    let event = UnsignedEvent::new(
        kind::SNIPPET,
        envelope.code.clone(),
        snippet_event_tags(&envelope.metadata),
    )
    .sign(keys)?;

    let report = publisher.publish(&event)?;
    tracing::info!(
        id = %event.id,
        accepted = report.accepted.len(),
        "published snippet"
    );

    Ok(PublishedSnippet {
        title: envelope.metadata.title.clone(),
        note: encode_note(&event.id)?,
        event_id: event.id,
        report,
    })
}
