//! Code snippets (kind 1337 events)

pub mod cache;
pub mod envelope;
pub mod format;
pub mod publish;
pub mod search;

use serde::{Deserialize, Serialize};

use crate::event::{tag, Event};
use crate::rank::Tagged;

pub use cache::SnippetCache;
pub use envelope::{parse_envelope, serialize_envelope, Envelope, FormatError, Metadata};
pub use search::{fetch_snippet, find_snippets, FindSnippetsParams};

pub const DEFAULT_TITLE: &str = "Untitled";
pub const DEFAULT_LANGUAGE: &str = "text";

/// A snippet as read from a kind-1337 event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snippet {
    /// Originating event id.
    pub id: String,
    pub title: String,
    pub description: String,
    pub code: String,
    pub language: String,
    /// Author public key (hex).
    pub pubkey: String,
    pub created_at: u64,
    pub tags: Vec<String>,
}

impl Snippet {
    pub fn from_event(event: &Event) -> Self {
        let title = event
            .tag_value("title")
            .or_else(|| event.tag_value("name"))
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_TITLE);
        let language = event
            .tag_value("l")
            .filter(|l| !l.is_empty())
            .unwrap_or(DEFAULT_LANGUAGE);

        Self {
            id: event.id.clone(),
            title: title.to_string(),
            description: event.tag_value("description").unwrap_or("").to_string(),
            code: event.content.clone(),
            language: language.to_string(),
            pubkey: event.pubkey.clone(),
            created_at: event.created_at,
            tags: event.tag_values("t").into_iter().map(str::to_string).collect(),
        }
    }
}

impl Tagged for Snippet {
    fn topic_tags(&self) -> Vec<&str> {
        self.tags.iter().map(String::as_str).collect()
    }
}

/// Event tags for publishing a snippet: `name`, `description`, `l`, then one
/// `t` per topic tag.
pub fn snippet_event_tags(metadata: &Metadata) -> Vec<Vec<String>> {
    let mut tags = vec![
        tag("name", metadata.title.as_str()),
        tag("description", metadata.description.as_str()),
        tag("l", metadata.language.as_str()),
    ];
    tags.extend(metadata.tags.iter().map(|t| tag("t", t.as_str())));
    tags
}
