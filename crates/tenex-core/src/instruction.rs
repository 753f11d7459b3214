//! Versioned instruction documents (kind 1339)

use regex::{Regex, RegexBuilder};

use crate::error::Result;
use crate::event::{kind, tag, Event, UnsignedEvent};
use crate::keys::Keys;
use crate::relay::{EventPublisher, EventSource, Filter, PublishReport};

pub const DEFAULT_LIMIT: usize = 50;
const DEFAULT_VERSION: &str = "1";

/// The `ver` tag, or `"1"` when absent.
pub fn get_version(event: &Event) -> &str {
    event
        .tag_value("ver")
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_VERSION)
}

fn content_pattern(query: &str) -> Option<Regex> {
    let build = |pattern: &str| RegexBuilder::new(pattern).case_insensitive(true).build();
    build(query).or_else(|_| build(&regex::escape(query))).ok()
}

/// Instructions whose title, description or `t` tags contain `query`, or
/// whose content matches it as a case-insensitive pattern.
pub fn find_instructions(
    source: &(impl EventSource + ?Sized),
    query: &str,
    limit: usize,
) -> Result<Vec<Event>> {
    let filter = Filter::new().kind(kind::INSTRUCTION).limit(limit);
    let needle = query.to_lowercase();
    let pattern = content_pattern(query);
    let contains = |value: &str| value.to_lowercase().contains(&needle);

    let found: Vec<Event> = source
        .fetch_events(&filter)?
        .into_iter()
        .filter(|event| {
            contains(event.tag_value("title").unwrap_or_default())
                || contains(event.tag_value("description").unwrap_or_default())
                || event.tag_values("t").into_iter().any(contains)
                || pattern.as_ref().is_some_and(|p| p.is_match(&event.content))
        })
        .collect();
    tracing::debug!(query, found = found.len(), "find_instructions");
    Ok(found)
}

/// Numbered `N. title (vVER): description` lines.
pub fn format_instructions(instructions: &[Event]) -> String {
    if instructions.is_empty() {
        return "No instructions found.".to_string();
    }
    instructions
        .iter()
        .enumerate()
        .map(|(i, event)| {
            format!(
                "{}. {} (v{}): {}",
                i + 1,
                event.tag_value("title").unwrap_or_default(),
                get_version(event),
                event.tag_value("description").unwrap_or_default()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn fetch_instruction(
    source: &(impl EventSource + ?Sized),
    event_id: &str,
) -> Result<Option<Event>> {
    let filter = Filter::new().kind(kind::INSTRUCTION).id(event_id);
    Ok(source.fetch_events(&filter)?.into_iter().next())
}

/// One more than the highest version `author` has published. Lookup
/// failures fall back to the first version.
pub fn next_version(source: &(impl EventSource + ?Sized), author: &str) -> String {
    let filter = Filter::new()
        .kind(kind::INSTRUCTION)
        .authors([author.to_string()]);
    match source.fetch_events(&filter) {
        Ok(existing) => existing
            .iter()
            .filter_map(|event| get_version(event).parse::<u64>().ok())
            .max()
            .map(|max| (max + 1).to_string())
            .unwrap_or_else(|| DEFAULT_VERSION.to_string()),
        Err(e) => {
            tracing::warn!(error = %e, "failed to look up existing instruction versions");
            DEFAULT_VERSION.to_string()
        }
    }
}

/// A published instruction
#[derive(Debug, Clone, serde::Serialize)]
pub struct PublishedInstruction {
    pub event_id: String,
    pub title: String,
    pub version: String,
    pub report: PublishReport,
}

impl PublishedInstruction {
    pub fn message(&self) -> String {
        format!(
            "Instruction \"{}\" published successfully with ID: {}",
            self.title, self.event_id
        )
    }
}

pub fn publish_instruction<R>(
    relay: &R,
    keys: &Keys,
    content: &str,
    title: &str,
    description: &str,
    tags: &[String],
) -> Result<PublishedInstruction>
where
    R: EventSource + EventPublisher + ?Sized,
{
    let version = next_version(relay, &keys.public_key_hex());
    let mut event_tags = vec![
        tag("title", title),
        tag("description", description),
        tag("ver", version.clone()),
    ];
    event_tags.extend(tags.iter().map(|t| tag("t", t.clone())));

    let event = UnsignedEvent::new(kind::INSTRUCTION, content, event_tags).sign(keys)?;
    let report = relay.publish(&event)?;
    tracing::info!(id = %event.id, version = %version, "published instruction");

    Ok(PublishedInstruction {
        event_id: event.id,
        title: title.to_string(),
        version,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::MemoryRelay;

    fn instruction(keys: &Keys, title: &str, version: Option<&str>, content: &str) -> Event {
        let mut tags = vec![tag("title", title), tag("description", "how to")];
        if let Some(v) = version {
            tags.push(tag("ver", v));
        }
        UnsignedEvent::new(kind::INSTRUCTION, content, tags)
            .sign(keys)
            .unwrap()
    }

    #[test]
    fn test_get_version_defaults_to_one() {
        let keys = Keys::generate();
        assert_eq!(get_version(&instruction(&keys, "a", None, "")), "1");
        assert_eq!(get_version(&instruction(&keys, "a", Some("4"), "")), "4");
    }

    #[test]
    fn test_find_matches_content_pattern() {
        let keys = Keys::generate();
        let relay = MemoryRelay::with_events(vec![
            instruction(&keys, "Commit style", None, "Use imperative MOOD in subjects"),
            instruction(&keys, "Reviews", None, "Be kind"),
        ]);
        let found = find_instructions(&relay, "imperative\\s+mood", DEFAULT_LIMIT).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(find_instructions(&relay, "review", DEFAULT_LIMIT).unwrap().len(), 1);
        // Not a valid pattern, matched literally.
        assert!(find_instructions(&relay, "kind(", DEFAULT_LIMIT)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_format_instructions() {
        let keys = Keys::generate();
        let events = vec![
            instruction(&keys, "Commit style", Some("3"), ""),
            instruction(&keys, "Reviews", None, ""),
        ];
        assert_eq!(
            format_instructions(&events),
            "1. Commit style (v3): how to\n2. Reviews (v1): how to"
        );
        assert_eq!(format_instructions(&[]), "No instructions found.");
    }

    #[test]
    fn test_next_version_uses_highest_by_author() {
        let keys = Keys::generate();
        let other = Keys::generate();
        let relay = MemoryRelay::with_events(vec![
            instruction(&keys, "a", Some("2"), ""),
            instruction(&keys, "b", Some("7"), ""),
            instruction(&keys, "c", Some("beta"), ""),
            instruction(&other, "d", Some("40"), ""),
        ]);
        assert_eq!(next_version(&relay, &keys.public_key_hex()), "8");
        assert_eq!(next_version(&MemoryRelay::new(), &keys.public_key_hex()), "1");
    }

    #[test]
    fn test_publish_instruction_increments_version() {
        let keys = Keys::generate();
        let relay = MemoryRelay::new();
        let first =
            publish_instruction(&relay, &keys, "body", "Style", "desc", &["git".into()]).unwrap();
        assert_eq!(first.version, "1");
        let second = publish_instruction(&relay, &keys, "body", "Style", "desc", &[]).unwrap();
        assert_eq!(second.version, "2");

        let fetched = fetch_instruction(&relay, &second.event_id).unwrap().unwrap();
        assert_eq!(fetched.content, "body");
        assert_eq!(get_version(&fetched), "2");
        assert!(second.message().contains(&second.event_id));
    }
}
