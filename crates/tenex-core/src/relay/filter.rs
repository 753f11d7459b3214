//! Subscription filters

use std::collections::BTreeMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::event::Event;

/// A NIP-01 filter. Tag filters serialise as `"#<letter>": [...]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pub ids: Vec<String>,
    pub authors: Vec<String>,
    pub kinds: Vec<u32>,
    pub since: Option<u64>,
    pub until: Option<u64>,
    pub limit: Option<usize>,
    pub tags: BTreeMap<char, Vec<String>>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(mut self, kind: u32) -> Self {
        self.kinds.push(kind);
        self
    }

    pub fn kinds(mut self, kinds: impl IntoIterator<Item = u32>) -> Self {
        self.kinds.extend(kinds);
        self
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.ids.push(id.into());
        self
    }

    pub fn authors(mut self, authors: impl IntoIterator<Item = String>) -> Self {
        self.authors.extend(authors);
        self
    }

    pub fn since(mut self, since: u64) -> Self {
        self.since = Some(since);
        self
    }

    pub fn until(mut self, until: u64) -> Self {
        self.until = Some(until);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Add values for a single-letter tag filter (`#t`, `#l`, `#e`, ...).
    pub fn tag(mut self, letter: char, values: impl IntoIterator<Item = String>) -> Self {
        self.tags.entry(letter).or_default().extend(values);
        self
    }

    /// Local evaluation, ignoring `limit`.
    pub fn matches(&self, event: &Event) -> bool {
        if !self.ids.is_empty() && !self.ids.contains(&event.id) {
            return false;
        }
        if !self.authors.is_empty() && !self.authors.contains(&event.pubkey) {
            return false;
        }
        if !self.kinds.is_empty() && !self.kinds.contains(&event.kind) {
            return false;
        }
        if self.since.is_some_and(|since| event.created_at < since) {
            return false;
        }
        if self.until.is_some_and(|until| event.created_at > until) {
            return false;
        }
        self.tags.iter().all(|(letter, wanted)| {
            let name = letter.to_string();
            event
                .tag_values(&name)
                .iter()
                .any(|value| wanted.iter().any(|w| w == value))
        })
    }
}

impl Serialize for Filter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if !self.ids.is_empty() {
            map.serialize_entry("ids", &self.ids)?;
        }
        if !self.authors.is_empty() {
            map.serialize_entry("authors", &self.authors)?;
        }
        if !self.kinds.is_empty() {
            map.serialize_entry("kinds", &self.kinds)?;
        }
        if let Some(since) = self.since {
            map.serialize_entry("since", &since)?;
        }
        if let Some(until) = self.until {
            map.serialize_entry("until", &until)?;
        }
        if let Some(limit) = self.limit {
            map.serialize_entry("limit", &limit)?;
        }
        for (letter, values) in &self.tags {
            map.serialize_entry(&format!("#{}", letter), values)?;
        }
        map.end()
    }
}
