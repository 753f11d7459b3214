//! Fetching, ranking and caching snippets

use std::time::Instant;

use serde::Deserialize;

use super::{Snippet, SnippetCache};
use crate::db::Database;
use crate::error::Result;
use crate::event::kind;
use crate::rank::{rank_by_tags, TagMatches};
use crate::relay::{EventSource, Filter};
use crate::trace_time;
use crate::users::KnownUsers;

pub const DEFAULT_LIMIT: usize = 500;

/// Search parameters shared by the CLI and the MCP tools
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FindSnippetsParams {
    pub limit: Option<usize>,
    pub since: Option<u64>,
    pub until: Option<u64>,
    /// Names, npubs or hex pubkeys.
    pub authors: Vec<String>,
    pub languages: Vec<String>,
    /// Requested tags; each one is also a ranking pattern.
    pub tags: Vec<String>,
}

impl FindSnippetsParams {
    /// Relay filter for these parameters, or `None` when authors were
    /// requested but none of them could be resolved.
    pub fn to_filter(&self, users: &KnownUsers, db: &Database) -> Result<Option<Filter>> {
        let mut filter = Filter::new()
            .kind(kind::SNIPPET)
            .limit(self.limit.unwrap_or(DEFAULT_LIMIT));
        filter.since = self.since;
        filter.until = self.until;

        if !self.authors.is_empty() {
            for author in &self.authors {
                let pubkeys = users.resolve_identifier(db, author)?;
                if pubkeys.is_empty() {
                    tracing::warn!(author = %author, "unknown author");
                }
                filter.authors.extend(pubkeys);
            }
            if filter.authors.is_empty() {
                return Ok(None);
            }
        }
        if !self.languages.is_empty() {
            filter = filter.tag('l', self.languages.iter().cloned());
        }
        if !self.tags.is_empty() {
            filter = filter.tag('t', self.tags.iter().cloned());
        }
        Ok(Some(filter))
    }
}

/// Fetch snippets, rank them by tag overlap, then persist and cache every
/// fetched snippet. A failed database write is logged, not returned.
pub fn find_snippets(
    source: &(impl EventSource + ?Sized),
    db: &mut Database,
    cache: &mut SnippetCache,
    users: &KnownUsers,
    params: &FindSnippetsParams,
) -> Result<TagMatches<Snippet>> {
    let start = Instant::now();
    let Some(filter) = params.to_filter(users, db)? else {
        tracing::warn!("none of the requested authors are known");
        return Ok(rank_by_tags(Vec::new(), &params.tags));
    };

    let snippets: Vec<Snippet> = source
        .fetch_events(&filter)?
        .iter()
        .map(Snippet::from_event)
        .collect();
    let matches = rank_by_tags(snippets, &params.tags);

    let all: Vec<Snippet> = matches
        .selected
        .iter()
        .chain(matches.other.iter())
        .cloned()
        .collect();
    if !all.is_empty() {
        if let Err(e) = db.upsert_snippets(&all) {
            tracing::error!(error = %e, "failed to save snippets to database");
        }
    }
    cache.extend(&all);

    trace_time!(start, "find_snippets", fetched = all.len());
    Ok(matches)
}

/// Look a snippet up in the cache, then the database, then on relays.
pub fn fetch_snippet(
    source: &(impl EventSource + ?Sized),
    db: &mut Database,
    cache: &mut SnippetCache,
    id: &str,
) -> Result<Option<Snippet>> {
    if let Some(snippet) = cache.get(id) {
        tracing::debug!(id, "snippet served from cache");
        return Ok(Some(snippet.clone()));
    }
    if let Some(snippet) = db.get_snippet(id)? {
        tracing::debug!(id, "snippet served from database");
        cache.insert(snippet.clone());
        return Ok(Some(snippet));
    }

    let filter = Filter::new().kind(kind::SNIPPET).id(id);
    let Some(event) = source.fetch_events(&filter)?.into_iter().next() else {
        return Ok(None);
    };
    let snippet = Snippet::from_event(&event);
    if let Err(e) = db.upsert_snippets(std::slice::from_ref(&snippet)) {
        tracing::error!(error = %e, "failed to save snippet to database");
    }
    cache.insert(snippet.clone());
    Ok(Some(snippet))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{tag, Event, UnsignedEvent};
    use crate::keys::Keys;
    use crate::profile::Profile;
    use crate::relay::MemoryRelay;

    fn snippet_event(keys: &Keys, title: &str, language: &str, tags: &[&str]) -> Event {
        let mut event_tags = vec![tag("name", title), tag("l", language)];
        event_tags.extend(tags.iter().map(|t| tag("t", *t)));
        UnsignedEvent::new(kind::SNIPPET, format!("// {}", title), event_tags)
            .sign(keys)
            .unwrap()
    }

    fn titles(snippets: &[Snippet]) -> Vec<&str> {
        snippets.iter().map(|s| s.title.as_str()).collect()
    }

    #[test]
    fn test_filter_from_params() {
        let db = Database::open_in_memory().unwrap();
        let params = FindSnippetsParams {
            languages: vec!["rust".into()],
            tags: vec!["cli".into()],
            since: Some(5),
            ..Default::default()
        };
        let filter = params.to_filter(&KnownUsers::new(), &db).unwrap().unwrap();
        assert_eq!(filter.kinds, vec![kind::SNIPPET]);
        assert_eq!(filter.limit, Some(DEFAULT_LIMIT));
        assert_eq!(filter.since, Some(5));
        assert_eq!(filter.tags[&'l'], vec!["rust"]);
        assert_eq!(filter.tags[&'t'], vec!["cli"]);
        assert!(filter.authors.is_empty());
    }

    #[test]
    fn test_unknown_authors_give_no_filter() {
        let db = Database::open_in_memory().unwrap();
        let params = FindSnippetsParams {
            authors: vec!["ghost".into()],
            ..Default::default()
        };
        assert!(params.to_filter(&KnownUsers::new(), &db).unwrap().is_none());
    }

    #[test]
    fn test_author_names_resolve_through_profiles() {
        let db = Database::open_in_memory().unwrap();
        let mut users = KnownUsers::new();
        let author = Keys::generate();
        users
            .remember(
                &db,
                &author.public_key_hex(),
                Profile::default(),
                r#"{"name":"pablo"}"#.into(),
            )
            .unwrap();
        let params = FindSnippetsParams {
            authors: vec!["pablo".into(), "ghost".into()],
            ..Default::default()
        };
        let filter = params.to_filter(&users, &db).unwrap().unwrap();
        assert_eq!(filter.authors, vec![author.public_key_hex()]);
    }

    #[test]
    fn test_find_ranks_persists_and_caches() {
        let keys = Keys::generate();
        let relay = MemoryRelay::with_events(vec![
            snippet_event(&keys, "one", "rust", &["x"]),
            snippet_event(&keys, "two", "rust", &["x", "y"]),
            snippet_event(&keys, "three", "go", &["z"]),
        ]);
        let mut db = Database::open_in_memory().unwrap();
        let mut cache = SnippetCache::new();
        let params = FindSnippetsParams {
            tags: vec!["x".into(), "y".into()],
            ..Default::default()
        };

        // The memory relay applies `#t` as an OR filter, like real relays.
        let matches =
            find_snippets(&relay, &mut db, &mut cache, &KnownUsers::new(), &params).unwrap();
        assert_eq!(titles(&matches.selected), vec!["two"]);
        assert_eq!(titles(&matches.other), vec!["one"]);
        assert_eq!(db.snippet_count().unwrap(), 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_find_without_tags_selects_all() {
        let keys = Keys::generate();
        let relay = MemoryRelay::with_events(vec![
            snippet_event(&keys, "one", "rust", &["x"]),
            snippet_event(&keys, "two", "go", &[]),
        ]);
        let mut db = Database::open_in_memory().unwrap();
        let mut cache = SnippetCache::new();
        let matches = find_snippets(
            &relay,
            &mut db,
            &mut cache,
            &KnownUsers::new(),
            &FindSnippetsParams::default(),
        )
        .unwrap();
        assert_eq!(titles(&matches.selected), vec!["one", "two"]);
        assert!(matches.other.is_empty());
    }

    #[test]
    fn test_fetch_snippet_lookup_order() {
        let keys = Keys::generate();
        let event = snippet_event(&keys, "remote", "rust", &[]);
        let relay = MemoryRelay::with_events(vec![event.clone()]);
        let mut db = Database::open_in_memory().unwrap();
        let mut cache = SnippetCache::new();

        let fetched = fetch_snippet(&relay, &mut db, &mut cache, &event.id)
            .unwrap()
            .unwrap();
        assert_eq!(fetched.title, "remote");
        assert!(cache.get(&event.id).is_some());
        assert!(db.get_snippet(&event.id).unwrap().is_some());

        // Served locally once stored, even if the relay forgets it.
        let empty = MemoryRelay::new();
        let mut fresh_cache = SnippetCache::new();
        let again = fetch_snippet(&empty, &mut db, &mut fresh_cache, &event.id)
            .unwrap()
            .unwrap();
        assert_eq!(again, fetched);

        assert!(fetch_snippet(&empty, &mut db, &mut fresh_cache, "missing")
            .unwrap()
            .is_none());
    }
}
