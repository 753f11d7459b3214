//! Tag-overlap ranking of fetched results
//!
//! Each requested tag is a case-insensitive regex pattern. An item's match
//! count is the number of requested patterns that match at least one of its
//! own tags. Items tied for the batch maximum are "selected"; everything else
//! is a partial match. With no requested tags every item counts as 1, so an
//! untagged search selects everything.

use regex::{Regex, RegexBuilder};
use serde::Serialize;

/// Anything that carries free-text topic tags.
pub trait Tagged {
    fn topic_tags(&self) -> Vec<&str>;
}

/// Ranked partition of a result set, both halves in fetch order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagMatches<T> {
    pub selected: Vec<T>,
    pub other: Vec<T>,
    pub max_count: usize,
}

impl<T> TagMatches<T> {
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty() && self.other.is_empty()
    }

    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> TagMatches<U> {
        TagMatches {
            selected: self.selected.into_iter().map(&mut f).collect(),
            other: self.other.into_iter().map(&mut f).collect(),
            max_count: self.max_count,
        }
    }

    /// Both partitions, selected first.
    pub fn into_all(self) -> Vec<T> {
        let mut all = self.selected;
        all.extend(self.other);
        all
    }
}

/// Compiled set of requested tag patterns
#[derive(Debug, Clone)]
pub struct TagQuery {
    patterns: Vec<Regex>,
}

impl TagQuery {
    /// Compile requested tags. A tag that is not a valid pattern is matched
    /// literally (still case-insensitive).
    pub fn new(requested: &[String]) -> Self {
        let patterns = requested
            .iter()
            .filter_map(|tag| {
                compile(tag).or_else(|| {
                    tracing::debug!(tag = %tag, "tag is not a valid pattern, matching literally");
                    compile(&regex::escape(tag))
                })
            })
            .collect();
        Self { patterns }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Number of requested patterns matching at least one of `tags`.
    pub fn match_count(&self, tags: &[&str]) -> usize {
        if self.patterns.is_empty() {
            return 1;
        }
        self.patterns
            .iter()
            .filter(|pattern| tags.iter().any(|tag| pattern.is_match(tag)))
            .count()
    }
}

fn compile(pattern: &str) -> Option<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .ok()
}

/// Partition `items` by tag-overlap count against `requested`.
pub fn rank_by_tags<T: Tagged>(items: Vec<T>, requested: &[String]) -> TagMatches<T> {
    let query = TagQuery::new(requested);
    let counts: Vec<usize> = items
        .iter()
        .map(|item| query.match_count(&item.topic_tags()))
        .collect();
    let max_count = counts.iter().copied().max().unwrap_or(0);

    let mut selected = Vec::new();
    let mut other = Vec::new();
    for (item, count) in items.into_iter().zip(counts) {
        if count == max_count {
            selected.push(item);
        } else {
            other.push(item);
        }
    }

    tracing::debug!(
        selected = selected.len(),
        other = other.len(),
        max_count,
        "rank_by_tags"
    );

    TagMatches {
        selected,
        other,
        max_count,
    }
}
