//! Text rendering of snippets for terminal and MCP output

use super::Snippet;
use crate::format::iso_timestamp;
use crate::rank::TagMatches;
use crate::users::KnownUsers;

const SNIPPET_SEPARATOR: &str = "\n\n---\n\n";
const LIST_SEPARATOR: &str = "\n\n------------------\n\n";
const PARTIAL_MATCHES_INTRO: &str = "\n\nSome other events not included in this result since they had less in common with your search, here is a list of the events that had partial matches:\n\n";

/// Full snippets, code included, one `Key: value` block each.
pub fn format_snippets(snippets: &[Snippet], users: &KnownUsers) -> String {
    snippets
        .iter()
        .map(|snippet| {
            let mut lines = vec![
                format!("ID: {}", snippet.id),
                format!("Title: {}", snippet.title),
                format!("Description: {}", snippet.description),
                format!("Language: {}", snippet.language),
                format!("Tags: {}", snippet.tags.join(", ")),
                format!("Code: {}", snippet.code),
                format!("Date: {}", iso_timestamp(snippet.created_at)),
            ];
            if let Some(name) = users.name(&snippet.pubkey) {
                lines.push(format!("Author: {}", name));
            }
            lines.join("\n")
        })
        .collect::<Vec<_>>()
        .join(SNIPPET_SEPARATOR)
}

/// Short bullet list of the snippets that lost the ranking.
pub fn format_partial_matches(snippets: &[Snippet]) -> String {
    if snippets.is_empty() {
        return String::new();
    }
    let bullets: Vec<String> = snippets
        .iter()
        .map(|s| {
            format!(
                " * {}:\n   Tags: {} (ID: {})",
                s.title,
                s.tags.join(", "),
                s.id
            )
        })
        .collect();
    format!("{}{}", PARTIAL_MATCHES_INTRO, bullets.join("\n"))
}

/// Metadata without the code body.
pub fn to_metadata_string(snippet: &Snippet, users: &KnownUsers) -> String {
    let mut lines = vec![
        format!("ID: {}", snippet.id),
        format!("Title: {}", snippet.title),
        format!("Description: {}", snippet.description),
        format!("Language: {}", snippet.language),
        format!("Tags: {}", snippet.tags.join(", ")),
        format!("Created: {}", iso_timestamp(snippet.created_at)),
        format!("Pubkey: {}", snippet.pubkey),
    ];
    if let Some(name) = users.name(&snippet.pubkey) {
        lines.push(format!("Author: {}", name));
    }
    lines.join("\n")
}

/// `find_snippets` result text.
pub fn format_find_result(matches: &TagMatches<Snippet>, users: &KnownUsers) -> String {
    if matches.selected.is_empty() {
        return "No code snippets found matching the criteria.".to_string();
    }
    format!(
        "Found {} code snippets:\n\n{}{}",
        matches.selected.len(),
        format_snippets(&matches.selected, users),
        format_partial_matches(&matches.other)
    )
}

/// `list_snippets` result text: metadata only, partial matches appended.
pub fn format_snippet_list(matches: &TagMatches<Snippet>, users: &KnownUsers) -> String {
    let render = |snippets: &[Snippet]| {
        snippets
            .iter()
            .map(|s| to_metadata_string(s, users))
            .collect::<Vec<_>>()
            .join(LIST_SEPARATOR)
    };

    let mut list = render(&matches.selected);
    if !matches.other.is_empty() {
        list.push_str(PARTIAL_MATCHES_INTRO);
        list.push_str(&render(&matches.other));
    }
    if list.is_empty() {
        return "No snippets found".to_string();
    }
    list
}
