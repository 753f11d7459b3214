use std::collections::HashMap;

use super::Snippet;

/// Snippets seen during this process, by id
#[derive(Debug, Clone, Default)]
pub struct SnippetCache {
    by_id: HashMap<String, Snippet>,
}

impl SnippetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, snippet: Snippet) {
        self.by_id.insert(snippet.id.clone(), snippet);
    }

    pub fn extend<'a>(&mut self, snippets: impl IntoIterator<Item = &'a Snippet>) {
        for snippet in snippets {
            self.insert(snippet.clone());
        }
    }

    pub fn get(&self, id: &str) -> Option<&Snippet> {
        self.by_id.get(id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
