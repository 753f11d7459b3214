use crate::error::{Result, TenexError};
use crate::snippet::Snippet;
use rusqlite::{params, OptionalExtension, Row};

const SNIPPET_COLUMNS: &str = "id, title, description, code, language, pubkey, created_at, tags";

fn row_to_snippet(row: &Row<'_>) -> rusqlite::Result<(Snippet, String)> {
    let created_at: i64 = row.get(6)?;
    Ok((
        Snippet {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            code: row.get(3)?,
            language: row.get(4)?,
            pubkey: row.get(5)?,
            created_at: created_at.max(0) as u64,
            tags: Vec::new(),
        },
        row.get(7)?,
    ))
}

fn with_tags((mut snippet, tags_json): (Snippet, String)) -> Snippet {
    snippet.tags = serde_json::from_str(&tags_json).unwrap_or_else(|e| {
        tracing::warn!(id = %snippet.id, error = %e, "unreadable snippet tags");
        Vec::new()
    });
    snippet
}

impl super::Database {
    /// Insert or replace every snippet in one transaction.
    pub fn upsert_snippets(&mut self, snippets: &[Snippet]) -> Result<usize> {
        let tx = self
            .conn
            .transaction()
            .map_err(|e| crate::map_db_err!("start transaction", e))?;
        {
            let mut stmt = tx.prepare_cached(&format!(
                "INSERT OR REPLACE INTO snippets ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                SNIPPET_COLUMNS
            ))?;
            for snippet in snippets {
                let tags = serde_json::to_string(&snippet.tags)?;
                stmt.execute(params![
                    snippet.id,
                    snippet.title,
                    snippet.description,
                    snippet.code,
                    snippet.language,
                    snippet.pubkey,
                    i64::try_from(snippet.created_at).unwrap_or(i64::MAX),
                    tags,
                ])
                .map_err(|e| {
                    TenexError::Database(format!("failed to save snippet {}: {}", snippet.id, e))
                })?;
            }
        }
        tx.commit()
            .map_err(|e| crate::map_db_err!("commit snippets", e))?;
        tracing::debug!(count = snippets.len(), "snippets saved");
        Ok(snippets.len())
    }

    pub fn get_snippet(&self, id: &str) -> Result<Option<Snippet>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {} FROM snippets WHERE id = ?1", SNIPPET_COLUMNS),
                [id],
                row_to_snippet,
            )
            .optional()
            .map_err(|e| crate::map_db_err!("get snippet", e))?;
        Ok(row.map(with_tags))
    }

    /// Most recent snippets first.
    pub fn list_snippets(&self, limit: usize) -> Result<Vec<Snippet>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM snippets ORDER BY created_at DESC, id LIMIT ?1",
            SNIPPET_COLUMNS
        ))?;
        let rows = stmt
            .query_map([i64::try_from(limit).unwrap_or(i64::MAX)], row_to_snippet)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| crate::map_db_err!("list snippets", e))?;
        Ok(rows.into_iter().map(with_tags).collect())
    }

    pub fn snippet_count(&self) -> Result<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM snippets", [], |r| r.get(0))
            .map_err(|e| crate::map_db_err!("count snippets", e))
    }
}
