// TagRepository - owns the tag vocabulary and its usage ranking

use crate::database::TagSuggestion;
use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension};

/// Repository responsible for the tag vocabulary
pub trait TagRepository {
    /// Resolve names to ids, creating vocabulary entries on first sight.
    /// Order preserving, one id per input name.
    fn resolve_or_create(&self, names: &[String]) -> Result<Vec<i64>>;

    /// Resolve names to ids, silently omitting names with no entry.
    fn lookup_ids(&self, names: &[String]) -> Result<Vec<i64>>;

    /// Vocabulary entries whose name starts with `prefix`, ranked by live
    /// usage count descending (id ascending on ties), truncated to `limit`.
    fn prefix_search(&self, prefix: &str, limit: u32) -> Result<Vec<TagSuggestion>>;

    /// Most-used tags, same ranking as prefix_search with no prefix filter.
    fn popular(&self, limit: u32) -> Result<Vec<TagSuggestion>>;
}

/// SQLite implementation of TagRepository
pub struct SqliteTagRepository<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteTagRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn ranked_query(&self, where_clause: &str) -> String {
        format!(
            "SELECT t.name,
                    (SELECT COUNT(*) FROM post_tags pt WHERE pt.tag_id = t.id) AS usage_count
             FROM tags t
             {where_clause}
             ORDER BY usage_count DESC, t.id ASC
             LIMIT ?"
        )
    }
}

/// Escape LIKE wildcards so a prefix is matched literally
fn escape_like_prefix(prefix: &str) -> String {
    let escaped = prefix
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("{escaped}%")
}

impl<'a> TagRepository for SqliteTagRepository<'a> {
    fn resolve_or_create(&self, names: &[String]) -> Result<Vec<i64>> {
        // INSERT OR IGNORE followed by a re-read: the unique constraint on
        // name absorbs concurrent duplicate creation without extra rows.
        let mut ids = Vec::with_capacity(names.len());
        for name in names {
            self.conn
                .execute("INSERT OR IGNORE INTO tags (name) VALUES (?1)", [name])?;
            let id: i64 =
                self.conn
                    .query_row("SELECT id FROM tags WHERE name = ?1", [name], |row| {
                        row.get(0)
                    })?;
            ids.push(id);
        }
        Ok(ids)
    }

    fn lookup_ids(&self, names: &[String]) -> Result<Vec<i64>> {
        let mut stmt = self.conn.prepare("SELECT id FROM tags WHERE name = ?1")?;
        let mut ids = Vec::new();
        for name in names {
            let id: Option<i64> = stmt.query_row([name], |row| row.get(0)).optional()?;
            if let Some(id) = id {
                ids.push(id);
            }
        }
        Ok(ids)
    }

    fn prefix_search(&self, prefix: &str, limit: u32) -> Result<Vec<TagSuggestion>> {
        let query = self.ranked_query("WHERE t.name LIKE ?1 ESCAPE '\\'");
        let mut stmt = self.conn.prepare(&query)?;

        let pattern = escape_like_prefix(prefix);
        let suggestion_iter = stmt.query_map(params![pattern, limit], |row| {
            Ok(TagSuggestion {
                name: row.get(0)?,
                usage_count: row.get(1)?,
            })
        })?;

        let mut suggestions = Vec::new();
        for suggestion in suggestion_iter {
            suggestions.push(suggestion?);
        }
        Ok(suggestions)
    }

    fn popular(&self, limit: u32) -> Result<Vec<TagSuggestion>> {
        let query = self.ranked_query("");
        let mut stmt = self.conn.prepare(&query)?;

        let suggestion_iter = stmt.query_map([limit], |row| {
            Ok(TagSuggestion {
                name: row.get(0)?,
                usage_count: row.get(1)?,
            })
        })?;

        let mut suggestions = Vec::new();
        for suggestion in suggestion_iter {
            suggestions.push(suggestion?);
        }
        Ok(suggestions)
    }
}
