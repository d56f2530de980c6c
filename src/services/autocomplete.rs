// Autocomplete over the tag vocabulary, called on every keystroke.
// Read-only and side-effect free.

use anyhow::Result;
use rusqlite::Connection;

use crate::config::tags::{MARKER, SUGGESTION_LIMIT};
use crate::database::TagSuggestion;
use crate::repositories::tag_repository::SqliteTagRepository;
use crate::repositories::TagRepository;

/// Suggest tags for a typed prefix, ranked by usage.
///
/// Leading markers are stripped and the prefix lower-cased before matching;
/// an empty prefix yields no suggestions rather than the whole vocabulary.
pub fn suggest(conn: &Connection, raw_prefix: &str) -> Result<Vec<TagSuggestion>> {
    let body = raw_prefix
        .trim()
        .trim_start_matches(MARKER)
        .to_lowercase();
    if body.is_empty() {
        return Ok(Vec::new());
    }

    SqliteTagRepository::new(conn).prefix_search(&format!("{MARKER}{body}"), SUGGESTION_LIMIT)
}

/// Most-used tags for the landing page tag cloud
pub fn popular_tags(conn: &Connection, limit: u32) -> Result<Vec<TagSuggestion>> {
    SqliteTagRepository::new(conn).popular(limit)
}
