// Post search engine: multi-tag AND queries over the post/tag relation

use anyhow::Result;
use log::debug;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::database::{PostView, SortOrder};
use crate::repositories::post_repository::SqlitePostRepository;
use crate::repositories::tag_repository::SqliteTagRepository;
use crate::repositories::{PostRepository, TagRepository};
use crate::tag_normalizer::normalize_token;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SearchResult {
    pub posts: Vec<PostView>,
    pub total_count: u32,
}

impl SearchResult {
    fn empty() -> Self {
        SearchResult {
            posts: Vec::new(),
            total_count: 0,
        }
    }
}

/// Search posts by tag names with AND semantics.
///
/// Names are re-normalized and deduplicated, so both canonical and raw forms
/// are accepted. An empty name list matches every post. A name with no
/// vocabulary entry short-circuits to an empty result: an AND containing an
/// impossible term cannot match.
pub fn search(
    conn: &Connection,
    tag_names: &[String],
    sort: SortOrder,
    page: u32,
    page_size: u32,
) -> Result<SearchResult> {
    let mut seen = HashSet::new();
    let names: Vec<String> = tag_names
        .iter()
        .filter_map(|name| normalize_token(name))
        .filter(|name| seen.insert(name.clone()))
        .collect();

    let post_repo = SqlitePostRepository::new(conn);

    if names.is_empty() {
        let (posts, total_count) = post_repo.find_all_paginated(sort, page, page_size)?;
        return Ok(SearchResult { posts, total_count });
    }

    let tag_ids = SqliteTagRepository::new(conn).lookup_ids(&names)?;
    if tag_ids.len() < names.len() {
        debug!("search short-circuit: {} of {} tags unknown", names.len() - tag_ids.len(), names.len());
        return Ok(SearchResult::empty());
    }

    let (posts, total_count) =
        post_repo.search_by_tag_ids_paginated(&tag_ids, sort, page, page_size)?;
    Ok(SearchResult { posts, total_count })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use crate::repositories::post_tag_repository::SqlitePostTagRepository;
    use crate::repositories::PostTagRepository;
    use tempfile::NamedTempFile;

    fn create_test_db() -> (NamedTempFile, Database) {
        let db_file = NamedTempFile::new().unwrap();
        let db = Database::new(&db_file.path().to_string_lossy()).unwrap();
        (db_file, db)
    }

    fn names(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn seed(db: &Database) -> (i64, i64) {
        db.connection()
            .execute(
                "INSERT INTO users (username, password_hash, created_at)
                 VALUES ('alice', 'h', '2024-01-01 00:00:00.000')",
                [],
            )
            .unwrap();
        let post_repo = SqlitePostRepository::new(db.connection());
        let p1 = post_repo.insert(1, "p1.jpg").unwrap();
        let p2 = post_repo.insert(1, "p2.jpg").unwrap();

        let tag_repo = SqliteTagRepository::new(db.connection());
        let pt_repo = SqlitePostTagRepository::new(db.connection());
        let ids = tag_repo
            .resolve_or_create(&names(&["#cat", "#dog"]))
            .unwrap();
        pt_repo.replace_tags(p1, &ids).unwrap();
        pt_repo.replace_tags(p2, &ids[0..1]).unwrap();
        (p1, p2)
    }

    #[test]
    fn test_unknown_tag_short_circuits_to_empty() {
        let (_db_file, db) = create_test_db();
        seed(&db);

        let result = search(
            db.connection(),
            &names(&["#cat", "#unicorn"]),
            SortOrder::Newest,
            1,
            10,
        )
        .unwrap();
        assert_eq!(result.total_count, 0);
        assert!(result.posts.is_empty());
    }

    #[test]
    fn test_empty_query_matches_everything() {
        let (_db_file, db) = create_test_db();
        seed(&db);

        let result = search(db.connection(), &[], SortOrder::Newest, 1, 10).unwrap();
        assert_eq!(result.total_count, 2);
    }

    #[test]
    fn test_accepts_raw_names_and_duplicates() {
        let (_db_file, db) = create_test_db();
        let (p1, _p2) = seed(&db);

        // Bare, mixed-case, duplicated input resolves like canonical input
        let result = search(
            db.connection(),
            &names(&["Cat", "#DOG", "cat"]),
            SortOrder::Newest,
            1,
            10,
        )
        .unwrap();
        assert_eq!(result.total_count, 1);
        assert_eq!(result.posts[0].id, p1);
    }

    #[test]
    fn test_blank_names_are_absorbed() {
        let (_db_file, db) = create_test_db();
        seed(&db);

        // Tokens that normalize to nothing act as "no tags"
        let result = search(
            db.connection(),
            &names(&["", "  ", "###"]),
            SortOrder::Newest,
            1,
            10,
        )
        .unwrap();
        assert_eq!(result.total_count, 2);
    }
}
