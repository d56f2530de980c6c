// Attachment manager: keeps the post<->tag relation in step with the
// tag field of a post's latest create/edit.

use anyhow::Result;
use log::debug;
use rusqlite::Connection;

use crate::repositories::post_tag_repository::SqlitePostTagRepository;
use crate::repositories::tag_repository::SqliteTagRepository;
use crate::repositories::{PostTagRepository, TagRepository};
use crate::tag_normalizer::parse_tag_field;

/// Replace a post's tag set from the raw tag field text.
///
/// Tokens without an explicit marker are prose and get dropped; surviving
/// names are resolved (created on first sight) and the relation is replaced
/// wholesale. An empty parsed set clears the relation — preserving old tags
/// on a blank edit is the caller's policy, not this function's.
///
/// Returns the canonical names that were applied.
pub fn set_post_tags(conn: &Connection, post_id: i64, raw_tag_field: &str) -> Result<Vec<String>> {
    let names = parse_tag_field(raw_tag_field);
    let tag_ids = SqliteTagRepository::new(conn).resolve_or_create(&names)?;
    SqlitePostTagRepository::new(conn).replace_tags(post_id, &tag_ids)?;
    debug!("post {post_id} now has {} tags", names.len());
    Ok(names)
}

/// Current canonical tag names of a post, name-ordered
pub fn tags_of_post(conn: &Connection, post_id: i64) -> Result<Vec<String>> {
    SqlitePostTagRepository::new(conn).tags_for_post(post_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use tempfile::NamedTempFile;

    fn create_test_db() -> (NamedTempFile, Database) {
        let db_file = NamedTempFile::new().unwrap();
        let db = Database::new(&db_file.path().to_string_lossy()).unwrap();
        (db_file, db)
    }

    fn seed_post(db: &Database) -> i64 {
        db.connection()
            .execute_batch(
                "INSERT INTO users (username, password_hash, created_at) VALUES ('u', 'h', '2024-01-01 00:00:00.000');
                 INSERT INTO posts (user_id, image_path, created_at) VALUES (1, 'a.jpg', '2024-01-01 00:00:00.000');",
            )
            .unwrap();
        db.connection().last_insert_rowid()
    }

    #[test]
    fn test_set_tags_from_field_text() {
        let (_db_file, db) = create_test_db();
        let post_id = seed_post(&db);

        let applied = set_post_tags(db.connection(), post_id, "trip photo #Beach ##Sunset")
            .expect("Failed to set tags");
        assert_eq!(applied, vec!["#beach", "#sunset"]);
        assert_eq!(
            tags_of_post(db.connection(), post_id).unwrap(),
            vec!["#beach", "#sunset"]
        );
    }

    #[test]
    fn test_edit_replaces_and_keeps_vocabulary() {
        let (_db_file, db) = create_test_db();
        let post_id = seed_post(&db);

        set_post_tags(db.connection(), post_id, "#cat #dog").unwrap();
        set_post_tags(db.connection(), post_id, "#bird").unwrap();

        assert_eq!(
            tags_of_post(db.connection(), post_id).unwrap(),
            vec!["#bird"]
        );

        // cat/dog rows for the post are gone, the vocabulary entries are not
        let tag_count: i64 = db
            .connection()
            .query_row("SELECT COUNT(*) FROM tags", [], |row| row.get(0))
            .unwrap();
        assert_eq!(tag_count, 3);
    }

    #[test]
    fn test_blank_field_clears_relation() {
        let (_db_file, db) = create_test_db();
        let post_id = seed_post(&db);

        set_post_tags(db.connection(), post_id, "#cat").unwrap();
        let applied = set_post_tags(db.connection(), post_id, "no markers here").unwrap();

        assert!(applied.is_empty());
        assert!(tags_of_post(db.connection(), post_id).unwrap().is_empty());
    }

    #[test]
    fn test_resolving_is_idempotent_across_posts() {
        let (_db_file, db) = create_test_db();
        let p1 = seed_post(&db);
        db.connection()
            .execute(
                "INSERT INTO posts (user_id, image_path, created_at)
                 VALUES (1, 'b.jpg', '2024-01-01 00:00:01.000')",
                [],
            )
            .unwrap();
        let p2 = db.connection().last_insert_rowid();

        set_post_tags(db.connection(), p1, "#cat").unwrap();
        set_post_tags(db.connection(), p2, "#CAT").unwrap();

        let tag_count: i64 = db
            .connection()
            .query_row("SELECT COUNT(*) FROM tags", [], |row| row.get(0))
            .unwrap();
        assert_eq!(tag_count, 1);
    }
}
