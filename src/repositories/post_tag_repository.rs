// PostTagRepository - owns the post<->tag relation

use anyhow::Result;
use rusqlite::{params, Connection};
use std::collections::HashMap;

/// Repository responsible for the post-tag relation
pub trait PostTagRepository {
    /// Full replacement of a post's tag set. Delete-then-insert runs inside
    /// one transaction so readers never observe a partial set. An empty
    /// `tag_ids` clears the relation; keeping old tags on a blank edit is the
    /// caller's decision.
    fn replace_tags(&self, post_id: i64, tag_ids: &[i64]) -> Result<()>;

    /// Canonical tag names of one post, name-ordered.
    fn tags_for_post(&self, post_id: i64) -> Result<Vec<String>>;

    /// Canonical tag names for a batch of posts, one query, keyed by post id.
    fn tags_for_posts(&self, post_ids: &[i64]) -> Result<HashMap<i64, Vec<String>>>;
}

/// SQLite implementation of PostTagRepository
pub struct SqlitePostTagRepository<'a> {
    conn: &'a Connection,
}

impl<'a> SqlitePostTagRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl<'a> PostTagRepository for SqlitePostTagRepository<'a> {
    fn replace_tags(&self, post_id: i64, tag_ids: &[i64]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;

        tx.execute("DELETE FROM post_tags WHERE post_id = ?1", [post_id])?;
        for tag_id in tag_ids {
            // Input is already deduplicated; OR IGNORE guards the pair
            // uniqueness constraint anyway
            tx.execute(
                "INSERT OR IGNORE INTO post_tags (post_id, tag_id) VALUES (?1, ?2)",
                params![post_id, tag_id],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    fn tags_for_post(&self, post_id: i64) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT t.name
             FROM tags t
             INNER JOIN post_tags pt ON t.id = pt.tag_id
             WHERE pt.post_id = ?1
             ORDER BY t.name ASC",
        )?;

        let name_iter = stmt.query_map([post_id], |row| row.get(0))?;

        let mut names = Vec::new();
        for name in name_iter {
            names.push(name?);
        }
        Ok(names)
    }

    fn tags_for_posts(&self, post_ids: &[i64]) -> Result<HashMap<i64, Vec<String>>> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let placeholders: Vec<String> = post_ids.iter().map(|_| "?".to_string()).collect();
        let query = format!(
            "SELECT pt.post_id, t.name
             FROM post_tags pt
             INNER JOIN tags t ON t.id = pt.tag_id
             WHERE pt.post_id IN ({})
             ORDER BY pt.post_id, t.name ASC",
            placeholders.join(",")
        );

        let mut stmt = self.conn.prepare(&query)?;
        let params: Vec<&dyn rusqlite::ToSql> =
            post_ids.iter().map(|id| id as &dyn rusqlite::ToSql).collect();

        let row_iter = stmt.query_map(&params[..], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut by_post: HashMap<i64, Vec<String>> = HashMap::new();
        for row in row_iter {
            let (post_id, name) = row?;
            by_post.entry(post_id).or_default().push(name);
        }
        Ok(by_post)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use crate::repositories::tag_repository::{SqliteTagRepository, TagRepository};
    use tempfile::NamedTempFile;

    fn create_test_db() -> (NamedTempFile, Database) {
        let db_file = NamedTempFile::new().unwrap();
        let db = Database::new(&db_file.path().to_string_lossy()).unwrap();
        (db_file, db)
    }

    fn create_test_post(db: &Database, image: &str) -> i64 {
        db.connection()
            .execute(
                "INSERT OR IGNORE INTO users (username, password_hash, created_at)
                 VALUES ('u', 'h', '2024-01-01 00:00:00.000')",
                [],
            )
            .unwrap();
        db.connection()
            .execute(
                "INSERT INTO posts (user_id, image_path, created_at)
                 VALUES (1, ?1, '2024-01-01 00:00:00.000')",
                [image],
            )
            .unwrap();
        db.connection().last_insert_rowid()
    }

    fn create_tags(db: &Database, raw: &[&str]) -> Vec<i64> {
        let names: Vec<String> = raw.iter().map(|s| s.to_string()).collect();
        SqliteTagRepository::new(db.connection())
            .resolve_or_create(&names)
            .unwrap()
    }

    #[test]
    fn test_replace_tags_is_full_replacement() {
        let (_db_file, db) = create_test_db();
        let repo = SqlitePostTagRepository::new(db.connection());

        let post_id = create_test_post(&db, "p1.jpg");
        let ids = create_tags(&db, &["#cat", "#dog", "#bird"]);

        repo.replace_tags(post_id, &ids[0..2])
            .expect("Failed to set initial tags");
        assert_eq!(repo.tags_for_post(post_id).unwrap(), vec!["#cat", "#dog"]);

        repo.replace_tags(post_id, &ids[2..3])
            .expect("Failed to replace tags");
        assert_eq!(repo.tags_for_post(post_id).unwrap(), vec!["#bird"]);

        // Old vocabulary entries survive the replacement
        let tag_count: i64 = db
            .connection()
            .query_row("SELECT COUNT(*) FROM tags", [], |row| row.get(0))
            .unwrap();
        assert_eq!(tag_count, 3);
    }

    #[test]
    fn test_replace_with_empty_set_clears_relation() {
        let (_db_file, db) = create_test_db();
        let repo = SqlitePostTagRepository::new(db.connection());

        let post_id = create_test_post(&db, "p1.jpg");
        let ids = create_tags(&db, &["#cat"]);

        repo.replace_tags(post_id, &ids).unwrap();
        repo.replace_tags(post_id, &[]).unwrap();

        assert!(repo.tags_for_post(post_id).unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_pair_inserts_are_ignored() {
        let (_db_file, db) = create_test_db();
        let repo = SqlitePostTagRepository::new(db.connection());

        let post_id = create_test_post(&db, "p1.jpg");
        let ids = create_tags(&db, &["#cat"]);
        let doubled = vec![ids[0], ids[0]];

        repo.replace_tags(post_id, &doubled).unwrap();

        let pair_count: i64 = db
            .connection()
            .query_row(
                "SELECT COUNT(*) FROM post_tags WHERE post_id = ?1",
                [post_id],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(pair_count, 1);
    }

    #[test]
    fn test_tags_for_posts_batches_by_post_id() {
        let (_db_file, db) = create_test_db();
        let repo = SqlitePostTagRepository::new(db.connection());

        let p1 = create_test_post(&db, "p1.jpg");
        let p2 = create_test_post(&db, "p2.jpg");
        let ids = create_tags(&db, &["#cat", "#dog"]);

        repo.replace_tags(p1, &ids).unwrap();
        repo.replace_tags(p2, &ids[0..1]).unwrap();

        let by_post = repo.tags_for_posts(&[p1, p2]).unwrap();
        assert_eq!(by_post[&p1], vec!["#cat", "#dog"]);
        assert_eq!(by_post[&p2], vec!["#cat"]);

        assert!(repo.tags_for_posts(&[]).unwrap().is_empty());
    }
}
