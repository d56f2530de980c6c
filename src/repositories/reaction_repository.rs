// ReactionRepository - like/favorite presence toggles

use anyhow::Result;
use rusqlite::{params, Connection};

/// Repository responsible for like and favorite relations.
/// Presence of a (user, post) row means the reaction is active; the pair
/// uniqueness constraint keeps toggles idempotent.
pub trait ReactionRepository {
    /// Toggle a like; returns true when the like is now active.
    fn toggle_like(&self, user_id: i64, post_id: i64) -> Result<bool>;

    /// Toggle a favorite; returns true when the favorite is now active.
    fn toggle_favorite(&self, user_id: i64, post_id: i64) -> Result<bool>;

    fn like_count(&self, post_id: i64) -> Result<i64>;

    /// Post ids the user has favorited, most recent rowid first.
    fn favorite_post_ids(&self, user_id: i64) -> Result<Vec<i64>>;
}

/// SQLite implementation of ReactionRepository
pub struct SqliteReactionRepository<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteReactionRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn toggle(&self, table: &str, user_id: i64, post_id: i64) -> Result<bool> {
        let tx = self.conn.unchecked_transaction()?;

        let inserted = tx.execute(
            &format!("INSERT OR IGNORE INTO {table} (user_id, post_id) VALUES (?1, ?2)"),
            params![user_id, post_id],
        )?;
        let active = if inserted > 0 {
            true
        } else {
            tx.execute(
                &format!("DELETE FROM {table} WHERE user_id = ?1 AND post_id = ?2"),
                params![user_id, post_id],
            )?;
            false
        };

        tx.commit()?;
        Ok(active)
    }
}

impl<'a> ReactionRepository for SqliteReactionRepository<'a> {
    fn toggle_like(&self, user_id: i64, post_id: i64) -> Result<bool> {
        self.toggle("likes", user_id, post_id)
    }

    fn toggle_favorite(&self, user_id: i64, post_id: i64) -> Result<bool> {
        self.toggle("favorites", user_id, post_id)
    }

    fn like_count(&self, post_id: i64) -> Result<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM likes WHERE post_id = ?1",
            [post_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn favorite_post_ids(&self, user_id: i64) -> Result<Vec<i64>> {
        let mut stmt = self.conn.prepare(
            "SELECT post_id FROM favorites WHERE user_id = ?1 ORDER BY rowid DESC",
        )?;
        let id_iter = stmt.query_map([user_id], |row| row.get(0))?;

        let mut ids = Vec::new();
        for id in id_iter {
            ids.push(id?);
        }
        Ok(ids)
    }
}
