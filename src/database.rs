use chrono::Utc;
use log::debug;
use rusqlite::{Connection, Result};
use serde::{Deserialize, Serialize};

use crate::config::database::TIMESTAMP_FORMAT;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    pub id: Option<i64>,
    pub username: String,
    pub password_hash: String,
    pub created_at: String,
}

/// Autocomplete / ranking entry. usage_count is the live cardinality of the
/// post_tags relation for the tag, never a stored counter.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TagSuggestion {
    pub name: String,
    pub usage_count: i64,
}

/// A post enriched for the presentation layer
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PostView {
    pub id: i64,
    pub owner_name: String,
    pub image_path: String,
    pub created_at: String,
    pub like_count: i64,
    pub tag_names: Vec<String>,
}

/// Result ordering for post listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Newest,
    Oldest,
    MostLiked,
}

impl SortOrder {
    /// Lenient parse of the transport sort key; unknown values fall back to
    /// newest-first.
    pub fn parse(raw: &str) -> Self {
        use crate::config::search::{SORT_MOST_LIKED, SORT_OLDEST};
        match raw.trim().to_lowercase().as_str() {
            SORT_OLDEST => SortOrder::Oldest,
            SORT_MOST_LIKED | "mostliked" | "most-liked" => SortOrder::MostLiked,
            _ => SortOrder::Newest,
        }
    }
}

/// Current UTC time in the column format used by created_at
pub fn current_timestamp() -> String {
    Utc::now().format(TIMESTAMP_FORMAT).to_string()
}

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON")?;
        let db = Database { conn };
        db.initialize_schema()?;
        debug!("database schema ready at {db_path}");
        Ok(db)
    }

    /// Borrow the underlying connection for repository construction
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn initialize_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS posts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                image_path TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS tags (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT UNIQUE NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS post_tags (
                post_id INTEGER NOT NULL,
                tag_id INTEGER NOT NULL,
                FOREIGN KEY (post_id) REFERENCES posts (id) ON DELETE CASCADE,
                FOREIGN KEY (tag_id) REFERENCES tags (id) ON DELETE CASCADE,
                UNIQUE(post_id, tag_id)
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS likes (
                user_id INTEGER NOT NULL,
                post_id INTEGER NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE,
                FOREIGN KEY (post_id) REFERENCES posts (id) ON DELETE CASCADE,
                UNIQUE(user_id, post_id)
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS favorites (
                user_id INTEGER NOT NULL,
                post_id INTEGER NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE,
                FOREIGN KEY (post_id) REFERENCES posts (id) ON DELETE CASCADE,
                UNIQUE(user_id, post_id)
            )",
            [],
        )?;

        Ok(())
    }
}
