// UserRepository - account records. Password hashing happens upstream;
// this layer only stores the hash it is handed.

use anyhow::{anyhow, Result};
use rusqlite::{params, Connection, OptionalExtension};

use crate::database::{current_timestamp, User};

/// Repository responsible for user accounts
pub trait UserRepository {
    fn insert(&self, username: &str, password_hash: &str) -> Result<i64>;
    fn find_by_id(&self, id: i64) -> Result<Option<User>>;
    fn find_by_username(&self, username: &str) -> Result<Option<User>>;
}

/// SQLite implementation of UserRepository
pub struct SqliteUserRepository<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteUserRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
        Ok(User {
            id: Some(row.get(0)?),
            username: row.get(1)?,
            password_hash: row.get(2)?,
            created_at: row.get(3)?,
        })
    }
}

impl<'a> UserRepository for SqliteUserRepository<'a> {
    fn insert(&self, username: &str, password_hash: &str) -> Result<i64> {
        if username.trim().is_empty() {
            return Err(anyhow!("username must not be empty"));
        }
        if self.find_by_username(username)?.is_some() {
            return Err(anyhow!("username already taken: {username}"));
        }

        self.conn.execute(
            "INSERT INTO users (username, password_hash, created_at) VALUES (?1, ?2, ?3)",
            params![username, password_hash, current_timestamp()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        let user = self
            .conn
            .query_row(
                "SELECT id, username, password_hash, created_at FROM users WHERE id = ?1",
                [id],
                Self::user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = self
            .conn
            .query_row(
                "SELECT id, username, password_hash, created_at FROM users WHERE username = ?1",
                [username],
                Self::user_from_row,
            )
            .optional()?;
        Ok(user)
    }
}
