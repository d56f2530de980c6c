// PostRepository - post CRUD and the tag AND-search

use anyhow::Result;
use rusqlite::{Connection, OptionalExtension};
use std::collections::HashMap;

use crate::database::{current_timestamp, PostView, SortOrder};
use crate::repositories::post_tag_repository::{PostTagRepository, SqlitePostTagRepository};

/// Repository responsible for posts
pub trait PostRepository {
    fn insert(&self, user_id: i64, image_path: &str) -> Result<i64>;
    fn owner_of(&self, post_id: i64) -> Result<Option<i64>>;
    fn delete(&self, post_id: i64) -> Result<bool>;
    fn find_view_by_id(&self, post_id: i64) -> Result<Option<PostView>>;

    /// Enriched views for a set of post ids, returned in the order the ids
    /// were given; unknown ids are omitted.
    fn find_views_by_ids(&self, post_ids: &[i64]) -> Result<Vec<PostView>>;

    /// All posts, sorted and paginated, with the total post count.
    fn find_all_paginated(
        &self,
        sort: SortOrder,
        page: u32,
        page_size: u32,
    ) -> Result<(Vec<PostView>, u32)>;

    /// Posts tagged with every one of `tag_ids` (AND semantics), sorted and
    /// paginated, with the total matching count.
    fn search_by_tag_ids_paginated(
        &self,
        tag_ids: &[i64],
        sort: SortOrder,
        page: u32,
        page_size: u32,
    ) -> Result<(Vec<PostView>, u32)>;
}

/// SQLite implementation of PostRepository
pub struct SqlitePostRepository<'a> {
    conn: &'a Connection,
}

const VIEW_COLUMNS: &str = "p.id, u.username, p.image_path, p.created_at,
       (SELECT COUNT(*) FROM likes l WHERE l.post_id = p.id) AS like_count";

/// OFFSET for a 1-based page; widened to i64 so extreme page numbers stay
/// in range instead of overflowing u32
fn page_offset(page: u32, page_size: u32) -> i64 {
    (i64::from(page.max(1)) - 1).saturating_mul(i64::from(page_size))
}

fn order_clause(sort: SortOrder) -> &'static str {
    // id breaks creation-time ties deterministically
    match sort {
        SortOrder::Newest => "p.created_at DESC, p.id DESC",
        SortOrder::Oldest => "p.created_at ASC, p.id ASC",
        SortOrder::MostLiked => "like_count DESC, p.created_at DESC, p.id DESC",
    }
}

impl<'a> SqlitePostRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn view_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PostView> {
        Ok(PostView {
            id: row.get(0)?,
            owner_name: row.get(1)?,
            image_path: row.get(2)?,
            created_at: row.get(3)?,
            like_count: row.get(4)?,
            tag_names: Vec::new(),
        })
    }

    /// Enrich a page of views with their tag name lists in one batched query
    fn attach_tag_names(&self, views: &mut [PostView]) -> Result<()> {
        let post_ids: Vec<i64> = views.iter().map(|v| v.id).collect();
        let mut by_post = SqlitePostTagRepository::new(self.conn).tags_for_posts(&post_ids)?;
        for view in views.iter_mut() {
            if let Some(names) = by_post.remove(&view.id) {
                view.tag_names = names;
            }
        }
        Ok(())
    }
}

impl<'a> PostRepository for SqlitePostRepository<'a> {
    fn insert(&self, user_id: i64, image_path: &str) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO posts (user_id, image_path, created_at) VALUES (?1, ?2, ?3)",
            rusqlite::params![user_id, image_path, current_timestamp()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn owner_of(&self, post_id: i64) -> Result<Option<i64>> {
        let owner = self
            .conn
            .query_row("SELECT user_id FROM posts WHERE id = ?1", [post_id], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(owner)
    }

    fn delete(&self, post_id: i64) -> Result<bool> {
        // Tag and reaction rows cascade via foreign keys
        let affected = self
            .conn
            .execute("DELETE FROM posts WHERE id = ?1", [post_id])?;
        Ok(affected > 0)
    }

    fn find_view_by_id(&self, post_id: i64) -> Result<Option<PostView>> {
        let query = format!(
            "SELECT {VIEW_COLUMNS}
             FROM posts p
             INNER JOIN users u ON u.id = p.user_id
             WHERE p.id = ?1"
        );
        let view = self
            .conn
            .query_row(&query, [post_id], Self::view_from_row)
            .optional()?;

        match view {
            Some(view) => {
                let mut views = [view];
                self.attach_tag_names(&mut views)?;
                let [view] = views;
                Ok(Some(view))
            }
            None => Ok(None),
        }
    }

    fn find_views_by_ids(&self, post_ids: &[i64]) -> Result<Vec<PostView>> {
        if post_ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders: Vec<String> = post_ids.iter().map(|_| "?".to_string()).collect();
        let query = format!(
            "SELECT {VIEW_COLUMNS}
             FROM posts p
             INNER JOIN users u ON u.id = p.user_id
             WHERE p.id IN ({})",
            placeholders.join(",")
        );

        let mut stmt = self.conn.prepare(&query)?;
        let params: Vec<&dyn rusqlite::ToSql> =
            post_ids.iter().map(|id| id as &dyn rusqlite::ToSql).collect();
        let view_iter = stmt.query_map(&params[..], Self::view_from_row)?;

        // The IN query returns rows in table order; re-emit them in the
        // caller's id order so e.g. a favorites listing keeps its ranking
        let mut by_id: HashMap<i64, PostView> = HashMap::new();
        for view in view_iter {
            let view = view?;
            by_id.insert(view.id, view);
        }
        let mut views: Vec<PostView> = post_ids
            .iter()
            .filter_map(|id| by_id.remove(id))
            .collect();
        self.attach_tag_names(&mut views)?;
        Ok(views)
    }

    fn find_all_paginated(
        &self,
        sort: SortOrder,
        page: u32,
        page_size: u32,
    ) -> Result<(Vec<PostView>, u32)> {
        let offset = page_offset(page, page_size);
        let limit = i64::from(page_size);

        let total_count: u32 =
            self.conn
                .query_row("SELECT COUNT(*) FROM posts", [], |row| row.get(0))?;

        let query = format!(
            "SELECT {VIEW_COLUMNS}
             FROM posts p
             INNER JOIN users u ON u.id = p.user_id
             ORDER BY {} LIMIT ? OFFSET ?",
            order_clause(sort)
        );

        let mut stmt = self.conn.prepare(&query)?;
        let view_iter = stmt.query_map([limit, offset], Self::view_from_row)?;

        let mut views = Vec::new();
        for view in view_iter {
            views.push(view?);
        }
        self.attach_tag_names(&mut views)?;

        Ok((views, total_count))
    }

    fn search_by_tag_ids_paginated(
        &self,
        tag_ids: &[i64],
        sort: SortOrder,
        page: u32,
        page_size: u32,
    ) -> Result<(Vec<PostView>, u32)> {
        if tag_ids.is_empty() {
            return self.find_all_paginated(sort, page, page_size);
        }

        let offset = page_offset(page, page_size);
        let limit = i64::from(page_size);
        let required = tag_ids.len() as i64;

        let placeholders: Vec<String> = tag_ids.iter().map(|_| "?".to_string()).collect();
        let placeholders_str = placeholders.join(",");
        let tag_params: Vec<&dyn rusqlite::ToSql> =
            tag_ids.iter().map(|id| id as &dyn rusqlite::ToSql).collect();

        // A post matches when its distinct matched-tag count covers every
        // requested tag
        let count_query = format!(
            "SELECT COUNT(*) FROM (
                 SELECT pt.post_id
                 FROM post_tags pt
                 WHERE pt.tag_id IN ({placeholders_str})
                 GROUP BY pt.post_id
                 HAVING COUNT(DISTINCT pt.tag_id) = ?
             )"
        );
        let mut count_stmt = self.conn.prepare(&count_query)?;
        let mut count_params = tag_params.clone();
        count_params.push(&required);
        let total_count: u32 = count_stmt.query_row(&count_params[..], |row| row.get(0))?;

        let search_query = format!(
            "SELECT {VIEW_COLUMNS}
             FROM posts p
             INNER JOIN users u ON u.id = p.user_id
             INNER JOIN post_tags pt ON pt.post_id = p.id
             WHERE pt.tag_id IN ({placeholders_str})
             GROUP BY p.id
             HAVING COUNT(DISTINCT pt.tag_id) = ?
             ORDER BY {} LIMIT ? OFFSET ?",
            order_clause(sort)
        );

        let mut stmt = self.conn.prepare(&search_query)?;
        let mut search_params = tag_params;
        search_params.push(&required);
        search_params.push(&limit);
        search_params.push(&offset);

        let view_iter = stmt.query_map(&search_params[..], Self::view_from_row)?;

        let mut views = Vec::new();
        for view in view_iter {
            views.push(view?);
        }
        self.attach_tag_names(&mut views)?;

        Ok((views, total_count))
    }
}
