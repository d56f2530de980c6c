// Transport-facing handlers. The HTTP layer binds these; every handler
// locks the database, delegates to services/repositories and lets `?`
// flatten AppError to a string for the wire.

use std::sync::MutexGuard;

use crate::api_types::{PostSummary, SearchResponse, SuggestionEntry};
use crate::config::search::DEFAULT_PAGE_SIZE;
use crate::config::tags::SUGGESTION_LIMIT;
use crate::database::{Database, SortOrder};
use crate::repositories::post_repository::SqlitePostRepository;
use crate::repositories::reaction_repository::SqliteReactionRepository;
use crate::repositories::user_repository::SqliteUserRepository;
use crate::repositories::{PostRepository, ReactionRepository, UserRepository};
use crate::services::{autocomplete, search, tagging};
use crate::tag_normalizer::parse_search_csv;
use crate::{AppError, AppResult, AppState};

fn lock_db(state: &AppState) -> AppResult<MutexGuard<'_, Database>> {
    state
        .db
        .lock()
        .map_err(|e| AppError::database_lock(format!("Database lock error: {e}")))
}

/// Register an account. The password hash is produced upstream by the
/// auth collaborator; it is stored verbatim.
pub fn register_user(
    state: &AppState,
    username: &str,
    password_hash: &str,
) -> Result<i64, String> {
    let db = lock_db(state)?;
    let user_id = SqliteUserRepository::new(db.connection())
        .insert(username, password_hash)
        .map_err(|e| AppError::custom(format!("Failed to register user: {e}")))?;
    Ok(user_id)
}

/// Create a post and attach the tags parsed from its tag field
pub fn create_post(
    state: &AppState,
    user_id: i64,
    image_path: &str,
    tag_field: &str,
) -> Result<i64, String> {
    let db = lock_db(state)?;
    let conn = db.connection();

    let post_id = SqlitePostRepository::new(conn)
        .insert(user_id, image_path)
        .map_err(|e| AppError::post_operation(format!("Failed to create post: {e}")))?;

    tagging::set_post_tags(conn, post_id, tag_field)
        .map_err(|e| AppError::tag_operation(format!("Failed to tag post: {e}")))?;

    Ok(post_id)
}

fn check_owner(conn: &rusqlite::Connection, user_id: i64, post_id: i64) -> AppResult<()> {
    let owner = SqlitePostRepository::new(conn)
        .owner_of(post_id)
        .map_err(|e| AppError::post_operation(format!("Failed to load post: {e}")))?;
    match owner {
        None => Err(AppError::not_found(format!("post {post_id} does not exist"))),
        Some(owner_id) if owner_id != user_id => {
            Err(AppError::validation("post", "not owned by this user"))
        }
        Some(_) => Ok(()),
    }
}

/// Replace the tags of an owned post from edited tag field text.
///
/// Caller-level policy: a field with no tag tokens preserves the existing
/// tags instead of clearing them, matching the edit form UX where a blank
/// field means "unchanged".
pub fn update_post_tags(
    state: &AppState,
    user_id: i64,
    post_id: i64,
    tag_field: &str,
) -> Result<Vec<String>, String> {
    let db = lock_db(state)?;
    let conn = db.connection();
    check_owner(conn, user_id, post_id)?;

    if crate::tag_normalizer::parse_tag_field(tag_field).is_empty() {
        let kept = tagging::tags_of_post(conn, post_id)
            .map_err(|e| AppError::tag_operation(format!("Failed to get tags: {e}")))?;
        return Ok(kept);
    }

    let applied = tagging::set_post_tags(conn, post_id, tag_field)
        .map_err(|e| AppError::tag_operation(format!("Failed to update tags: {e}")))?;
    Ok(applied)
}

/// Delete an owned post; relation rows cascade
pub fn delete_post(state: &AppState, user_id: i64, post_id: i64) -> Result<(), String> {
    let db = lock_db(state)?;
    let conn = db.connection();
    check_owner(conn, user_id, post_id)?;

    SqlitePostRepository::new(conn)
        .delete(post_id)
        .map_err(|e| AppError::post_operation(format!("Failed to delete post: {e}")))?;
    Ok(())
}

/// Search posts by a comma-separated tag list
pub fn search_posts(
    state: &AppState,
    tag_csv: &str,
    sort: &str,
    page: u32,
) -> Result<SearchResponse, String> {
    let db = lock_db(state)?;

    let names = parse_search_csv(tag_csv);
    let result = search::search(
        db.connection(),
        &names,
        SortOrder::parse(sort),
        page,
        DEFAULT_PAGE_SIZE,
    )
    .map_err(|e| AppError::post_operation(format!("Search failed: {e}")))?;

    Ok(SearchResponse::new(
        result.posts.into_iter().map(PostSummary::from).collect(),
        result.total_count,
        page,
        DEFAULT_PAGE_SIZE,
    ))
}

/// Autocomplete tag names for a typed prefix
pub fn autocomplete_tags(state: &AppState, prefix: &str) -> Result<Vec<SuggestionEntry>, String> {
    let db = lock_db(state)?;
    let suggestions = autocomplete::suggest(db.connection(), prefix)
        .map_err(|e| AppError::tag_operation(format!("Autocomplete failed: {e}")))?;
    Ok(suggestions.into_iter().map(SuggestionEntry::from).collect())
}

/// Most-used tags for the landing page
pub fn popular_tags(state: &AppState) -> Result<Vec<SuggestionEntry>, String> {
    let db = lock_db(state)?;
    let suggestions = autocomplete::popular_tags(db.connection(), SUGGESTION_LIMIT)
        .map_err(|e| AppError::tag_operation(format!("Failed to get tags: {e}")))?;
    Ok(suggestions.into_iter().map(SuggestionEntry::from).collect())
}

/// Toggle a like; returns whether the like is now active
pub fn toggle_like(state: &AppState, user_id: i64, post_id: i64) -> Result<bool, String> {
    let db = lock_db(state)?;
    let active = SqliteReactionRepository::new(db.connection())
        .toggle_like(user_id, post_id)
        .map_err(|e| AppError::post_operation(format!("Failed to toggle like: {e}")))?;
    Ok(active)
}

/// Toggle a favorite; returns whether the favorite is now active
pub fn toggle_favorite(state: &AppState, user_id: i64, post_id: i64) -> Result<bool, String> {
    let db = lock_db(state)?;
    let active = SqliteReactionRepository::new(db.connection())
        .toggle_favorite(user_id, post_id)
        .map_err(|e| AppError::post_operation(format!("Failed to toggle favorite: {e}")))?;
    Ok(active)
}

/// A user's favorited posts, most recent favorite first
pub fn favorite_posts(state: &AppState, user_id: i64) -> Result<Vec<PostSummary>, String> {
    let db = lock_db(state)?;
    let conn = db.connection();

    let post_ids = SqliteReactionRepository::new(conn)
        .favorite_post_ids(user_id)
        .map_err(|e| AppError::post_operation(format!("Failed to get favorites: {e}")))?;
    let views = SqlitePostRepository::new(conn)
        .find_views_by_ids(&post_ids)
        .map_err(|e| AppError::post_operation(format!("Failed to get posts: {e}")))?;
    Ok(views.into_iter().map(PostSummary::from).collect())
}

/// A single enriched post
pub fn get_post(state: &AppState, post_id: i64) -> Result<PostSummary, String> {
    let db = lock_db(state)?;
    let view = SqlitePostRepository::new(db.connection())
        .find_view_by_id(post_id)
        .map_err(|e| AppError::post_operation(format!("Failed to get post: {e}")))?;
    view.map(PostSummary::from)
        .ok_or_else(|| AppError::not_found(format!("post {post_id} does not exist")).to_string())
}
