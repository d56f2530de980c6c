// Configuration constants for tagboard
// This module centralizes all magic numbers and hardcoded strings to improve maintainability

/// Application configuration constants
pub mod app {
    /// Name of the application data directory
    pub const DATA_DIR_NAME: &str = "tagboard";

    /// Database file name
    pub const DATABASE_FILENAME: &str = "tagboard.db";
}

/// Tag-related configuration constants
pub mod tags {
    /// Leading marker character of a canonical tag name
    pub const MARKER: char = '#';

    /// Maximum allowed length for tag names (marker excluded)
    pub const MAX_TAG_LENGTH: usize = 50;

    /// Maximum number of autocomplete suggestions returned per request
    pub const SUGGESTION_LIMIT: u32 = 10;
}

/// Search and pagination configuration constants
pub mod search {
    /// Default number of posts per result page
    pub const DEFAULT_PAGE_SIZE: u32 = 20;

    /// Sort key strings accepted from the transport layer
    pub const SORT_NEWEST: &str = "newest";
    pub const SORT_OLDEST: &str = "oldest";
    pub const SORT_MOST_LIKED: &str = "most_liked";
}

/// Database schema constants
pub mod database {
    /// Users table name
    pub const USERS_TABLE: &str = "users";

    /// Posts table name
    pub const POSTS_TABLE: &str = "posts";

    /// Tags table name
    pub const TAGS_TABLE: &str = "tags";

    /// Post-tags junction table name
    pub const POST_TAGS_TABLE: &str = "post_tags";

    /// Timestamp format used for created_at columns
    pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";
}
