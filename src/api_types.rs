// API type definitions - TypeScript generation for the web frontend
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::database::{PostView, TagSuggestion};

// =============================================================================
// Presentation Types
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS, JsonSchema)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    pub id: i64,
    pub owner_name: String,
    pub image_path: String,
    pub created_at: String,
    pub like_count: i64,
    pub tag_names: Vec<String>,
}

impl From<PostView> for PostSummary {
    fn from(view: PostView) -> Self {
        PostSummary {
            id: view.id,
            owner_name: view.owner_name,
            image_path: view.image_path,
            created_at: view.created_at,
            like_count: view.like_count,
            tag_names: view.tag_names,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, JsonSchema)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionEntry {
    pub name: String,
    pub count: i64,
}

impl From<TagSuggestion> for SuggestionEntry {
    fn from(suggestion: TagSuggestion) -> Self {
        SuggestionEntry {
            name: suggestion.name,
            count: suggestion.usage_count,
        }
    }
}

// =============================================================================
// Pagination Types
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS, JsonSchema)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub posts: Vec<PostSummary>,
    pub total_count: u32,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl SearchResponse {
    pub fn new(posts: Vec<PostSummary>, total_count: u32, page: u32, page_size: u32) -> Self {
        let page = page.max(1);
        let total_pages = if page_size == 0 {
            0
        } else {
            total_count.div_ceil(page_size)
        };
        SearchResponse {
            posts,
            total_count,
            page,
            page_size,
            total_pages,
            has_next_page: page < total_pages,
            has_prev_page: page > 1 && total_pages > 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_rounds_up() {
        let response = SearchResponse::new(Vec::new(), 7, 1, 2);
        assert_eq!(response.total_pages, 4);
        assert!(response.has_next_page);
        assert!(!response.has_prev_page);
    }

    #[test]
    fn test_empty_result_has_no_pages() {
        let response = SearchResponse::new(Vec::new(), 0, 1, 20);
        assert_eq!(response.total_pages, 0);
        assert!(!response.has_next_page);
        assert!(!response.has_prev_page);
    }

    #[test]
    fn test_page_zero_is_floored() {
        let response = SearchResponse::new(Vec::new(), 10, 0, 5);
        assert_eq!(response.page, 1);
        assert!(!response.has_prev_page);
    }
}
