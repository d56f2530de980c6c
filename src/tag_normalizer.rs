// Tag normalization: turns raw user text into canonical tag tokens.
// Canonical form: lowercase, exactly one leading marker, no whitespace.

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

use crate::config::tags::{MARKER, MAX_TAG_LENGTH};

static VALID_TAG_BODY: OnceLock<Regex> = OnceLock::new();

fn valid_tag_body() -> &'static Regex {
    VALID_TAG_BODY.get_or_init(|| Regex::new(r"^\S+$").expect("literal pattern"))
}

/// Whether a marker-stripped tag body is acceptable for the vocabulary
pub fn is_valid_tag(body: &str) -> bool {
    !body.is_empty() && body.chars().count() <= MAX_TAG_LENGTH && valid_tag_body().is_match(body)
}

/// Normalize a single token into its canonical tag form.
///
/// Repeated leading markers collapse to exactly one, the remainder is
/// lower-cased. Tokens that are empty after stripping (e.g. "###") or fail
/// validation are discarded.
pub fn normalize_token(raw: &str) -> Option<String> {
    let body = raw.trim().trim_start_matches(MARKER).to_lowercase();
    if !is_valid_tag(&body) {
        return None;
    }
    Some(format!("{MARKER}{body}"))
}

fn dedup_first_occurrence(names: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .into_iter()
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

/// Parse search-box input: every whitespace-separated token is a tag, the
/// marker is optional and inserted when absent.
pub fn parse_search_input(text: &str) -> Vec<String> {
    let tokens = text.split_whitespace().filter_map(normalize_token).collect();
    dedup_first_occurrence(tokens)
}

/// Parse an upload tag field: only tokens the user explicitly marked are
/// tags, everything else is discarded.
pub fn parse_tag_field(text: &str) -> Vec<String> {
    let tokens = text
        .split_whitespace()
        .filter(|token| token.starts_with(MARKER))
        .filter_map(normalize_token)
        .collect();
    dedup_first_occurrence(tokens)
}

/// Parse the transport shape of a search request: comma-separated names,
/// each optionally marker-prefixed.
pub fn parse_search_csv(text: &str) -> Vec<String> {
    let tokens = text
        .split(',')
        .flat_map(|cell| cell.split_whitespace())
        .filter_map(normalize_token)
        .collect();
    dedup_first_occurrence(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_token_basic() {
        assert_eq!(normalize_token("Cat"), Some("#cat".to_string()));
        assert_eq!(normalize_token("#Cat"), Some("#cat".to_string()));
        assert_eq!(normalize_token("###CAT"), Some("#cat".to_string()));
    }

    #[test]
    fn test_normalize_token_discards_empty_and_marker_only() {
        assert_eq!(normalize_token(""), None);
        assert_eq!(normalize_token("   "), None);
        assert_eq!(normalize_token("#"), None);
        assert_eq!(normalize_token("####"), None);
    }

    #[test]
    fn test_normalize_token_discards_overlong() {
        let long = "a".repeat(MAX_TAG_LENGTH + 1);
        assert_eq!(normalize_token(&long), None);

        let max = "a".repeat(MAX_TAG_LENGTH);
        assert_eq!(normalize_token(&max), Some(format!("#{max}")));
    }

    #[test]
    fn test_search_input_marker_optional() {
        assert_eq!(
            parse_search_input("cat #Dog  bird"),
            vec!["#cat", "#dog", "#bird"]
        );
    }

    #[test]
    fn test_tag_field_requires_marker() {
        // Bare words in the upload field are prose, not tags
        assert_eq!(
            parse_tag_field("my holiday picture #Beach ##sunset"),
            vec!["#beach", "#sunset"]
        );
    }

    #[test]
    fn test_dedup_preserves_first_occurrence() {
        assert_eq!(
            parse_search_input("cat dog #CAT dog"),
            vec!["#cat", "#dog"]
        );
    }

    #[test]
    fn test_blank_input_yields_empty() {
        assert!(parse_search_input("").is_empty());
        assert!(parse_search_input("   \t\n").is_empty());
        assert!(parse_tag_field("no tags here at all").is_empty());
    }

    #[test]
    fn test_csv_parsing() {
        assert_eq!(
            parse_search_csv("cat, #dog ,bird"),
            vec!["#cat", "#dog", "#bird"]
        );
        assert!(parse_search_csv(",,,").is_empty());
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = parse_search_input("Cat ##DOG cat");
        let again = parse_search_input(&once.join(" "));
        assert_eq!(once, again);
    }
}
