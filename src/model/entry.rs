//! Catalog entries as returned by a fetch.

use crate::model::Category;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// One row of a result page.
///
/// Rows are opaque to the pagination core; only the shell and the fixture
/// gateway look inside them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CatalogEntry {
    /// Backend identifier.
    pub id: u64,
    pub title: String,
    pub category: Category,
    pub uploader: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Favourite count, used to rank popular items.
    #[serde(default)]
    pub favorites: u32,
    pub posted: DateTime<Utc>,
}

impl CatalogEntry {
    /// Case-insensitive match against title and tags.
    pub fn matches_keyword(&self, keyword: &str) -> bool {
        let needle = keyword.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self
                .tags
                .iter()
                .any(|tag| tag.to_lowercase().contains(&needle))
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> CatalogEntry {
        serde_json::from_str(
            r#"{"id":1,"title":"Harbor Sketches","category":"artist_cg","uploader":"mika",
                "tags":["boats","Watercolor"],"favorites":12,"posted":"2024-05-01T10:00:00Z"}"#,
        )
        .expect("valid entry")
    }

    #[test]
    fn deserializes_snake_case_category() {
        assert_eq!(entry().category, Category::ArtistCg);
    }

    #[test]
    fn keyword_matches_title_or_tag_ignoring_case() {
        let entry = entry();

        assert!(entry.matches_keyword("harbor"));
        assert!(entry.matches_keyword("WATER"));
        assert!(!entry.matches_keyword("train"));
    }

    #[test]
    fn has_tag_requires_whole_tag() {
        let entry = entry();

        assert!(entry.has_tag("watercolor"));
        assert!(!entry.has_tag("water"));
    }

    #[test]
    fn missing_optional_fields_default() {
        let entry: CatalogEntry = serde_json::from_str(
            r#"{"id":2,"title":"t","category":"misc","uploader":"u","posted":"2024-01-01T00:00:00Z"}"#,
        )
        .expect("valid entry");

        assert!(entry.tags.is_empty());
        assert_eq!(entry.favorites, 0);
    }
}
