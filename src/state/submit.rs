//! Search submission planning.
//!
//! Turns the search bar text plus the panel filters into the query to
//! install, or `None` when the submission must be ignored.

use crate::model::{CategorySet, ListQuery, QueryMode, Source, UPLOADER_PREFIX};

/// Sub-mode of the search panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanelMode {
    /// Keyword search with filters.
    #[default]
    Keyword,
    /// Open one exact gallery. Submitted through its own path, never here.
    SpecifyGallery,
}

/// Filter state of the search panel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPanel {
    pub mode: PanelMode,
    pub categories: CategorySet,
    /// Search a single tag instead of free text.
    pub specify_tag: bool,
    /// Treat the text as an uploader name.
    pub specify_uploader: bool,
}

impl SearchPanel {
    /// Query built from the panel filters and `text`.
    pub fn build_query(&self, text: &str, source: Source) -> ListQuery {
        let query = ListQuery::new(source).with_categories(self.categories);
        if self.specify_tag {
            query.with_mode(QueryMode::Tag).with_keyword(text)
        } else if self.specify_uploader {
            query.with_keyword(format!("{UPLOADER_PREFIX}{text}"))
        } else {
            query.with_keyword(text)
        }
    }
}

/// Plan a search submission.
///
/// `panel_visible` is true while the search panel (rather than the plain
/// list) is on screen. Returns `None` when the submission is ignored:
///
/// - plain list with empty text
/// - panel with tag search active and empty text
/// - panel in [`PanelMode::SpecifyGallery`]
pub fn plan_submission(
    panel_visible: bool,
    panel: &SearchPanel,
    text: &str,
    source: Source,
) -> Option<ListQuery> {
    if !panel_visible {
        if text.is_empty() {
            return None;
        }
        return Some(ListQuery::new(source).with_keyword(text));
    }

    match panel.mode {
        PanelMode::SpecifyGallery => None,
        PanelMode::Keyword if panel.specify_tag && text.is_empty() => None,
        PanelMode::Keyword => Some(panel.build_query(text, source)),
    }
}
