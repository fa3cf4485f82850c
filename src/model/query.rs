//! List query value object.
//!
//! A `ListQuery` describes what to fetch. The identity tuple is
//! `(mode, keyword, categories, source)`; the page index is only meaningful
//! relative to that tuple, so every setter that touches the tuple resets the
//! page index to 0. Page variation goes through [`ListQuery::at_page`], which
//! clones the query and leaves the original untouched.

use bitflags::bitflags;
use serde::Deserialize;
use std::fmt;

/// Keyword prefix that narrows a plain search to one uploader.
pub const UPLOADER_PREFIX: &str = "uploader:";

// ===== QueryMode =====

/// Which kind of listing the query asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum QueryMode {
    /// Plain listing, optionally narrowed by keyword and categories.
    #[default]
    Normal,
    /// Aggregated popular items. Always a single page.
    Popular,
    /// Entries from one uploader (keyword is the uploader name).
    Uploader,
    /// Entries carrying one tag (keyword is the tag).
    Tag,
    /// Query installed from a saved quick search.
    QuickSearch,
}

impl QueryMode {
    /// Whether a quick search may be saved from a query in this mode.
    pub fn can_save_as_quick_search(self) -> bool {
        matches!(self, QueryMode::Normal | QueryMode::Uploader | QueryMode::Tag)
    }
}

// ===== Source =====

/// Backend variant to query.
///
/// The variant changes pagination semantics: `Standard` reports a total page
/// count with every page, `Lofi` only flags the last page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    #[default]
    Standard,
    Lofi,
}

impl Source {
    /// Parse a source name as used in config files and env vars.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "standard" => Some(Source::Standard),
            "lofi" => Some(Source::Lofi),
            _ => None,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Standard => write!(f, "standard"),
            Source::Lofi => write!(f, "lofi"),
        }
    }
}

// ===== Categories =====

/// Content category of a single catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Doujinshi,
    Manga,
    ArtistCg,
    GameCg,
    Western,
    ImageSet,
    Cosplay,
    Misc,
}

impl Category {
    /// Returns the bitflag for this category.
    pub const fn as_set(self) -> CategorySet {
        match self {
            Self::Doujinshi => CategorySet::DOUJINSHI,
            Self::Manga => CategorySet::MANGA,
            Self::ArtistCg => CategorySet::ARTIST_CG,
            Self::GameCg => CategorySet::GAME_CG,
            Self::Western => CategorySet::WESTERN,
            Self::ImageSet => CategorySet::IMAGE_SET,
            Self::Cosplay => CategorySet::COSPLAY,
            Self::Misc => CategorySet::MISC,
        }
    }
}

bitflags! {
    /// Set of content categories a query is restricted to.
    ///
    /// The empty set means "no restriction".
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CategorySet: u32 {
        const DOUJINSHI = 1 << 0;
        const MANGA = 1 << 1;
        const ARTIST_CG = 1 << 2;
        const GAME_CG = 1 << 3;
        const WESTERN = 1 << 4;
        const IMAGE_SET = 1 << 5;
        const COSPLAY = 1 << 6;
        const MISC = 1 << 7;
    }
}

impl CategorySet {
    /// Whether an entry of `category` passes this filter.
    pub fn admits(self, category: Category) -> bool {
        self.is_empty() || self.contains(category.as_set())
    }
}

// ===== ListQuery =====

/// Description of one listing request.
///
/// Fields are private so the page-reset invariant cannot be bypassed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListQuery {
    mode: QueryMode,
    keyword: Option<String>,
    categories: CategorySet,
    source: Source,
    page_index: usize,
}

impl ListQuery {
    /// Fresh homepage query against `source`.
    pub fn new(source: Source) -> Self {
        Self {
            source,
            ..Self::default()
        }
    }

    /// Fresh popular-items query against `source`.
    pub fn popular(source: Source) -> Self {
        Self::new(source).with_mode(QueryMode::Popular)
    }

    pub fn mode(&self) -> QueryMode {
        self.mode
    }

    pub fn keyword(&self) -> Option<&str> {
        self.keyword.as_deref()
    }

    pub fn categories(&self) -> CategorySet {
        self.categories
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    /// Replace the mode. Resets the page index.
    pub fn with_mode(mut self, mode: QueryMode) -> Self {
        self.mode = mode;
        self.page_index = 0;
        self
    }

    /// Replace the keyword. Empty strings clear it. Resets the page index.
    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        let keyword = keyword.into();
        self.keyword = if keyword.is_empty() {
            None
        } else {
            Some(keyword)
        };
        self.page_index = 0;
        self
    }

    /// Replace the category filter. Resets the page index.
    pub fn with_categories(mut self, categories: CategorySet) -> Self {
        self.categories = categories;
        self.page_index = 0;
        self
    }

    /// Replace the backend variant. Resets the page index.
    pub fn with_source(mut self, source: Source) -> Self {
        self.source = source;
        self.page_index = 0;
        self
    }

    /// Snapshot of this query targeting `page`.
    pub fn at_page(&self, page: usize) -> Self {
        Self {
            page_index: page,
            ..self.clone()
        }
    }

    /// Whether two queries describe the same listing, ignoring the page.
    pub fn same_listing(&self, other: &ListQuery) -> bool {
        self.mode == other.mode
            && self.keyword == other.keyword
            && self.categories == other.categories
            && self.source == other.source
    }
}

impl fmt::Display for ListQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.mode)?;
        if let Some(keyword) = &self.keyword {
            write!(f, " {keyword:?}")?;
        }
        if !self.categories.is_empty() {
            write!(f, " categories={:#x}", self.categories.bits())?;
        }
        write!(f, " source={} page={}", self.source, self.page_index)
    }
}
