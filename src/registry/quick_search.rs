//! Saved quick searches.

use crate::model::{DisplayName, ListQuery, QueryMode};

/// A named shortcut to a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickSearch {
    pub name: DisplayName,
    pub query: ListQuery,
}

impl QuickSearch {
    /// The query to install when this shortcut is selected: page 0, and plain
    /// keyword listings are marked as coming from a quick search.
    pub fn to_query(&self) -> ListQuery {
        match self.query.mode() {
            QueryMode::Normal => self.query.clone().with_mode(QueryMode::QuickSearch),
            _ => self.query.at_page(0),
        }
    }
}

/// Supplies and stores quick searches.
pub trait QuickSearchRegistry {
    /// All saved shortcuts, in display order.
    fn list_all(&self) -> Vec<QuickSearch>;

    /// Save a shortcut. Order of insertion is display order.
    fn add(&mut self, name: DisplayName, query: ListQuery);

    fn get(&self, index: usize) -> Option<QuickSearch> {
        self.list_all().into_iter().nth(index)
    }
}

/// Registry that lives only as long as the process.
#[derive(Debug, Clone, Default)]
pub struct InMemoryQuickSearchRegistry {
    entries: Vec<QuickSearch>,
}

impl InMemoryQuickSearchRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

impl QuickSearchRegistry for InMemoryQuickSearchRegistry {
    fn list_all(&self) -> Vec<QuickSearch> {
        self.entries.clone()
    }

    fn add(&mut self, name: DisplayName, query: ListQuery) {
        self.entries.push(QuickSearch {
            name,
            query: query.at_page(0),
        });
    }

    fn get(&self, index: usize) -> Option<QuickSearch> {
        self.entries.get(index).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Source;

    fn name(s: &str) -> DisplayName {
        DisplayName::new(s).expect("valid name")
    }

    #[test]
    fn add_preserves_insertion_order() {
        let mut registry = InMemoryQuickSearchRegistry::new();
        registry.add(name("first"), ListQuery::new(Source::Standard));
        registry.add(name("second"), ListQuery::new(Source::Lofi));

        let names: Vec<String> = registry
            .list_all()
            .into_iter()
            .map(|q| q.name.to_string())
            .collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn add_stores_page_zero() {
        let mut registry = InMemoryQuickSearchRegistry::new();
        registry.add(name("deep"), ListQuery::new(Source::Standard).at_page(6));

        assert_eq!(registry.get(0).map(|q| q.query.page_index()), Some(0));
    }

    #[test]
    fn get_out_of_range_is_none() {
        let registry = InMemoryQuickSearchRegistry::new();
        assert_eq!(registry.get(3), None);
    }

    #[test]
    fn selecting_plain_keyword_search_marks_quick_search_mode() {
        let saved = QuickSearch {
            name: name("cats"),
            query: ListQuery::new(Source::Standard).with_keyword("cats"),
        };

        let query = saved.to_query();
        assert_eq!(query.mode(), QueryMode::QuickSearch);
        assert_eq!(query.keyword(), Some("cats"));
    }

    #[test]
    fn selecting_tag_search_keeps_tag_mode() {
        let saved = QuickSearch {
            name: name("boats"),
            query: ListQuery::new(Source::Standard)
                .with_mode(QueryMode::Tag)
                .with_keyword("boats"),
        };

        assert_eq!(saved.to_query().mode(), QueryMode::Tag);
    }
}
