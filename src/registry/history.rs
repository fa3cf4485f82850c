//! Search history.

use std::collections::VecDeque;

/// Records submitted search text.
pub trait SearchHistory {
    /// Remember `query` as the most recent search.
    fn add_query(&mut self, query: &str);

    /// Most recent first.
    fn recent(&self) -> Vec<String>;
}

/// Bounded history; re-submitting a query moves it to the front.
#[derive(Debug, Clone)]
pub struct InMemorySearchHistory {
    capacity: usize,
    queries: VecDeque<String>,
}

impl InMemorySearchHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            queries: VecDeque::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }
}

impl SearchHistory for InMemorySearchHistory {
    fn add_query(&mut self, query: &str) {
        self.queries.retain(|q| q != query);
        self.queries.push_front(query.to_string());
        self.queries.truncate(self.capacity);
    }

    fn recent(&self) -> Vec<String> {
        self.queries.iter().cloned().collect()
    }
}
