//! Collaborators that remember searches: quick searches and search history.
//!
//! Only the contracts matter to the core. The in-memory implementations back
//! the binary and the tests; storage formats are left to whoever embeds the
//! crate.

pub mod history;
pub mod quick_search;

pub use history::{InMemorySearchHistory, SearchHistory};
pub use quick_search::{InMemoryQuickSearchRegistry, QuickSearch, QuickSearchRegistry};
