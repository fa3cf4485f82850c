//! Error types for the catalog list.
//!
//! Errors are `thiserror` enums composed with `?` and `From`.
//!
//! # Error Hierarchy
//!
//! - [`AppError`] - top-level binary error
//!   - [`ConfigError`](crate::config::ConfigError) - config file read/parse failures
//!   - [`LoggingError`](crate::logging::LoggingError) - subscriber setup failures
//!   - [`CatalogError`] - fixture catalog loading failures
//!   - `std::io::Error` - terminal I/O
//! - [`FetchError`] - failures reported by a gateway for one fetch
//! - [`PaginationError`] - synchronous rejections from the page controller
//! - [`RegistryError`] - rejected quick-search saves
//!
//! # Recovery Strategy
//!
//! No fetch or pagination error is fatal. A `FetchError` moves the controller
//! into the `Error` load status, from which refresh, go-to and retry all work.
//! A `PaginationError` is returned before any state is touched.

use crate::model::InvalidDisplayName;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Logging error: {0}")]
    Logging(#[from] crate::logging::LoggingError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Terminal error: {0}")]
    Terminal(#[from] std::io::Error),
}

/// Failures loading a JSON catalog for the fixture gateway.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog at {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Failure of one fetch, as reported by a gateway.
///
/// All variants are display-only for the shell: the controller lands in the
/// `Error` status and waits for an explicit refresh, go-to or retry. Nothing
/// is retried automatically.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Transport failure (connection refused, timeout, aborted transfer).
    #[error("Network failure: {reason}")]
    Network { reason: String },

    /// The backend answered but the page could not be understood.
    #[error("Could not parse result page: {reason}")]
    Parse { reason: String },

    /// The gateway cannot serve this query shape at all.
    ///
    /// Displayed like any other failure but excluded from the consecutive
    /// failure count: retrying the same query cannot help.
    #[error("Unsupported query: {reason}")]
    UnsupportedQuery { reason: String },
}

impl FetchError {
    pub fn network(reason: impl Into<String>) -> Self {
        Self::Network {
            reason: reason.into(),
        }
    }

    pub fn parse(reason: impl Into<String>) -> Self {
        Self::Parse {
            reason: reason.into(),
        }
    }

    pub fn unsupported(reason: impl Into<String>) -> Self {
        Self::UnsupportedQuery {
            reason: reason.into(),
        }
    }

    /// Whether this failure counts toward the consecutive failure count.
    pub fn counts_as_failure(&self) -> bool {
        !matches!(self, Self::UnsupportedQuery { .. })
    }
}

/// Synchronous rejections from the page controller. None of these change state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaginationError {
    /// Requested page is negative or beyond the known page count.
    ///
    /// `page_count` is `None` when the count is still being discovered.
    #[error("Invalid page {page} (page count: {})", describe_count(page_count))]
    InvalidPage {
        page: i64,
        page_count: Option<usize>,
    },

    /// The last loaded page is already the final known page.
    #[error("Already at the last page")]
    NoNextPage,

    /// The first loaded page is already page 0.
    #[error("Already at the first page")]
    NoPreviousPage,

    /// `first_load` called after something was already requested.
    #[error("List already loaded; use refresh instead")]
    AlreadyLoaded,

    /// `retry` called outside the `Error` status.
    #[error("Nothing to retry")]
    NothingToRetry,
}

fn describe_count(count: &Option<usize>) -> String {
    match count {
        Some(count) => count.to_string(),
        None => "unknown".to_string(),
    }
}

/// Rejected attempt to save a quick search.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error(transparent)]
    InvalidName(#[from] InvalidDisplayName),

    /// Popular and quick-search listings cannot be saved.
    #[error("Queries in {mode} mode cannot be saved as quick searches")]
    UnsupportedMode { mode: String },

    #[error("No quick search at index {index}")]
    UnknownIndex { index: usize },
}
