//! Fetch gateway contract.
//!
//! A gateway performs one asynchronous fetch per call and reports back out of
//! band with a [`FetchCompletion`] tagged with the caller's [`TaskId`]. The
//! core never waits on a gateway: it records the task id, returns, and later
//! receives the completion from whoever drains the gateway's channel.
//!
//! Cancellation is cooperative. [`FetchHandle::cancel`] only raises a flag;
//! a gateway may still deliver a late completion, and the page controller's
//! task id check is what keeps such completions from being applied.

use crate::model::{CatalogEntry, FetchError, ListQuery, TaskId};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub mod fixture;

pub use fixture::FixtureGateway;

// ===== FetchGateway =====

/// Performs fetches for the page controller.
pub trait FetchGateway {
    /// Start fetching `query`.
    ///
    /// Must not block on the fetch itself. The returned handle lets the caller
    /// signal that it no longer wants the result.
    fn fetch(&mut self, task_id: TaskId, query: ListQuery) -> FetchHandle;
}

// ===== FetchHandle =====

/// Caller-side cancellation handle for one fetch.
#[derive(Debug, Clone, Default)]
pub struct FetchHandle {
    cancelled: Arc<AtomicBool>,
}

impl FetchHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the gateway to abandon the fetch.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

// ===== Results =====

/// Pagination facts reported alongside a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageMetadata {
    /// Total page count, when the backend reports one.
    pub page_count: Option<usize>,
    /// Set when the backend says this page is the final one.
    pub is_last_page: bool,
}

impl PageMetadata {
    /// Metadata from a backend that reports totals.
    pub fn counted(page_count: usize) -> Self {
        Self {
            page_count: Some(page_count),
            is_last_page: false,
        }
    }

    /// Metadata from a backend that only flags the final page.
    pub fn uncounted(is_last_page: bool) -> Self {
        Self {
            page_count: None,
            is_last_page,
        }
    }
}

/// One successfully fetched page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageData {
    pub items: Vec<CatalogEntry>,
    pub metadata: PageMetadata,
}

/// How a fetch ended.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Succeeded(PageData),
    Failed(FetchError),
    Canceled,
}

/// Completion record posted by a gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchCompletion {
    pub task_id: TaskId,
    pub outcome: FetchOutcome,
}
