//! Paginated content controller (pure apart from the gateway call).
//!
//! Owns the current page, the page count, the loaded items and the single
//! outstanding request. Every dispatch allocates a fresh [`TaskId`] and
//! supersedes whatever was in flight; completions whose task id is not the
//! outstanding one are dropped without touching state. That check, not the
//! cancel signal, is what makes late responses harmless.
//!
//! # Page count policy
//!
//! - Popular listings: always exactly one page.
//! - Lofi source: a last-page flag fixes the count at `page + 1`; otherwise a
//!   `Refresh` marks the count unknown so forward paging stays open. Other
//!   request types leave an already discovered bound alone.
//! - Standard source: the reported total replaces the count on every success.

use crate::gateway::{FetchCompletion, FetchGateway, FetchHandle, FetchOutcome, PageData, PageMetadata};
use crate::model::{
    CatalogEntry, FetchError, ListQuery, PaginationError, QueryMode, Source, TaskId, TaskSequence,
};
use std::fmt;
use tracing::{debug, warn};

// ===== PageCount =====

/// Total number of pages for the current listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageCount {
    /// Exact count. Never zero.
    Known(usize),
    /// Not reported by the backend; discovered when a last page shows up.
    Unknown,
}

impl PageCount {
    pub fn known(self) -> Option<usize> {
        match self {
            PageCount::Known(count) => Some(count),
            PageCount::Unknown => None,
        }
    }

    pub fn is_known(self) -> bool {
        matches!(self, PageCount::Known(_))
    }

    /// Whether `page` exists under this count.
    pub fn contains(self, page: usize) -> bool {
        match self {
            PageCount::Known(count) => page < count,
            PageCount::Unknown => true,
        }
    }
}

impl fmt::Display for PageCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageCount::Known(count) => write!(f, "{count}"),
            PageCount::Unknown => write!(f, "unknown"),
        }
    }
}

// ===== LoadStatus / RequestType =====

/// What the list area should show besides the items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Error,
    Empty,
}

/// Why a page was requested. Decides how the result is merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestType {
    /// Page 0 of a (possibly new) listing; replaces the items.
    Refresh,
    /// Page after the last loaded one; appended.
    NextPage,
    /// Page before the first loaded one; prepended.
    PrevPage,
    /// Direct jump to an arbitrary page; replaces the items.
    Retry,
}

impl RequestType {
    fn replaces_items(self) -> bool {
        matches!(self, RequestType::Refresh | RequestType::Retry)
    }
}

// ===== PageRequest =====

/// The request currently in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub task_id: TaskId,
    pub request_type: RequestType,
    /// Snapshot handed to the gateway.
    pub query: ListQuery,
}

impl PageRequest {
    pub fn target_page(&self) -> usize {
        self.query.page_index()
    }
}

#[derive(Debug)]
struct Outstanding {
    request: PageRequest,
    handle: FetchHandle,
    /// Status to restore if this request is cancelled.
    status_before: LoadStatus,
}

// ===== ApplyOutcome =====

/// What a completion did to the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum ApplyOutcome {
    /// Completion belonged to a superseded request; nothing changed.
    Stale,
    /// Items and page count updated.
    Loaded,
    /// Status is now `Error`; the error should be shown.
    Failed(FetchError),
    /// The outstanding request was abandoned; status rolled back.
    RolledBack,
}

// ===== PaginationController =====

/// Page loader for one screen.
#[derive(Debug)]
pub struct PaginationController<G> {
    gateway: G,
    query: ListQuery,
    tasks: TaskSequence,
    outstanding: Option<Outstanding>,
    current_page: usize,
    /// First and last page currently present in `items`.
    loaded_pages: Option<(usize, usize)>,
    page_count: PageCount,
    items: Vec<CatalogEntry>,
    status: LoadStatus,
    last_error: Option<FetchError>,
    failed_request: Option<(RequestType, usize)>,
    consecutive_failures: u32,
}

impl<G: FetchGateway> PaginationController<G> {
    pub fn new(gateway: G, query: ListQuery) -> Self {
        Self {
            gateway,
            query: query.at_page(0),
            tasks: TaskSequence::new(),
            outstanding: None,
            current_page: 0,
            loaded_pages: None,
            page_count: PageCount::Known(1),
            items: Vec::new(),
            status: LoadStatus::Idle,
            last_error: None,
            failed_request: None,
            consecutive_failures: 0,
        }
    }

    // ===== Operations =====

    /// Initial load of page 0.
    ///
    /// # Errors
    ///
    /// `AlreadyLoaded` unless the controller is idle, empty and not loading.
    pub fn first_load(&mut self) -> Result<TaskId, PaginationError> {
        if self.status != LoadStatus::Idle || !self.items.is_empty() || self.outstanding.is_some()
        {
            return Err(PaginationError::AlreadyLoaded);
        }
        Ok(self.dispatch(RequestType::Refresh, 0))
    }

    /// Install `query` without dispatching. Used before [`Self::first_load`].
    pub fn set_query(&mut self, query: ListQuery) {
        self.query = query.at_page(0);
    }

    /// Install `query` and reload from page 0.
    pub fn refresh(&mut self, query: ListQuery) -> TaskId {
        self.query = query.at_page(0);
        self.refresh_with_same_query()
    }

    /// Reload page 0 of the last installed query.
    pub fn refresh_with_same_query(&mut self) -> TaskId {
        self.cancel_outstanding();
        self.current_page = 0;
        self.items.clear();
        self.loaded_pages = None;
        self.dispatch(RequestType::Refresh, 0)
    }

    /// Jump straight to `page`, replacing the items when it arrives.
    ///
    /// # Errors
    ///
    /// `InvalidPage` for negative pages and, once the count is known, for
    /// pages at or past it. Nothing changes on error.
    pub fn go_to(&mut self, page: i64) -> Result<TaskId, PaginationError> {
        let invalid = PaginationError::InvalidPage {
            page,
            page_count: self.page_count.known(),
        };
        let target = usize::try_from(page).map_err(|_| invalid.clone())?;
        if !self.page_count.contains(target) {
            return Err(invalid);
        }
        Ok(self.dispatch(RequestType::Retry, target))
    }

    /// Whether a page jump can be offered.
    pub fn can_go_to(&self) -> bool {
        self.page_count.is_known()
    }

    /// Append the page after the last loaded one.
    ///
    /// # Errors
    ///
    /// `NoNextPage` when nothing is loaded yet or the known count is reached.
    pub fn next_page(&mut self) -> Result<TaskId, PaginationError> {
        let (_, last) = self.loaded_pages.ok_or(PaginationError::NoNextPage)?;
        let target = last + 1;
        if !self.page_count.contains(target) {
            return Err(PaginationError::NoNextPage);
        }
        Ok(self.dispatch(RequestType::NextPage, target))
    }

    /// Prepend the page before the first loaded one.
    ///
    /// # Errors
    ///
    /// `NoPreviousPage` when nothing is loaded or page 0 is already loaded.
    pub fn prev_page(&mut self) -> Result<TaskId, PaginationError> {
        match self.loaded_pages {
            Some((first, _)) if first > 0 => Ok(self.dispatch(RequestType::PrevPage, first - 1)),
            _ => Err(PaginationError::NoPreviousPage),
        }
    }

    /// Re-issue the request that failed last, with the same type and page.
    ///
    /// # Errors
    ///
    /// `NothingToRetry` outside the `Error` status.
    pub fn retry(&mut self) -> Result<TaskId, PaginationError> {
        match (self.status, self.failed_request) {
            (LoadStatus::Error, Some((request_type, page))) => {
                Ok(self.dispatch(request_type, page))
            }
            _ => Err(PaginationError::NothingToRetry),
        }
    }

    fn dispatch(&mut self, request_type: RequestType, page: usize) -> TaskId {
        let status_before = match self.outstanding.take() {
            Some(previous) => {
                debug!(task = %previous.request.task_id, "Superseding outstanding request");
                previous.handle.cancel();
                previous.status_before
            }
            None => self.status,
        };

        let task_id = self.tasks.next_id();
        let query = self.query.at_page(page);
        debug!(task = %task_id, ?request_type, query = %query, "Dispatching page request");

        let handle = self.gateway.fetch(task_id, query.clone());
        self.outstanding = Some(Outstanding {
            request: PageRequest {
                task_id,
                request_type,
                query,
            },
            handle,
            status_before,
        });
        self.status = LoadStatus::Loading;
        task_id
    }
}

impl<G> PaginationController<G> {
    // ===== Completions =====

    /// Route a gateway completion to the matching handler.
    pub fn on_completion(&mut self, completion: FetchCompletion) -> ApplyOutcome {
        let FetchCompletion { task_id, outcome } = completion;
        match outcome {
            FetchOutcome::Succeeded(page) => self.on_fetch_succeeded(task_id, page),
            FetchOutcome::Failed(error) => self.on_fetch_failed(task_id, error),
            FetchOutcome::Canceled => self.on_fetch_canceled(task_id),
        }
    }

    pub fn on_fetch_succeeded(&mut self, task_id: TaskId, page: PageData) -> ApplyOutcome {
        let Some(outstanding) = self.take_outstanding(task_id) else {
            return ApplyOutcome::Stale;
        };
        let request = outstanding.request;
        let target = request.target_page();

        self.page_count = next_page_count(self.page_count, &request, &page.metadata);

        let PageData { items, .. } = page;
        match (request.request_type, self.loaded_pages) {
            (RequestType::NextPage, Some((first, _))) => {
                self.items.extend(items);
                self.loaded_pages = Some((first, target));
            }
            (RequestType::PrevPage, Some((_, last))) => {
                let mut merged = items;
                merged.append(&mut self.items);
                self.items = merged;
                self.loaded_pages = Some((target, last));
            }
            (request_type, _) => {
                debug_assert!(request_type.replaces_items() || self.loaded_pages.is_none());
                self.items = items;
                self.loaded_pages = Some((target, target));
            }
        }

        self.current_page = target;
        self.status = if self.items.is_empty() {
            LoadStatus::Empty
        } else {
            LoadStatus::Idle
        };
        self.last_error = None;
        self.failed_request = None;
        self.consecutive_failures = 0;

        if let PageCount::Known(count) = self.page_count {
            if target >= count {
                warn!(page = target, count, "Backend page count is behind the loaded page");
            }
        }
        debug!(task = %task_id, page = target, count = %self.page_count, items = self.items.len(), "Page applied");
        ApplyOutcome::Loaded
    }

    pub fn on_fetch_failed(&mut self, task_id: TaskId, error: FetchError) -> ApplyOutcome {
        let Some(outstanding) = self.take_outstanding(task_id) else {
            return ApplyOutcome::Stale;
        };
        let request = outstanding.request;

        warn!(task = %task_id, error = %error, "Page request failed");
        self.status = LoadStatus::Error;
        self.failed_request = Some((request.request_type, request.target_page()));
        if error.counts_as_failure() {
            self.consecutive_failures += 1;
        }
        self.last_error = Some(error.clone());
        ApplyOutcome::Failed(error)
    }

    pub fn on_fetch_canceled(&mut self, task_id: TaskId) -> ApplyOutcome {
        let Some(outstanding) = self.take_outstanding(task_id) else {
            return ApplyOutcome::Stale;
        };
        debug!(task = %task_id, "Outstanding request cancelled; rolling back status");
        self.status = outstanding.status_before;
        ApplyOutcome::RolledBack
    }

    fn take_outstanding(&mut self, task_id: TaskId) -> Option<Outstanding> {
        let is_current = self
            .outstanding
            .as_ref()
            .is_some_and(|o| o.request.task_id == task_id);
        if is_current {
            self.outstanding.take()
        } else {
            debug!(task = %task_id, "Dropping stale completion");
            None
        }
    }

    /// Cancel the outstanding request, if any, and roll back its status.
    ///
    /// Safe to call repeatedly.
    pub fn destroy(&mut self) {
        self.cancel_outstanding();
    }

    fn cancel_outstanding(&mut self) {
        if let Some(outstanding) = self.outstanding.take() {
            debug!(task = %outstanding.request.task_id, "Cancelling outstanding request");
            outstanding.handle.cancel();
            self.status = outstanding.status_before;
        }
    }

    // ===== Accessors =====

    /// The last installed query, at page 0.
    pub fn query(&self) -> &ListQuery {
        &self.query
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_count(&self) -> PageCount {
        self.page_count
    }

    pub fn items(&self) -> &[CatalogEntry] {
        &self.items
    }

    pub fn status(&self) -> LoadStatus {
        self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == LoadStatus::Loading
    }

    pub fn outstanding(&self) -> Option<&PageRequest> {
        self.outstanding.as_ref().map(|o| &o.request)
    }

    pub fn last_error(&self) -> Option<&FetchError> {
        self.last_error.as_ref()
    }

    /// Failures since the last success, not counting unsupported queries.
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// First and last page present in the item list.
    pub fn loaded_pages(&self) -> Option<(usize, usize)> {
        self.loaded_pages
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn gateway_mut(&mut self) -> &mut G {
        &mut self.gateway
    }
}

impl<G> Drop for PaginationController<G> {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// Page count after a successful fetch of `request`.
pub fn next_page_count(
    current: PageCount,
    request: &PageRequest,
    metadata: &PageMetadata,
) -> PageCount {
    if request.query.mode() == QueryMode::Popular {
        return PageCount::Known(1);
    }

    match request.query.source() {
        Source::Lofi => {
            if metadata.is_last_page {
                PageCount::Known(request.target_page() + 1)
            } else if request.request_type == RequestType::Refresh {
                PageCount::Unknown
            } else {
                current
            }
        }
        Source::Standard => match metadata.page_count {
            Some(count) => PageCount::Known(count.max(1)),
            None => current,
        },
    }
}

// ===== Tests =====

#[cfg(test)]
#[path = "pagination_tests.rs"]
mod tests;
