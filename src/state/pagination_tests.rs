//! Tests for PaginationController.
//!
//! The gateway double only records dispatches; completions are fed to the
//! controller by hand, so ordering and staleness are fully deterministic.

use super::*;
use crate::gateway::FetchHandle;
use crate::model::{Category, CatalogEntry, Source};
use chrono::{TimeZone, Utc};
use std::cell::RefCell;
use std::rc::Rc;

// ===== Test Helpers =====

#[derive(Debug, Clone)]
struct Dispatched {
    task_id: TaskId,
    query: ListQuery,
    handle: FetchHandle,
}

#[derive(Debug, Clone, Default)]
struct RecordingGateway {
    log: Rc<RefCell<Vec<Dispatched>>>,
}

impl RecordingGateway {
    fn calls(&self) -> Vec<Dispatched> {
        self.log.borrow().clone()
    }

    fn last(&self) -> Dispatched {
        self.log
            .borrow()
            .last()
            .cloned()
            .expect("at least one dispatch")
    }
}

impl FetchGateway for RecordingGateway {
    fn fetch(&mut self, task_id: TaskId, query: ListQuery) -> FetchHandle {
        let handle = FetchHandle::new();
        self.log.borrow_mut().push(Dispatched {
            task_id,
            query,
            handle: handle.clone(),
        });
        handle
    }
}

fn entry(id: u64) -> CatalogEntry {
    CatalogEntry {
        id,
        title: format!("Entry {id}"),
        category: Category::Misc,
        uploader: "tester".to_string(),
        tags: vec![],
        favorites: 0,
        posted: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    }
}

fn page(ids: std::ops::Range<u64>, metadata: PageMetadata) -> PageData {
    PageData {
        items: ids.map(entry).collect(),
        metadata,
    }
}

fn ids(controller: &PaginationController<RecordingGateway>) -> Vec<u64> {
    controller.items().iter().map(|e| e.id).collect()
}

fn controller(source: Source) -> PaginationController<RecordingGateway> {
    PaginationController::new(RecordingGateway::default(), ListQuery::new(source))
}

/// Controller with page 0 loaded from a standard backend reporting `pages`.
fn loaded_standard(pages: usize) -> PaginationController<RecordingGateway> {
    let mut c = controller(Source::Standard);
    let task = c.first_load().expect("first load");
    c.on_fetch_succeeded(task, page(0..3, PageMetadata::counted(pages)));
    c
}

// ===== first_load =====

#[test]
fn first_load_dispatches_refresh_at_page_zero_with_task_one() {
    let mut c = controller(Source::Standard);

    let task = c.first_load().expect("first load allowed");

    assert_eq!(task, TaskId::new(1));
    assert_eq!(c.status(), LoadStatus::Loading);
    let outstanding = c.outstanding().expect("request outstanding");
    assert_eq!(outstanding.request_type, RequestType::Refresh);
    assert_eq!(outstanding.target_page(), 0);
}

#[test]
fn first_load_rejected_once_something_is_loading() {
    let mut c = controller(Source::Standard);
    c.first_load().expect("first load");

    assert_eq!(c.first_load(), Err(PaginationError::AlreadyLoaded));
    assert_eq!(c.gateway().calls().len(), 1);
}

#[test]
fn first_load_rejected_after_items_loaded() {
    let mut c = loaded_standard(3);
    assert_eq!(c.first_load(), Err(PaginationError::AlreadyLoaded));
}

// ===== refresh =====

#[test]
fn refresh_resets_page_and_clears_items_before_result() {
    let mut c = loaded_standard(5);
    let task = c.go_to(3).expect("valid page");
    c.on_fetch_succeeded(task, page(30..33, PageMetadata::counted(5)));
    assert_eq!(c.current_page(), 3);

    c.refresh_with_same_query();

    assert_eq!(c.current_page(), 0);
    assert!(c.items().is_empty(), "items cleared before the new page arrives");
    assert_eq!(c.status(), LoadStatus::Loading);
    assert_eq!(c.gateway().last().query.page_index(), 0);
}

#[test]
fn refresh_installs_new_query_at_page_zero() {
    let mut c = controller(Source::Standard);
    let query = ListQuery::new(Source::Standard)
        .with_keyword("boats")
        .at_page(4);

    c.refresh(query);

    assert_eq!(c.query().keyword(), Some("boats"));
    assert_eq!(c.query().page_index(), 0);
    assert_eq!(c.gateway().last().query.keyword(), Some("boats"));
    assert_eq!(c.gateway().last().query.page_index(), 0);
}

#[test]
fn two_rapid_refreshes_only_apply_the_second() {
    let mut c = controller(Source::Standard);
    let first = c.refresh_with_same_query();
    let second = c.refresh_with_same_query();
    assert_eq!(first, TaskId::new(1));
    assert_eq!(second, TaskId::new(2));

    let late = c.on_fetch_succeeded(first, page(0..5, PageMetadata::counted(9)));

    assert_eq!(late, ApplyOutcome::Stale);
    assert!(c.items().is_empty());
    assert_eq!(c.status(), LoadStatus::Loading);
    assert_eq!(c.page_count(), PageCount::Known(1));

    let current = c.on_fetch_succeeded(second, page(10..12, PageMetadata::counted(4)));

    assert_eq!(current, ApplyOutcome::Loaded);
    assert_eq!(ids(&c), vec![10, 11]);
    assert_eq!(c.status(), LoadStatus::Idle);
    assert_eq!(c.page_count(), PageCount::Known(4));
    assert!(c.outstanding().is_none());
}

#[test]
fn superseded_request_is_told_to_cancel() {
    let mut c = controller(Source::Standard);
    c.refresh_with_same_query();
    let first_handle = c.gateway().last().handle;

    c.refresh_with_same_query();

    assert!(first_handle.is_cancelled());
    assert!(!c.gateway().last().handle.is_cancelled());
}

// ===== Page count policy =====

#[test]
fn lofi_refresh_without_last_flag_makes_count_unknown() {
    let mut c = controller(Source::Lofi);
    let task = c.first_load().expect("first load");

    c.on_fetch_succeeded(task, page(0..5, PageMetadata::uncounted(false)));

    assert_eq!(c.page_count(), PageCount::Unknown);
    assert!(!c.can_go_to());
}

#[test]
fn lofi_last_page_flag_fixes_count_at_page_plus_one() {
    let mut c = controller(Source::Lofi);
    let task = c.first_load().expect("first load");
    c.on_fetch_succeeded(task, page(0..5, PageMetadata::uncounted(false)));

    let task = c.next_page().expect("unknown count allows next");
    c.on_fetch_succeeded(task, page(5..10, PageMetadata::uncounted(false)));
    assert_eq!(c.page_count(), PageCount::Unknown);

    let task = c.next_page().expect("still unknown");
    c.on_fetch_succeeded(task, page(10..12, PageMetadata::uncounted(true)));

    assert_eq!(c.page_count(), PageCount::Known(3));
    assert!(c.can_go_to());
    assert_eq!(c.next_page(), Err(PaginationError::NoNextPage));
}

#[test]
fn lofi_non_refresh_without_flag_keeps_discovered_bound() {
    let mut c = controller(Source::Lofi);
    let task = c.first_load().expect("first load");
    c.on_fetch_succeeded(task, page(0..5, PageMetadata::uncounted(false)));

    let task = c.go_to(4).expect("any page while unknown");
    c.on_fetch_succeeded(task, page(40..42, PageMetadata::uncounted(true)));
    assert_eq!(c.page_count(), PageCount::Known(5));

    let task = c.prev_page().expect("page 3 exists");
    c.on_fetch_succeeded(task, page(30..35, PageMetadata::uncounted(false)));

    assert_eq!(c.page_count(), PageCount::Known(5));
}

#[test]
fn lofi_refresh_without_flag_forgets_discovered_bound() {
    let mut c = controller(Source::Lofi);
    let task = c.first_load().expect("first load");
    c.on_fetch_succeeded(task, page(0..2, PageMetadata::uncounted(true)));
    assert_eq!(c.page_count(), PageCount::Known(1));

    let task = c.refresh_with_same_query();
    c.on_fetch_succeeded(task, page(0..5, PageMetadata::uncounted(false)));

    assert_eq!(c.page_count(), PageCount::Unknown);
}

#[test]
fn popular_listing_always_has_one_page() {
    let mut c = PaginationController::new(
        RecordingGateway::default(),
        ListQuery::popular(Source::Standard),
    );
    let task = c.first_load().expect("first load");

    c.on_fetch_succeeded(task, page(0..25, PageMetadata::counted(40)));

    assert_eq!(c.page_count(), PageCount::Known(1));
}

#[test]
fn popular_listing_on_lofi_ignores_missing_count() {
    let mut c = PaginationController::new(
        RecordingGateway::default(),
        ListQuery::popular(Source::Lofi),
    );
    let task = c.first_load().expect("first load");

    c.on_fetch_succeeded(task, page(0..25, PageMetadata::uncounted(false)));

    assert_eq!(c.page_count(), PageCount::Known(1));
}

#[test]
fn standard_count_replaced_on_every_success() {
    let mut c = loaded_standard(8);
    assert_eq!(c.page_count(), PageCount::Known(8));

    let task = c.next_page().expect("page 1 exists");
    c.on_fetch_succeeded(task, page(3..6, PageMetadata::counted(6)));

    assert_eq!(c.page_count(), PageCount::Known(6));
}

#[test]
fn standard_zero_count_is_clamped_to_one() {
    let mut c = controller(Source::Standard);
    let task = c.first_load().expect("first load");

    c.on_fetch_succeeded(task, page(0..0, PageMetadata::counted(0)));

    assert_eq!(c.page_count(), PageCount::Known(1));
    assert_eq!(c.status(), LoadStatus::Empty);
}

// ===== go_to =====

#[test]
fn go_to_rejects_negative_page() {
    let mut c = loaded_standard(5);

    assert_eq!(
        c.go_to(-1),
        Err(PaginationError::InvalidPage {
            page: -1,
            page_count: Some(5)
        })
    );
    assert_eq!(c.gateway().calls().len(), 1, "no dispatch on error");
    assert_eq!(c.status(), LoadStatus::Idle);
}

#[test]
fn go_to_rejects_page_equal_to_count() {
    let mut c = loaded_standard(5);

    assert_eq!(
        c.go_to(5),
        Err(PaginationError::InvalidPage {
            page: 5,
            page_count: Some(5)
        })
    );
    assert_eq!(ids(&c), vec![0, 1, 2], "items untouched");
}

#[test]
fn go_to_last_page_dispatches_retry() {
    let mut c = loaded_standard(5);

    let task = c.go_to(4).expect("last page is valid");

    let outstanding = c.outstanding().expect("dispatched");
    assert_eq!(outstanding.task_id, task);
    assert_eq!(outstanding.request_type, RequestType::Retry);
    assert_eq!(outstanding.target_page(), 4);
}

#[test]
fn go_to_replaces_items_on_arrival() {
    let mut c = loaded_standard(5);
    let task = c.go_to(2).expect("valid");

    c.on_fetch_succeeded(task, page(20..23, PageMetadata::counted(5)));

    assert_eq!(ids(&c), vec![20, 21, 22]);
    assert_eq!(c.current_page(), 2);
    assert_eq!(c.loaded_pages(), Some((2, 2)));
}

#[test]
fn go_to_supersedes_outstanding_request() {
    let mut c = loaded_standard(5);
    let next = c.next_page().expect("page 1");
    let jump = c.go_to(3).expect("page 3");

    assert!(c.gateway().calls()[1].handle.is_cancelled());
    assert_eq!(
        c.on_fetch_succeeded(next, page(3..6, PageMetadata::counted(5))),
        ApplyOutcome::Stale
    );
    assert_eq!(c.outstanding().map(|r| r.task_id), Some(jump));
}

// ===== next_page / prev_page =====

#[test]
fn next_page_appends() {
    let mut c = loaded_standard(3);
    let task = c.next_page().expect("page 1");

    c.on_fetch_succeeded(task, page(3..6, PageMetadata::counted(3)));

    assert_eq!(ids(&c), vec![0, 1, 2, 3, 4, 5]);
    assert_eq!(c.loaded_pages(), Some((0, 1)));
    assert_eq!(c.current_page(), 1);
}

#[test]
fn prev_page_prepends() {
    let mut c = loaded_standard(5);
    let task = c.go_to(2).expect("page 2");
    c.on_fetch_succeeded(task, page(20..22, PageMetadata::counted(5)));

    let task = c.prev_page().expect("page 1");
    c.on_fetch_succeeded(task, page(10..12, PageMetadata::counted(5)));

    assert_eq!(ids(&c), vec![10, 11, 20, 21]);
    assert_eq!(c.loaded_pages(), Some((1, 2)));
}

#[test]
fn next_page_rejected_at_known_end() {
    let mut c = loaded_standard(1);
    assert_eq!(c.next_page(), Err(PaginationError::NoNextPage));
}

#[test]
fn next_page_rejected_before_anything_loaded() {
    let mut c = controller(Source::Standard);
    assert_eq!(c.next_page(), Err(PaginationError::NoNextPage));
}

#[test]
fn prev_page_rejected_at_page_zero() {
    let mut c = loaded_standard(4);
    assert_eq!(c.prev_page(), Err(PaginationError::NoPreviousPage));
}

// ===== Failures =====

#[test]
fn failure_sets_error_status_and_keeps_items() {
    let mut c = loaded_standard(3);
    let task = c.next_page().expect("page 1");

    let outcome = c.on_fetch_failed(task, FetchError::network("timeout"));

    assert_eq!(outcome, ApplyOutcome::Failed(FetchError::network("timeout")));
    assert_eq!(c.status(), LoadStatus::Error);
    assert_eq!(c.last_error(), Some(&FetchError::network("timeout")));
    assert_eq!(ids(&c), vec![0, 1, 2]);
    assert!(c.outstanding().is_none());
    assert_eq!(c.consecutive_failures(), 1);
}

#[test]
fn unsupported_query_does_not_increment_failures() {
    let mut c = controller(Source::Standard);
    let task = c.first_load().expect("first load");

    c.on_fetch_failed(task, FetchError::unsupported("no tag"));

    assert_eq!(c.status(), LoadStatus::Error);
    assert_eq!(c.consecutive_failures(), 0);
}

#[test]
fn success_resets_failure_count() {
    let mut c = controller(Source::Standard);
    let task = c.first_load().expect("first load");
    c.on_fetch_failed(task, FetchError::network("down"));
    let task = c.retry().expect("retry allowed");
    c.on_fetch_failed(task, FetchError::network("down"));
    assert_eq!(c.consecutive_failures(), 2);

    let task = c.retry().expect("retry allowed");
    c.on_fetch_succeeded(task, page(0..1, PageMetadata::counted(1)));

    assert_eq!(c.consecutive_failures(), 0);
    assert_eq!(c.last_error(), None);
}

#[test]
fn stale_failure_is_ignored() {
    let mut c = controller(Source::Standard);
    let first = c.refresh_with_same_query();
    c.refresh_with_same_query();

    assert_eq!(
        c.on_fetch_failed(first, FetchError::network("late")),
        ApplyOutcome::Stale
    );
    assert_eq!(c.status(), LoadStatus::Loading);
    assert_eq!(c.last_error(), None);
}

#[test]
fn retry_reissues_failed_request_type_and_page() {
    let mut c = loaded_standard(3);
    let task = c.next_page().expect("page 1");
    c.on_fetch_failed(task, FetchError::parse("garbled"));

    c.retry().expect("retry allowed");

    let outstanding = c.outstanding().expect("dispatched");
    assert_eq!(outstanding.request_type, RequestType::NextPage);
    assert_eq!(outstanding.target_page(), 1);
}

#[test]
fn retry_rejected_when_not_in_error() {
    let mut c = loaded_standard(3);
    assert_eq!(c.retry(), Err(PaginationError::NothingToRetry));
}

// ===== Cancellation =====

#[test]
fn canceled_completion_rolls_back_status() {
    let mut c = loaded_standard(3);
    let task = c.next_page().expect("page 1");

    let outcome = c.on_fetch_canceled(task);

    assert_eq!(outcome, ApplyOutcome::RolledBack);
    assert_eq!(c.status(), LoadStatus::Idle);
    assert_eq!(ids(&c), vec![0, 1, 2]);
    assert!(c.outstanding().is_none());
}

#[test]
fn rollback_after_supersede_restores_status_before_first_dispatch() {
    let mut c = loaded_standard(5);
    c.next_page().expect("page 1");
    let jump = c.go_to(3).expect("page 3");

    c.on_fetch_canceled(jump);

    assert_eq!(c.status(), LoadStatus::Idle);
}

#[test]
fn canceled_completion_of_superseded_request_is_noop() {
    let mut c = controller(Source::Standard);
    let first = c.refresh_with_same_query();
    c.refresh_with_same_query();

    assert_eq!(c.on_fetch_canceled(first), ApplyOutcome::Stale);
    assert_eq!(c.status(), LoadStatus::Loading);
}

#[test]
fn destroy_cancels_outstanding_and_is_idempotent() {
    let mut c = controller(Source::Standard);
    c.first_load().expect("first load");
    let handle = c.gateway().last().handle;

    c.destroy();
    c.destroy();

    assert!(handle.is_cancelled());
    assert!(c.outstanding().is_none());
    assert_eq!(c.status(), LoadStatus::Idle);
}

#[test]
fn destroy_without_outstanding_request_is_noop() {
    let mut c = loaded_standard(2);
    c.destroy();
    assert_eq!(c.status(), LoadStatus::Idle);
    assert_eq!(ids(&c), vec![0, 1, 2]);
}

#[test]
fn dropping_controller_cancels_outstanding_request() {
    let gateway = RecordingGateway::default();
    let log = Rc::clone(&gateway.log);
    {
        let mut c = PaginationController::new(gateway, ListQuery::new(Source::Standard));
        c.first_load().expect("first load");
    }

    assert!(log.borrow()[0].handle.is_cancelled());
}

#[test]
fn completion_after_destroy_is_stale() {
    let mut c = controller(Source::Standard);
    let task = c.first_load().expect("first load");
    c.destroy();

    assert_eq!(
        c.on_fetch_succeeded(task, page(0..3, PageMetadata::counted(1))),
        ApplyOutcome::Stale
    );
    assert!(c.items().is_empty());
}

// ===== on_completion routing =====

#[test]
fn on_completion_routes_each_outcome() {
    let mut c = controller(Source::Standard);
    let task = c.first_load().expect("first load");
    let outcome = c.on_completion(FetchCompletion {
        task_id: task,
        outcome: FetchOutcome::Succeeded(page(0..2, PageMetadata::counted(2))),
    });
    assert_eq!(outcome, ApplyOutcome::Loaded);

    let task = c.next_page().expect("page 1");
    let outcome = c.on_completion(FetchCompletion {
        task_id: task,
        outcome: FetchOutcome::Failed(FetchError::network("x")),
    });
    assert!(matches!(outcome, ApplyOutcome::Failed(_)));

    let task = c.retry().expect("retry");
    let outcome = c.on_completion(FetchCompletion {
        task_id: task,
        outcome: FetchOutcome::Canceled,
    });
    assert_eq!(outcome, ApplyOutcome::RolledBack);
    assert_eq!(c.status(), LoadStatus::Error);
}

#[test]
fn empty_page_sets_empty_status() {
    let mut c = controller(Source::Standard);
    let task = c.first_load().expect("first load");

    c.on_fetch_succeeded(task, page(0..0, PageMetadata::counted(1)));

    assert_eq!(c.status(), LoadStatus::Empty);
}

#[test]
fn page_count_display() {
    assert_eq!(PageCount::Known(7).to_string(), "7");
    assert_eq!(PageCount::Unknown.to_string(), "unknown");
}
