//! Property-based tests for page controller ordering guarantees.
//!
//! Tests validate, for arbitrary interleavings of operations and completions:
//! 1. Task ids are strictly increasing per dispatch
//! 2. `Loading` status iff a request is outstanding
//! 3. A completion for any task other than the outstanding one changes nothing
//! 4. The current page stays below a known page count

use catalog_list::gateway::{
    FetchCompletion, FetchGateway, FetchHandle, FetchOutcome, PageData, PageMetadata,
};
use catalog_list::model::{
    CatalogEntry, Category, FetchError, ListQuery, Source, TaskId,
};
use catalog_list::state::{
    ApplyOutcome, LoadStatus, PageCount, PaginationController,
};
use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

// ===== Test Doubles =====

#[derive(Debug, Clone, Default)]
struct RecordingGateway {
    dispatched: Rc<RefCell<Vec<(TaskId, usize)>>>,
}

impl FetchGateway for RecordingGateway {
    fn fetch(&mut self, task_id: TaskId, query: ListQuery) -> FetchHandle {
        self.dispatched
            .borrow_mut()
            .push((task_id, query.page_index()));
        FetchHandle::new()
    }
}

#[derive(Debug, Clone)]
enum Op {
    Refresh,
    Next,
    Prev,
    GoTo(i64),
    Retry,
    Complete {
        pick: usize,
        kind: u8,
        items: u64,
        last: bool,
        extra_pages: usize,
    },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Refresh),
        Just(Op::Next),
        Just(Op::Prev),
        (-2i64..8).prop_map(Op::GoTo),
        Just(Op::Retry),
        (0usize..16, 0u8..3, 0u64..4, any::<bool>(), 0usize..4).prop_map(
            |(pick, kind, items, last, extra_pages)| Op::Complete {
                pick,
                kind,
                items,
                last,
                extra_pages,
            }
        ),
    ]
}

fn entry(id: u64) -> CatalogEntry {
    CatalogEntry {
        id,
        title: format!("Entry {id}"),
        category: Category::Misc,
        uploader: "prop".to_string(),
        tags: vec![],
        favorites: 0,
        posted: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
    }
}

/// Observable state used to check that stale completions are no-ops.
#[derive(Debug, Clone, PartialEq)]
struct Observed {
    items: Vec<u64>,
    status: LoadStatus,
    page_count: PageCount,
    current_page: usize,
    outstanding: Option<TaskId>,
    loaded_pages: Option<(usize, usize)>,
}

fn observe(c: &PaginationController<RecordingGateway>) -> Observed {
    Observed {
        items: c.items().iter().map(|e| e.id).collect(),
        status: c.status(),
        page_count: c.page_count(),
        current_page: c.current_page(),
        outstanding: c.outstanding().map(|r| r.task_id),
        loaded_pages: c.loaded_pages(),
    }
}

fn completion(
    task_id: TaskId,
    target_page: usize,
    kind: u8,
    items: u64,
    last: bool,
    extra_pages: usize,
    source: Source,
) -> FetchCompletion {
    let outcome = match kind {
        0 => {
            let metadata = match source {
                Source::Standard => PageMetadata::counted(target_page + 1 + extra_pages),
                Source::Lofi => PageMetadata::uncounted(last),
            };
            let base = task_id.get() * 100;
            FetchOutcome::Succeeded(PageData {
                items: (base..base + items).map(entry).collect(),
                metadata,
            })
        }
        1 => FetchOutcome::Failed(FetchError::network("flaky")),
        _ => FetchOutcome::Canceled,
    };
    FetchCompletion { task_id, outcome }
}

fn source_strategy() -> impl Strategy<Value = Source> {
    prop_oneof![Just(Source::Standard), Just(Source::Lofi)]
}

// ===== Properties =====

proptest! {
    #[test]
    fn interleaved_operations_preserve_ordering_invariants(
        source in source_strategy(),
        ops in prop::collection::vec(op_strategy(), 1..60),
    ) {
        let gateway = RecordingGateway::default();
        let dispatched = Rc::clone(&gateway.dispatched);
        let mut c = PaginationController::new(gateway, ListQuery::new(source));
        c.first_load().expect("fresh controller loads");

        for op in ops {
            match op {
                Op::Refresh => { c.refresh_with_same_query(); }
                Op::Next => { let _ = c.next_page(); }
                Op::Prev => { let _ = c.prev_page(); }
                Op::GoTo(page) => { let _ = c.go_to(page); }
                Op::Retry => { let _ = c.retry(); }
                Op::Complete { pick, kind, items, last, extra_pages } => {
                    let (task_id, target) = {
                        let log = dispatched.borrow();
                        log[pick % log.len()]
                    };
                    let before = observe(&c);
                    let is_current = before.outstanding == Some(task_id);

                    let outcome = c.on_completion(
                        completion(task_id, target, kind, items, last, extra_pages, source),
                    );

                    if !is_current {
                        prop_assert_eq!(outcome, ApplyOutcome::Stale);
                        prop_assert_eq!(observe(&c), before, "stale completion changed state");
                    }
                }
            }

            prop_assert_eq!(
                c.status() == LoadStatus::Loading,
                c.outstanding().is_some(),
                "Loading iff outstanding"
            );
            if let PageCount::Known(count) = c.page_count() {
                prop_assert!(count >= 1);
                prop_assert!(c.current_page() < count, "page {} of {}", c.current_page(), count);
            }
        }

        let ids: Vec<u64> = dispatched.borrow().iter().map(|(t, _)| t.get()).collect();
        prop_assert!(ids.windows(2).all(|w| w[0] < w[1]), "task ids not increasing: {:?}", ids);
    }

    #[test]
    fn only_the_last_of_rapid_refreshes_applies(
        refreshes in 2usize..8,
        late in 0usize..8,
    ) {
        let gateway = RecordingGateway::default();
        let dispatched = Rc::clone(&gateway.dispatched);
        let mut c = PaginationController::new(gateway, ListQuery::new(Source::Standard));

        for _ in 0..refreshes {
            c.refresh_with_same_query();
        }
        let log = dispatched.borrow().clone();
        let (stale_task, _) = log[late % (log.len() - 1)];
        let (last_task, _) = log[log.len() - 1];

        let stale = c.on_completion(completion(stale_task, 0, 0, 3, false, 2, Source::Standard));
        prop_assert_eq!(stale, ApplyOutcome::Stale);
        prop_assert!(c.items().is_empty());
        prop_assert_eq!(c.status(), LoadStatus::Loading);

        let applied = c.on_completion(completion(last_task, 0, 0, 3, false, 2, Source::Standard));
        prop_assert_eq!(applied, ApplyOutcome::Loaded);
        prop_assert_eq!(c.items().len(), 3);
        prop_assert_eq!(c.page_count(), PageCount::Known(3));
    }

    #[test]
    fn popular_page_count_is_always_one(
        source in source_strategy(),
        reported in 0usize..50,
        last in any::<bool>(),
    ) {
        let mut c = PaginationController::new(
            RecordingGateway::default(),
            ListQuery::popular(source),
        );
        let task = c.first_load().expect("fresh controller loads");
        let metadata = match source {
            Source::Standard => PageMetadata::counted(reported),
            Source::Lofi => PageMetadata::uncounted(last),
        };

        c.on_fetch_succeeded(task, PageData { items: vec![entry(1)], metadata });

        prop_assert_eq!(c.page_count(), PageCount::Known(1));
    }
}
