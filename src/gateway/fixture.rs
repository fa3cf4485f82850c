//! Fixture gateway serving a JSON catalog from background threads.
//!
//! Stands in for the remote backend in the binary and in integration tests.
//! Each fetch runs on its own thread, sleeps for the configured latency, then
//! posts a [`FetchCompletion`] on the channel returned by
//! [`FixtureGateway::new`]. The cancel flag is checked before and after the
//! simulated latency; a cancelled fetch still posts `Canceled`.

use crate::gateway::{
    FetchCompletion, FetchGateway, FetchHandle, FetchOutcome, PageData, PageMetadata,
};
use crate::model::{
    CatalogEntry, CatalogError, FetchError, ListQuery, QueryMode, Source, TaskId, UPLOADER_PREFIX,
};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

const BUILTIN_CATALOG: &str = include_str!("../../fixtures/catalog.json");

// ===== Catalog =====

/// In-memory catalog, newest entries first.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new(mut entries: Vec<CatalogEntry>) -> Self {
        entries.sort_by(|a, b| b.posted.cmp(&a.posted).then(b.id.cmp(&a.id)));
        Self { entries }
    }

    /// Parse a catalog from a JSON array of entries.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let entries: Vec<CatalogEntry> = serde_json::from_str(json)?;
        Ok(Self::new(entries))
    }

    /// Load a catalog file.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Read` if the file cannot be read and
    /// `CatalogError::Parse` if it is not a JSON array of entries.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// The catalog bundled with the crate.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Answer one page of `query`, the way the backend for its source would.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::UnsupportedQuery` for tag or uploader listings
    /// without a keyword, and for tag listings against the lofi source.
    pub fn serve(&self, query: &ListQuery, page_size: usize) -> Result<PageData, FetchError> {
        let page_size = page_size.max(1);

        if query.mode() == QueryMode::Popular {
            let mut popular: Vec<CatalogEntry> = self.entries.clone();
            popular.sort_by(|a, b| b.favorites.cmp(&a.favorites));
            popular.truncate(page_size);
            let metadata = match query.source() {
                Source::Standard => PageMetadata::counted(1),
                Source::Lofi => PageMetadata::uncounted(true),
            };
            return Ok(PageData {
                items: popular,
                metadata,
            });
        }

        let matching = self.matching(query)?;
        let total = matching.len();
        let start = query.page_index().saturating_mul(page_size);
        let items: Vec<CatalogEntry> = matching
            .into_iter()
            .skip(start)
            .take(page_size)
            .cloned()
            .collect();

        let metadata = match query.source() {
            Source::Standard => PageMetadata::counted(total.div_ceil(page_size)),
            Source::Lofi => PageMetadata::uncounted(start + page_size >= total),
        };

        Ok(PageData { items, metadata })
    }

    fn matching(&self, query: &ListQuery) -> Result<Vec<&CatalogEntry>, FetchError> {
        let keyword = query.keyword();
        let categories = query.categories();

        let by_category = self
            .entries
            .iter()
            .filter(move |entry| categories.admits(entry.category));

        let matching = match query.mode() {
            QueryMode::Tag => {
                if query.source() == Source::Lofi {
                    return Err(FetchError::unsupported("lofi source cannot list by tag"));
                }
                let tag = keyword.ok_or_else(|| FetchError::unsupported("tag listing needs a tag"))?;
                by_category.filter(|e| e.has_tag(tag)).collect()
            }
            QueryMode::Uploader => {
                let uploader = keyword
                    .ok_or_else(|| FetchError::unsupported("uploader listing needs a name"))?;
                by_category
                    .filter(|e| e.uploader.eq_ignore_ascii_case(uploader))
                    .collect()
            }
            QueryMode::Normal | QueryMode::QuickSearch | QueryMode::Popular => match keyword {
                None => by_category.collect(),
                Some(keyword) => match keyword.strip_prefix(UPLOADER_PREFIX) {
                    Some(uploader) => by_category
                        .filter(|e| e.uploader.eq_ignore_ascii_case(uploader.trim()))
                        .collect(),
                    None => by_category.filter(|e| e.matches_keyword(keyword)).collect(),
                },
            },
        };

        Ok(matching)
    }
}

// ===== FixtureGateway =====

/// Gateway answering from a [`Catalog`] on background threads.
#[derive(Debug)]
pub struct FixtureGateway {
    catalog: Arc<Catalog>,
    page_size: usize,
    latency: Duration,
    completions: Sender<FetchCompletion>,
    injected_failures: VecDeque<FetchError>,
}

impl FixtureGateway {
    /// Create a gateway and the receiver its completions arrive on.
    pub fn new(
        catalog: Catalog,
        page_size: usize,
        latency: Duration,
    ) -> (Self, Receiver<FetchCompletion>) {
        let (tx, rx) = mpsc::channel();
        let gateway = Self {
            catalog: Arc::new(catalog),
            page_size: page_size.max(1),
            latency,
            completions: tx,
            injected_failures: VecDeque::new(),
        };
        (gateway, rx)
    }

    /// Make the next fetch fail with `error` instead of consulting the catalog.
    pub fn inject_failure(&mut self, error: FetchError) {
        self.injected_failures.push_back(error);
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }
}

impl FetchGateway for FixtureGateway {
    fn fetch(&mut self, task_id: TaskId, query: ListQuery) -> FetchHandle {
        let handle = FetchHandle::new();
        let worker_handle = handle.clone();
        let catalog = Arc::clone(&self.catalog);
        let tx = self.completions.clone();
        let latency = self.latency;
        let page_size = self.page_size;
        let injected = self.injected_failures.pop_front();

        debug!(task = %task_id, query = %query, "Fixture fetch started");

        let spawned = thread::Builder::new()
            .name(format!("fixture-fetch-{}", task_id.get()))
            .spawn(move || {
                let outcome = if worker_handle.is_cancelled() {
                    FetchOutcome::Canceled
                } else {
                    if !latency.is_zero() {
                        thread::sleep(latency);
                    }
                    if worker_handle.is_cancelled() {
                        FetchOutcome::Canceled
                    } else if let Some(error) = injected {
                        FetchOutcome::Failed(error)
                    } else {
                        match catalog.serve(&query, page_size) {
                            Ok(page) => FetchOutcome::Succeeded(page),
                            Err(error) => FetchOutcome::Failed(error),
                        }
                    }
                };
                // A closed receiver means the screen is gone; nothing to report to.
                let _ = tx.send(FetchCompletion { task_id, outcome });
            });

        if let Err(err) = spawned {
            warn!(task = %task_id, error = %err, "Could not spawn fetch thread");
            let _ = self.completions.send(FetchCompletion {
                task_id,
                outcome: FetchOutcome::Failed(FetchError::network(err.to_string())),
            });
        }

        handle
    }
}
