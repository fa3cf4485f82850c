//! List screen: the shell around the pure state owners.
//!
//! Routes user intents to the search view machine, the fab menu and the page
//! controller, drains gateway completions, and pushes everything the user
//! should see through a [`Renderer`]. The controller never looks at the
//! search mode; the screen refreshes it after any transition that changes
//! the active query.

use crate::gateway::{FetchCompletion, FetchGateway};
use crate::model::{
    CatalogEntry, DisplayName, FetchError, ListQuery, PaginationError, RegistryError, Source,
    TaskId,
};
use crate::registry::{QuickSearch, QuickSearchRegistry, SearchHistory};
use crate::state::{
    plan_submission, ApplyOutcome, BackPressDecision, BackPressGuard, FabIcon, FabMenu,
    LoadStatus, MenuEvent, PageCount, PaginationController, PanelMode, SearchMode, SearchPanel,
    SearchViewStateMachine, ViewAction, ViewEvent,
};
use std::fmt;
use std::sync::mpsc::{Receiver, RecvTimeoutError, TryRecvError};
use std::time::{Duration, Instant};
use tracing::{debug, info};

// ===== Renderer =====

/// Everything the screen shows, pushed as it changes.
pub trait Renderer {
    /// Search view side effects, in the order they must be performed.
    fn apply_actions(&mut self, actions: &[ViewAction]);

    fn render_items(&mut self, items: &[CatalogEntry]);

    fn render_load_status(&mut self, status: LoadStatus);

    /// `page_count` displays as "unknown" while it is being discovered.
    fn render_page_indicator(&mut self, current_page: usize, page_count: PageCount);

    /// Menu expanded or collapsed; drawers lock while it is expanded.
    fn render_menu(&mut self, event: MenuEvent);

    fn render_drawer_highlight(&mut self, highlight: DrawerHighlight);

    fn render_quick_searches(&mut self, searches: &[QuickSearch]);

    /// Page jump is available; ask the user for a page.
    fn offer_go_to(&mut self, current_page: usize, page_count: PageCount);

    fn show_notice(&mut self, notice: &Notice);

    fn show_error(&mut self, error: &FetchError);
}

// ===== Screen types =====

/// How the screen was opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LaunchMode {
    #[default]
    Homepage,
    Popular,
}

/// Highlighted entry of the navigation drawer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawerHighlight {
    Homepage,
    WhatsHot,
    None,
}

impl From<LaunchMode> for DrawerHighlight {
    fn from(mode: LaunchMode) -> Self {
        match mode {
            LaunchMode::Homepage => DrawerHighlight::Homepage,
            LaunchMode::Popular => DrawerHighlight::WhatsHot,
        }
    }
}

/// Transient messages for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    PressAgainToExit,
    Rejected(PaginationError),
    QuickSearchRejected(RegistryError),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::PressAgainToExit => write!(f, "Press back again to exit"),
            Notice::Rejected(err) => write!(f, "{err}"),
            Notice::QuickSearchRejected(err) => write!(f, "{err}"),
        }
    }
}

/// What a back press did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackOutcome {
    /// The fab menu was open and is now closed.
    CollapsedMenu,
    /// Search mode stepped back to the given mode.
    Transitioned(SearchMode),
    /// First press on the root list; the exit notice was shown.
    ShowedExitNotice,
    /// The screen does not consume this press; the host should handle it.
    Propagate,
}

/// Settings the screen needs from configuration.
#[derive(Debug, Clone, Copy)]
pub struct ScreenOptions {
    pub source: Source,
    pub exit_interval: Duration,
}

impl Default for ScreenOptions {
    fn default() -> Self {
        Self {
            source: Source::Standard,
            exit_interval: crate::state::DEFAULT_EXIT_INTERVAL,
        }
    }
}

// ===== ListScreen =====

/// One searchable list screen.
pub struct ListScreen<G, Q, H, R> {
    controller: PaginationController<G>,
    view: SearchViewStateMachine,
    menu: FabMenu,
    back: BackPressGuard,
    panel: SearchPanel,
    bar_text: String,
    source: Source,
    highlight: DrawerHighlight,
    opened: bool,
    completions: Receiver<FetchCompletion>,
    registry: Q,
    history: H,
    renderer: R,
}

impl<G, Q, H, R> ListScreen<G, Q, H, R>
where
    G: FetchGateway,
    Q: QuickSearchRegistry,
    H: SearchHistory,
    R: Renderer,
{
    /// Build a screen. `completions` must be the channel `gateway` posts to.
    pub fn new(
        gateway: G,
        completions: Receiver<FetchCompletion>,
        registry: Q,
        history: H,
        renderer: R,
        options: ScreenOptions,
    ) -> Self {
        Self {
            controller: PaginationController::new(gateway, ListQuery::new(options.source)),
            view: SearchViewStateMachine::new(),
            menu: FabMenu::new(),
            back: BackPressGuard::new(options.exit_interval),
            panel: SearchPanel::default(),
            bar_text: String::new(),
            source: options.source,
            highlight: DrawerHighlight::Homepage,
            opened: false,
            completions,
            registry,
            history,
            renderer,
        }
    }

    // ===== Lifecycle =====

    /// Open (or re-open) the screen in `launch` mode.
    ///
    /// The first open performs the initial load; later opens refresh.
    pub fn open(&mut self, launch: LaunchMode) {
        let query = match launch {
            LaunchMode::Homepage => ListQuery::new(self.source),
            LaunchMode::Popular => ListQuery::popular(self.source),
        };
        self.set_highlight(launch.into());
        info!(?launch, first = !self.opened, "Opening list screen");

        if self.opened {
            self.controller.refresh(query);
        } else {
            self.opened = true;
            self.controller.set_query(query);
            if let Err(err) = self.controller.first_load() {
                debug!(error = %err, "First load skipped");
                self.controller.refresh_with_same_query();
            }
            let searches = self.registry.list_all();
            self.renderer.render_quick_searches(&searches);
        }

        self.fire(ViewEvent::Reset);
        self.render_page();
    }

    /// Tear down: cancels any outstanding fetch. Safe to call repeatedly.
    pub fn destroy(&mut self) {
        self.controller.destroy();
    }

    // ===== Search bar intents =====

    pub fn title_tapped(&mut self) {
        self.fire(ViewEvent::TitleTapped);
    }

    pub fn search_icon_tapped(&mut self) {
        self.fire(ViewEvent::SearchIconTapped);
    }

    pub fn query_field_tapped(&mut self) {
        self.fire(ViewEvent::QueryFieldTapped);
    }

    pub fn set_bar_text(&mut self, text: impl Into<String>) {
        self.bar_text = text.into();
    }

    pub fn bar_text(&self) -> &str {
        &self.bar_text
    }

    pub fn panel(&self) -> &SearchPanel {
        &self.panel
    }

    pub fn panel_mut(&mut self) -> &mut SearchPanel {
        &mut self.panel
    }

    /// Submit `text` as a search. Returns whether a refresh was issued.
    pub fn submit(&mut self, text: &str) -> bool {
        let panel_visible = self.view.results_panel_visible();
        let Some(query) = plan_submission(panel_visible, &self.panel, text, self.source) else {
            debug!(panel_visible, text, "Search submission ignored");
            return false;
        };

        self.set_highlight(DrawerHighlight::None);
        self.history.add_query(text);
        self.bar_text = text.to_string();
        self.fire(ViewEvent::SubmitApplied);
        info!(query = %query, "Applying search");
        self.controller.refresh(query);
        self.render_page();
        true
    }

    // ===== Back =====

    /// Handle a back press. `stack_depth` is the number of screens on the
    /// host's navigation stack, this one included.
    pub fn back(&mut self, now: Instant, stack_depth: usize) -> BackOutcome {
        if let Some(event) = self.menu.collapse() {
            self.renderer.render_menu(event);
            return BackOutcome::CollapsedMenu;
        }

        if self.view.mode() != SearchMode::Normal {
            self.fire(ViewEvent::Back);
            return BackOutcome::Transitioned(self.view.mode());
        }

        if stack_depth > 1 {
            return BackOutcome::Propagate;
        }
        match self.back.on_back(now) {
            BackPressDecision::ShowNotice => {
                self.renderer.show_notice(&Notice::PressAgainToExit);
                BackOutcome::ShowedExitNotice
            }
            BackPressDecision::Exit => BackOutcome::Propagate,
        }
    }

    // ===== Fab intents =====

    /// Corner fab: toggles the menu, or submits the bar text in search modes.
    pub fn corner_fab(&mut self) {
        match self.view.fab_icon() {
            FabIcon::AddOrDelete => {
                let event = self.menu.toggle();
                self.renderer.render_menu(event);
            }
            FabIcon::Search => {
                let text = self.bar_text.clone();
                self.submit(&text);
            }
        }
    }

    /// Menu refresh button: reload the current query from page 0.
    pub fn refresh_fab(&mut self) -> TaskId {
        self.collapse_menu();
        let task = self.controller.refresh_with_same_query();
        self.render_page();
        task
    }

    /// Menu go-to button. Returns whether a page jump was offered.
    pub fn go_to_fab(&mut self) -> bool {
        self.collapse_menu();
        if !self.controller.can_go_to() || self.controller.is_loading() {
            debug!(count = %self.controller.page_count(), "Page jump not available");
            return false;
        }
        self.renderer
            .offer_go_to(self.controller.current_page(), self.controller.page_count());
        true
    }

    fn collapse_menu(&mut self) {
        if let Some(event) = self.menu.collapse() {
            self.renderer.render_menu(event);
        }
    }

    // ===== Paging intents =====

    /// Jump to `page`. Rejections are shown as a notice.
    pub fn go_to(&mut self, page: i64) -> Result<TaskId, PaginationError> {
        let result = self.controller.go_to(page);
        self.after_paging(result)
    }

    pub fn next_page(&mut self) -> Result<TaskId, PaginationError> {
        let result = self.controller.next_page();
        self.after_paging(result)
    }

    pub fn prev_page(&mut self) -> Result<TaskId, PaginationError> {
        let result = self.controller.prev_page();
        self.after_paging(result)
    }

    pub fn retry(&mut self) -> Result<TaskId, PaginationError> {
        let result = self.controller.retry();
        self.after_paging(result)
    }

    fn after_paging(
        &mut self,
        result: Result<TaskId, PaginationError>,
    ) -> Result<TaskId, PaginationError> {
        match &result {
            Ok(_) => self.renderer.render_load_status(self.controller.status()),
            Err(err) => self.renderer.show_notice(&Notice::Rejected(err.clone())),
        }
        result
    }

    // ===== Quick searches =====

    /// Install quick search `index` and refresh.
    pub fn select_quick_search(&mut self, index: usize) -> Result<TaskId, RegistryError> {
        let Some(saved) = self.registry.get(index) else {
            let err = RegistryError::UnknownIndex { index };
            self.renderer
                .show_notice(&Notice::QuickSearchRejected(err.clone()));
            return Err(err);
        };

        self.fire(ViewEvent::Reset);
        self.set_highlight(DrawerHighlight::None);
        info!(name = %saved.name, "Selecting quick search");
        let task = self.controller.refresh(saved.to_query());
        self.render_page();
        Ok(task)
    }

    /// Save the current listing as a quick search named `name`.
    pub fn add_quick_search(&mut self, name: &str) -> Result<(), RegistryError> {
        let query = self.controller.query().clone();
        let result = if query.mode().can_save_as_quick_search() {
            self.save_quick_search(name, query)
        } else {
            Err(RegistryError::UnsupportedMode {
                mode: format!("{:?}", query.mode()),
            })
        };
        self.report_save(result)
    }

    /// Save the search panel filters plus the bar text as a quick search.
    ///
    /// Only keyword panels can be saved; the gallery lookup sub-mode is not a
    /// listing.
    pub fn add_quick_search_from_panel(&mut self, name: &str) -> Result<(), RegistryError> {
        let result = match self.panel.mode {
            PanelMode::Keyword => {
                let query = self.panel.build_query(&self.bar_text, self.source);
                self.save_quick_search(name, query)
            }
            PanelMode::SpecifyGallery => Err(RegistryError::UnsupportedMode {
                mode: format!("{:?}", PanelMode::SpecifyGallery),
            }),
        };
        self.report_save(result)
    }

    fn save_quick_search(&mut self, name: &str, query: ListQuery) -> Result<(), RegistryError> {
        let name = DisplayName::new(name)?;
        info!(name = %name, query = %query, "Saving quick search");
        self.registry.add(name, query);
        let searches = self.registry.list_all();
        self.renderer.render_quick_searches(&searches);
        Ok(())
    }

    fn report_save(&mut self, result: Result<(), RegistryError>) -> Result<(), RegistryError> {
        if let Err(err) = &result {
            self.renderer
                .show_notice(&Notice::QuickSearchRejected(err.clone()));
        }
        result
    }

    // ===== Completions =====

    /// Apply every completion already delivered. Returns how many were seen.
    pub fn pump(&mut self) -> usize {
        let mut seen = 0;
        loop {
            match self.completions.try_recv() {
                Ok(completion) => {
                    seen += 1;
                    self.handle_completion(completion);
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => return seen,
            }
        }
    }

    /// Block until no request is outstanding or `timeout` passes.
    ///
    /// Returns `true` if the controller is idle on return.
    pub fn wait_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.controller.outstanding().is_some() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.completions.recv_timeout(remaining) {
                Ok(completion) => {
                    self.handle_completion(completion);
                }
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => return false,
            }
        }
        true
    }

    /// Apply one completion and re-render whatever it changed.
    pub fn handle_completion(&mut self, completion: FetchCompletion) -> ApplyOutcome {
        let outcome = self.controller.on_completion(completion);
        match &outcome {
            ApplyOutcome::Stale => {}
            ApplyOutcome::Loaded | ApplyOutcome::RolledBack => self.render_page(),
            ApplyOutcome::Failed(err) => {
                self.renderer.show_error(err);
                self.render_page();
            }
        }
        outcome
    }

    // ===== Helpers =====

    fn fire(&mut self, event: ViewEvent) {
        let actions = self.view.fire(event);
        if !actions.is_empty() {
            self.renderer.apply_actions(&actions);
        }
    }

    fn set_highlight(&mut self, highlight: DrawerHighlight) {
        self.highlight = highlight;
        self.renderer.render_drawer_highlight(highlight);
    }

    fn render_page(&mut self) {
        self.renderer.render_items(self.controller.items());
        self.renderer.render_load_status(self.controller.status());
        self.renderer.render_page_indicator(
            self.controller.current_page(),
            self.controller.page_count(),
        );
    }

    // ===== Accessors =====

    pub fn mode(&self) -> SearchMode {
        self.view.mode()
    }

    pub fn fab_icon(&self) -> FabIcon {
        self.view.fab_icon()
    }

    pub fn menu(&self) -> &FabMenu {
        &self.menu
    }

    pub fn highlight(&self) -> DrawerHighlight {
        self.highlight
    }

    pub fn controller(&self) -> &PaginationController<G> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut PaginationController<G> {
        &mut self.controller
    }

    pub fn registry(&self) -> &Q {
        &self.registry
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }
}

#[cfg(test)]
#[path = "screen_tests.rs"]
mod tests;
