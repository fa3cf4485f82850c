//! Search view transition table.
//!
//! Every `(mode, event)` pair maps to exactly one [`Cell`]: either a
//! transition with the ordered actions the shell must perform, or `Ignore`.
//! Tables are validated when built, so a missing or doubled cell is an error
//! at construction rather than a silent fallthrough at runtime.

use std::collections::VecDeque;
use std::fmt;
use thiserror::Error;
use tracing::error;

// ===== SearchMode =====

/// Discrete search UI mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SearchMode {
    /// Plain list with the collapsed title bar.
    #[default]
    Normal,
    /// Search bar expanded over the list; no panel.
    InlineSearch,
    /// Search panel with filters.
    FullSearch,
    /// Search panel with the suggestion list showing.
    FullSearchShowingResults,
}

impl SearchMode {
    pub const ALL: [SearchMode; 4] = [
        SearchMode::Normal,
        SearchMode::InlineSearch,
        SearchMode::FullSearch,
        SearchMode::FullSearchShowingResults,
    ];

    fn index(self) -> usize {
        match self {
            SearchMode::Normal => 0,
            SearchMode::InlineSearch => 1,
            SearchMode::FullSearch => 2,
            SearchMode::FullSearchShowingResults => 3,
        }
    }

    /// Whether the search panel is on screen in this mode.
    pub fn shows_results_panel(self) -> bool {
        matches!(
            self,
            SearchMode::FullSearch | SearchMode::FullSearchShowingResults
        )
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SearchMode::Normal => "normal",
            SearchMode::InlineSearch => "inline-search",
            SearchMode::FullSearch => "full-search",
            SearchMode::FullSearchShowingResults => "full-search-results",
        };
        f.write_str(name)
    }
}

// ===== ViewEvent =====

/// Inputs to the search view machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewEvent {
    TitleTapped,
    SearchIconTapped,
    QueryFieldTapped,
    Back,
    /// A search submission passed its guards.
    SubmitApplied,
    /// The listing was replaced from outside the search UI (quick search
    /// selection, screen re-opened).
    Reset,
}

impl ViewEvent {
    pub const ALL: [ViewEvent; 6] = [
        ViewEvent::TitleTapped,
        ViewEvent::SearchIconTapped,
        ViewEvent::QueryFieldTapped,
        ViewEvent::Back,
        ViewEvent::SubmitApplied,
        ViewEvent::Reset,
    ];

    fn index(self) -> usize {
        match self {
            ViewEvent::TitleTapped => 0,
            ViewEvent::SearchIconTapped => 1,
            ViewEvent::QueryFieldTapped => 2,
            ViewEvent::Back => 3,
            ViewEvent::SubmitApplied => 4,
            ViewEvent::Reset => 5,
        }
    }
}

impl fmt::Display for ViewEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ViewEvent::TitleTapped => "title-tapped",
            ViewEvent::SearchIconTapped => "search-icon-tapped",
            ViewEvent::QueryFieldTapped => "query-field-tapped",
            ViewEvent::Back => "back",
            ViewEvent::SubmitApplied => "submit-applied",
            ViewEvent::Reset => "reset",
        };
        f.write_str(name)
    }
}

// ===== ViewAction =====

/// Search bar presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarAppearance {
    Normal,
    ListMode,
    SearchMode,
}

/// Icon on the corner floating action button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FabIcon {
    /// Toggles the fab menu.
    #[default]
    AddOrDelete,
    /// Submits the search bar text.
    Search,
}

/// Side effect the shell performs after a transition, in emitted order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewAction {
    SwitchBarAppearance(BarAppearance),
    RepositionSearchBar,
    ShowResultsPanel,
    HideResultsPanel,
    ScrollResultsPanelToTop,
    SetFabIcon(FabIcon),
}

// ===== Cell =====

/// Outcome of one `(mode, event)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Cell {
    Transition {
        to: SearchMode,
        actions: Vec<ViewAction>,
    },
    /// Event has no effect in this mode.
    #[default]
    Ignore,
}

impl Cell {
    pub fn to(to: SearchMode, actions: impl Into<Vec<ViewAction>>) -> Self {
        Cell::Transition {
            to,
            actions: actions.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionTableError {
    #[error("Cell ({from}, {event}) is defined more than once")]
    DuplicateCell { from: SearchMode, event: ViewEvent },

    #[error("Cell ({from}, {event}) is not defined")]
    MissingCell { from: SearchMode, event: ViewEvent },

    #[error("Mode {mode} cannot be reached from normal")]
    UnreachableState { mode: SearchMode },

    #[error("Mode {mode} has no back transition")]
    NoBackEdge { mode: SearchMode },
}

// ===== TransitionTable =====

const MODES: usize = SearchMode::ALL.len();
const EVENTS: usize = ViewEvent::ALL.len();

/// Exhaustive, validated `(mode, event) -> Cell` map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionTable {
    cells: [[Cell; EVENTS]; MODES],
}

impl TransitionTable {
    /// Build a table from explicit rows.
    ///
    /// # Errors
    ///
    /// Fails if any pair is given twice or not at all, if a mode cannot be
    /// reached from `Normal`, or if a mode other than `Normal` has no
    /// transition on `Back`.
    pub fn from_rows(
        rows: impl IntoIterator<Item = (SearchMode, ViewEvent, Cell)>,
    ) -> Result<Self, TransitionTableError> {
        let mut slots: [[Option<Cell>; EVENTS]; MODES] = Default::default();
        for (from, event, cell) in rows {
            let slot = &mut slots[from.index()][event.index()];
            if slot.is_some() {
                return Err(TransitionTableError::DuplicateCell { from, event });
            }
            *slot = Some(cell);
        }

        let mut cells: [[Cell; EVENTS]; MODES] = Default::default();
        for from in SearchMode::ALL {
            for event in ViewEvent::ALL {
                cells[from.index()][event.index()] = slots[from.index()][event.index()]
                    .take()
                    .ok_or(TransitionTableError::MissingCell { from, event })?;
            }
        }

        let table = Self { cells };
        table.check_reachability()?;
        table.check_back_edges()?;
        Ok(table)
    }

    /// The search screen's table.
    pub fn standard() -> Self {
        Self::from_rows_or_inert(standard_rows())
    }

    /// Build from `rows`, or log the validation error and return a table
    /// that ignores every event.
    fn from_rows_or_inert(
        rows: impl IntoIterator<Item = (SearchMode, ViewEvent, Cell)>,
    ) -> Self {
        match Self::from_rows(rows) {
            Ok(table) => table,
            Err(err) => {
                error!(error = %err, "Invalid transition table; search view events will be ignored");
                Self {
                    cells: Default::default(),
                }
            }
        }
    }

    pub fn cell(&self, from: SearchMode, event: ViewEvent) -> &Cell {
        &self.cells[from.index()][event.index()]
    }

    /// Target mode of `(from, event)`, if it transitions at all.
    pub fn target(&self, from: SearchMode, event: ViewEvent) -> Option<SearchMode> {
        match self.cell(from, event) {
            Cell::Transition { to, .. } => Some(*to),
            Cell::Ignore => None,
        }
    }

    fn check_reachability(&self) -> Result<(), TransitionTableError> {
        let mut seen = [false; MODES];
        let mut queue = VecDeque::from([SearchMode::Normal]);
        seen[SearchMode::Normal.index()] = true;
        while let Some(mode) = queue.pop_front() {
            for event in ViewEvent::ALL {
                if let Some(to) = self.target(mode, event) {
                    if !seen[to.index()] {
                        seen[to.index()] = true;
                        queue.push_back(to);
                    }
                }
            }
        }

        match SearchMode::ALL.into_iter().find(|m| !seen[m.index()]) {
            Some(mode) => Err(TransitionTableError::UnreachableState { mode }),
            None => Ok(()),
        }
    }

    fn check_back_edges(&self) -> Result<(), TransitionTableError> {
        match SearchMode::ALL
            .into_iter()
            .filter(|m| *m != SearchMode::Normal)
            .find(|m| self.target(*m, ViewEvent::Back).is_none())
        {
            Some(mode) => Err(TransitionTableError::NoBackEdge { mode }),
            None => Ok(()),
        }
    }
}

impl Default for TransitionTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Rows of the search screen's table.
#[rustfmt::skip]
pub fn standard_rows() -> Vec<(SearchMode, ViewEvent, Cell)> {
    use BarAppearance as Bar;
    use SearchMode::*;
    use ViewAction::*;
    use ViewEvent::*;

    let leave_inline = [
        SwitchBarAppearance(Bar::Normal),
        RepositionSearchBar,
        SetFabIcon(FabIcon::AddOrDelete),
    ];
    let leave_panel = [
        HideResultsPanel,
        SwitchBarAppearance(Bar::Normal),
        RepositionSearchBar,
        SetFabIcon(FabIcon::AddOrDelete),
    ];

    vec![
        (Normal, TitleTapped, Cell::to(InlineSearch, [
            SwitchBarAppearance(Bar::ListMode),
            RepositionSearchBar,
            SetFabIcon(FabIcon::Search),
        ])),
        (Normal, SearchIconTapped, Cell::to(FullSearch, [
            ShowResultsPanel,
            ScrollResultsPanelToTop,
            SwitchBarAppearance(Bar::SearchMode),
            RepositionSearchBar,
            SetFabIcon(FabIcon::Search),
        ])),
        (Normal, QueryFieldTapped, Cell::Ignore),
        // Back from the plain list belongs to the exit policy.
        (Normal, Back, Cell::Ignore),
        (Normal, SubmitApplied, Cell::Ignore),
        (Normal, Reset, Cell::Ignore),

        (InlineSearch, TitleTapped, Cell::Ignore),
        (InlineSearch, SearchIconTapped, Cell::to(FullSearch, [
            ShowResultsPanel,
            ScrollResultsPanelToTop,
            SwitchBarAppearance(Bar::SearchMode),
            RepositionSearchBar,
        ])),
        (InlineSearch, QueryFieldTapped, Cell::Ignore),
        (InlineSearch, Back, Cell::to(Normal, leave_inline)),
        (InlineSearch, SubmitApplied, Cell::to(Normal, leave_inline)),
        (InlineSearch, Reset, Cell::to(Normal, leave_inline)),

        (FullSearch, TitleTapped, Cell::Ignore),
        (FullSearch, SearchIconTapped, Cell::Ignore),
        (FullSearch, QueryFieldTapped, Cell::to(FullSearchShowingResults, [
            ShowResultsPanel,
            ScrollResultsPanelToTop,
            SwitchBarAppearance(Bar::ListMode),
            RepositionSearchBar,
        ])),
        (FullSearch, Back, Cell::to(Normal, leave_panel)),
        (FullSearch, SubmitApplied, Cell::to(Normal, leave_panel)),
        (FullSearch, Reset, Cell::to(Normal, leave_panel)),

        (FullSearchShowingResults, TitleTapped, Cell::Ignore),
        (FullSearchShowingResults, SearchIconTapped, Cell::Ignore),
        (FullSearchShowingResults, QueryFieldTapped, Cell::Ignore),
        (FullSearchShowingResults, Back, Cell::to(FullSearch, [
            SwitchBarAppearance(Bar::SearchMode),
            RepositionSearchBar,
        ])),
        (FullSearchShowingResults, SubmitApplied, Cell::to(Normal, leave_panel)),
        (FullSearchShowingResults, Reset, Cell::to(Normal, leave_panel)),
    ]
}
