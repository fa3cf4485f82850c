//! Search view state machine.
//!
//! Owns the current [`SearchMode`] and the corner fab icon. The icon is
//! derived: it is whatever the last emitted `SetFabIcon` action said, so the
//! machine and the shell can never disagree about it.

use super::transition_table::{
    Cell, FabIcon, SearchMode, TransitionTable, ViewAction, ViewEvent,
};
use tracing::debug;

/// Search UI mode plus the state derived from it.
#[derive(Debug, Clone)]
pub struct SearchViewStateMachine {
    table: TransitionTable,
    mode: SearchMode,
    fab_icon: FabIcon,
}

impl Default for SearchViewStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchViewStateMachine {
    /// Machine in `Normal` using the standard table.
    pub fn new() -> Self {
        Self::with_table(TransitionTable::standard())
    }

    pub fn with_table(table: TransitionTable) -> Self {
        Self {
            table,
            mode: SearchMode::Normal,
            fab_icon: FabIcon::AddOrDelete,
        }
    }

    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    pub fn fab_icon(&self) -> FabIcon {
        self.fab_icon
    }

    /// True only in the two full search modes.
    pub fn results_panel_visible(&self) -> bool {
        self.mode.shows_results_panel()
    }

    /// Whether `event` would change the mode right now.
    pub fn accepts(&self, event: ViewEvent) -> bool {
        self.table
            .target(self.mode, event)
            .is_some_and(|to| to != self.mode)
    }

    /// Apply `event` and return the actions the shell must perform, in order.
    ///
    /// Ignored events and self-transitions return no actions.
    pub fn fire(&mut self, event: ViewEvent) -> Vec<ViewAction> {
        let (to, actions) = match self.table.cell(self.mode, event) {
            Cell::Transition { to, actions } if *to != self.mode => (*to, actions.clone()),
            _ => {
                debug!(mode = %self.mode, %event, "Event ignored");
                return Vec::new();
            }
        };

        debug!(from = %self.mode, %to, %event, "Search view transition");
        self.mode = to;
        for action in &actions {
            if let ViewAction::SetFabIcon(icon) = action {
                self.fab_icon = *icon;
            }
        }
        actions
    }
}

#[cfg(test)]
#[path = "search_view_tests.rs"]
mod tests;
