//! Floating action menu state.
//!
//! Independent of the search mode. The drawers are locked exactly while the
//! menu is expanded; callers react to the emitted [`MenuEvent`] instead of
//! reading the flag back.

use tracing::debug;

/// Change notification for the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuEvent {
    MenuExpanded,
    MenuCollapsed,
}

impl MenuEvent {
    /// Whether the side drawers should be locked after this event.
    pub fn locks_drawers(self) -> bool {
        matches!(self, MenuEvent::MenuExpanded)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FabMenu {
    expanded: bool,
}

impl FabMenu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn drawers_locked(&self) -> bool {
        self.expanded
    }

    /// Expand the menu. `None` if it was already expanded.
    pub fn expand(&mut self) -> Option<MenuEvent> {
        self.set(true)
    }

    /// Collapse the menu. `None` if it was already collapsed.
    pub fn collapse(&mut self) -> Option<MenuEvent> {
        self.set(false)
    }

    pub fn toggle(&mut self) -> MenuEvent {
        let expanded = !self.expanded;
        self.expanded = expanded;
        debug!(expanded, "Fab menu toggled");
        Self::event_for(expanded)
    }

    fn set(&mut self, expanded: bool) -> Option<MenuEvent> {
        if self.expanded == expanded {
            return None;
        }
        self.expanded = expanded;
        debug!(expanded, "Fab menu changed");
        Some(Self::event_for(expanded))
    }

    fn event_for(expanded: bool) -> MenuEvent {
        if expanded {
            MenuEvent::MenuExpanded
        } else {
            MenuEvent::MenuCollapsed
        }
    }
}
