//! Screen state owners (pure).
//!
//! Nothing in here performs I/O. The page controller talks to the outside
//! world only through its [`FetchGateway`](crate::gateway::FetchGateway);
//! everything else is plain data plus transition functions.

pub mod back_press;
pub mod fab_menu;
pub mod pagination;
pub mod search_view;
pub mod submit;
pub mod transition_table;

pub use back_press::{BackPressDecision, BackPressGuard, DEFAULT_EXIT_INTERVAL};
pub use fab_menu::{FabMenu, MenuEvent};
pub use pagination::{
    next_page_count, ApplyOutcome, LoadStatus, PageCount, PageRequest, PaginationController,
    RequestType,
};
pub use search_view::SearchViewStateMachine;
pub use submit::{plan_submission, PanelMode, SearchPanel};
pub use transition_table::{
    BarAppearance, Cell, FabIcon, SearchMode, TransitionTable, TransitionTableError, ViewAction,
    ViewEvent,
};
