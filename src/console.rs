//! Line-oriented console front end.
//!
//! [`ConsoleRenderer`] prints whatever the screen renders, one line per
//! update; [`run`] feeds typed [`Command`]s to a [`ListScreen`].

use crate::command::{Command, HELP};
use crate::gateway::FetchGateway;
use crate::model::{AppError, CatalogEntry, FetchError};
use crate::registry::{QuickSearch, QuickSearchRegistry, SearchHistory};
use crate::screen::{BackOutcome, DrawerHighlight, LaunchMode, ListScreen, Notice, Renderer};
use crate::state::{
    BarAppearance, FabIcon, LoadStatus, MenuEvent, PageCount, SearchMode, ViewAction,
};
use std::io::{self, BufRead, Write};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

// ===== Formatting =====

pub fn describe_action(action: &ViewAction) -> String {
    match action {
        ViewAction::SwitchBarAppearance(bar) => format!("bar({})", describe_bar(*bar)),
        ViewAction::RepositionSearchBar => "reposition".to_string(),
        ViewAction::ShowResultsPanel => "show-panel".to_string(),
        ViewAction::HideResultsPanel => "hide-panel".to_string(),
        ViewAction::ScrollResultsPanelToTop => "scroll-panel-top".to_string(),
        ViewAction::SetFabIcon(icon) => format!("fab({})", describe_icon(*icon)),
    }
}

fn describe_bar(bar: BarAppearance) -> &'static str {
    match bar {
        BarAppearance::Normal => "normal",
        BarAppearance::ListMode => "list",
        BarAppearance::SearchMode => "search",
    }
}

fn describe_icon(icon: FabIcon) -> &'static str {
    match icon {
        FabIcon::AddOrDelete => "add-or-delete",
        FabIcon::Search => "search",
    }
}

fn describe_status(status: LoadStatus) -> &'static str {
    match status {
        LoadStatus::Idle => "idle",
        LoadStatus::Loading => "loading",
        LoadStatus::Error => "error",
        LoadStatus::Empty => "empty",
    }
}

/// "page 2 of 5" style indicator, 1-based for display.
pub fn describe_page(current_page: usize, page_count: PageCount) -> String {
    format!("page {} of {}", current_page + 1, page_count)
}

// ===== ConsoleRenderer =====

/// Renderer writing plain text lines.
///
/// Write failures are kept and surfaced through [`Self::take_error`] so the
/// screen's render calls stay infallible.
#[derive(Debug)]
pub struct ConsoleRenderer<W> {
    out: W,
    error: Option<io::Error>,
}

impl<W: Write> ConsoleRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out, error: None }
    }

    pub fn line(&mut self, text: &str) {
        if self.error.is_some() {
            return;
        }
        if let Err(err) = writeln!(self.out, "{text}").and_then(|()| self.out.flush()) {
            self.error = Some(err);
        }
    }

    /// First write error since the last call, if any.
    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for ConsoleRenderer<W> {
    fn apply_actions(&mut self, actions: &[ViewAction]) {
        let described: Vec<String> = actions.iter().map(describe_action).collect();
        self.line(&format!("view: {}", described.join(", ")));
    }

    fn render_items(&mut self, items: &[CatalogEntry]) {
        if items.is_empty() {
            return;
        }
        for entry in items {
            self.line(&format!(
                "  #{} {} [{:?}] by {} ({} favs)",
                entry.id, entry.title, entry.category, entry.uploader, entry.favorites
            ));
        }
    }

    fn render_load_status(&mut self, status: LoadStatus) {
        self.line(&format!("status: {}", describe_status(status)));
    }

    fn render_page_indicator(&mut self, current_page: usize, page_count: PageCount) {
        self.line(&describe_page(current_page, page_count));
    }

    fn render_menu(&mut self, event: MenuEvent) {
        let text = match event {
            MenuEvent::MenuExpanded => "menu: expanded, drawers locked",
            MenuEvent::MenuCollapsed => "menu: collapsed, drawers unlocked",
        };
        self.line(text);
    }

    fn render_drawer_highlight(&mut self, highlight: DrawerHighlight) {
        let name = match highlight {
            DrawerHighlight::Homepage => "homepage",
            DrawerHighlight::WhatsHot => "whats-hot",
            DrawerHighlight::None => "none",
        };
        self.line(&format!("drawer: {name}"));
    }

    fn render_quick_searches(&mut self, searches: &[QuickSearch]) {
        if searches.is_empty() {
            self.line("quick searches: none");
            return;
        }
        let listed: Vec<String> = searches
            .iter()
            .enumerate()
            .map(|(i, q)| format!("{i}) {}", q.name))
            .collect();
        self.line(&format!("quick searches: {}", listed.join(", ")));
    }

    fn offer_go_to(&mut self, current_page: usize, page_count: PageCount) {
        self.line(&format!(
            "jump: {}; enter 'goto <page>' (0-based)",
            describe_page(current_page, page_count)
        ));
    }

    fn show_notice(&mut self, notice: &Notice) {
        self.line(&format!("notice: {notice}"));
    }

    fn show_error(&mut self, error: &FetchError) {
        self.line(&format!("error: {error}"));
    }
}

// ===== REPL =====

/// Whether the loop keeps going after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Apply one command to the screen.
pub fn execute<G, Q, H, W>(
    screen: &mut ListScreen<G, Q, H, ConsoleRenderer<W>>,
    command: Command,
) -> Flow
where
    G: FetchGateway,
    Q: QuickSearchRegistry,
    H: SearchHistory,
    W: Write,
{
    debug!(?command, "Executing command");
    match command {
        Command::Title => screen.title_tapped(),
        Command::SearchIcon => screen.search_icon_tapped(),
        Command::Field => screen.query_field_tapped(),
        Command::Text(text) => screen.set_bar_text(text),
        Command::Submit(text) => {
            let text = text.unwrap_or_else(|| screen.bar_text().to_string());
            screen.set_bar_text(text.clone());
            if !screen.submit(&text) {
                screen.renderer_mut().line("submit: ignored");
            }
        }
        Command::Back => match screen.back(Instant::now(), 1) {
            BackOutcome::Propagate => return Flow::Exit,
            BackOutcome::Transitioned(mode) => {
                screen.renderer_mut().line(&format!("mode: {}", mode));
            }
            BackOutcome::CollapsedMenu | BackOutcome::ShowedExitNotice => {}
        },
        Command::Fab => screen.corner_fab(),
        Command::Refresh => {
            screen.refresh_fab();
        }
        Command::Jump => {
            if !screen.go_to_fab() {
                screen
                    .renderer_mut()
                    .line("jump: unavailable until the page count is known");
            }
        }
        Command::Next => {
            let _ = screen.next_page();
        }
        Command::Prev => {
            let _ = screen.prev_page();
        }
        Command::GoTo(page) => {
            let _ = screen.go_to(page);
        }
        Command::Retry => {
            let _ = screen.retry();
        }
        Command::Quick(index) => {
            let _ = screen.select_quick_search(index);
        }
        Command::Save(name) => {
            let _ = screen.add_quick_search(&name);
        }
        Command::SavePanel(name) => {
            let _ = screen.add_quick_search_from_panel(&name);
        }
        Command::Tag(on) => screen.panel_mut().specify_tag = on,
        Command::Uploader(on) => screen.panel_mut().specify_uploader = on,
        Command::Home => screen.open(LaunchMode::Homepage),
        Command::Popular => screen.open(LaunchMode::Popular),
        Command::Status => print_status(screen),
        Command::Help => {
            for line in HELP.lines() {
                screen.renderer_mut().line(line);
            }
        }
        Command::Quit => return Flow::Exit,
    }
    Flow::Continue
}

fn print_status<G, Q, H, W>(screen: &mut ListScreen<G, Q, H, ConsoleRenderer<W>>)
where
    G: FetchGateway,
    Q: QuickSearchRegistry,
    H: SearchHistory,
    W: Write,
{
    let mode = screen.mode();
    let panel = if mode == SearchMode::Normal {
        String::new()
    } else {
        format!(" panel={:?}", screen.panel())
    };
    let lines = [
        format!(
            "mode: {mode}, fab: {}, menu: {}{panel}",
            describe_icon(screen.fab_icon()),
            if screen.menu().is_expanded() { "expanded" } else { "collapsed" },
        ),
        format!(
            "query: {}, {}, status: {}, failures: {}",
            screen.controller().query(),
            describe_page(screen.controller().current_page(), screen.controller().page_count()),
            describe_status(screen.controller().status()),
            screen.controller().consecutive_failures(),
        ),
        format!("history: {}", screen.history().recent().join(", ")),
    ];
    for line in &lines {
        screen.renderer_mut().line(line);
    }
}

/// Read commands from `input` until `quit`, an exiting back press, or EOF.
///
/// After each command, waits up to `settle` for the outstanding fetch so its
/// output appears before the next prompt.
///
/// # Errors
///
/// Input read failures and output write failures.
pub fn run<G, Q, H, W>(
    screen: &mut ListScreen<G, Q, H, ConsoleRenderer<W>>,
    input: impl BufRead,
    settle: Duration,
) -> Result<(), AppError>
where
    G: FetchGateway,
    Q: QuickSearchRegistry,
    H: SearchHistory,
    W: Write,
{
    for line in input.lines() {
        let line = line?;
        let flow = match Command::parse(&line) {
            Ok(Some(command)) => execute(screen, command),
            Ok(None) => Flow::Continue,
            Err(err) => {
                screen.renderer_mut().line(&format!("? {err}"));
                Flow::Continue
            }
        };

        if !screen.wait_idle(settle) {
            warn!(?settle, "Fetch still outstanding after settle timeout");
        }
        if let Some(err) = screen.renderer_mut().take_error() {
            return Err(err.into());
        }
        if flow == Flow::Exit {
            break;
        }
    }
    Ok(())
}
