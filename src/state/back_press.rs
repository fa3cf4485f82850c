//! Double-press-to-exit timing for the root screen.

use std::time::{Duration, Instant};
use tracing::info;

/// Default window in which a second press exits.
pub const DEFAULT_EXIT_INTERVAL: Duration = Duration::from_millis(2000);

/// What a back press on the root list should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackPressDecision {
    /// Show the "press again to exit" notice and stay.
    ShowNotice,
    /// Second press inside the window: let the exit through.
    Exit,
}

/// Remembers when the exit notice was last shown.
#[derive(Debug, Clone)]
pub struct BackPressGuard {
    interval: Duration,
    last_notice: Option<Instant>,
}

impl Default for BackPressGuard {
    fn default() -> Self {
        Self::new(DEFAULT_EXIT_INTERVAL)
    }
}

impl BackPressGuard {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_notice: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Register a back press at `now`.
    ///
    /// A press more than `interval` after the last notice starts over and
    /// shows the notice again.
    pub fn on_back(&mut self, now: Instant) -> BackPressDecision {
        let within_window = self
            .last_notice
            .is_some_and(|shown| now.saturating_duration_since(shown) <= self.interval);

        if within_window {
            info!("Second back press inside exit window");
            self.last_notice = None;
            BackPressDecision::Exit
        } else {
            self.last_notice = Some(now);
            BackPressDecision::ShowNotice
        }
    }

    /// Forget any pending notice.
    pub fn reset(&mut self) {
        self.last_notice = None;
    }
}
