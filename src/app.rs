//! Application state and navigation logic.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::runtime::Handle;
use tracing::info;

use crate::data::{HistoryView, LiveState, RecordCount};
use crate::history::HistoryLoader;
use crate::poller::{LivePoller, PollerConfig, PollerHandle};
use crate::source::ReadingSource;
use crate::ui::Theme;

/// How long a status-bar message stays visible.
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

/// The current view/tab in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Latest reading with its band, polled on a timer.
    Live,
    /// Chart of the last N readings, loaded on demand.
    History,
}

impl View {
    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Live => View::History,
            View::History => View::Live,
        }
    }

    /// Cycle to the previous view.
    pub fn prev(self) -> Self {
        // Two views: previous and next coincide.
        self.next()
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Live => "Live",
            View::History => "History",
        }
    }
}

/// Main application state.
///
/// The live poller only runs while the live view is active. Entering the
/// history view issues a load; leaving it leaves nothing running.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,

    source: Arc<dyn ReadingSource>,
    poller_config: PollerConfig,
    poller: Option<PollerHandle>,
    history: Arc<HistoryLoader>,
    runtime: Handle,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create the app and start in the live view.
    ///
    /// Background work (polling, history loads) is spawned on `runtime`.
    pub fn new(
        source: Arc<dyn ReadingSource>,
        poller_config: PollerConfig,
        history: Arc<HistoryLoader>,
        runtime: Handle,
        theme: Theme,
    ) -> Self {
        let mut app = Self {
            running: true,
            current_view: View::Live,
            show_help: false,
            source,
            poller_config,
            poller: None,
            history,
            runtime,
            theme,
            status_message: None,
        };
        app.enter(View::Live);
        app
    }

    /// Returns a description of the current data source.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    /// Current live state. Default (loading) while no poller is running.
    pub fn live(&self) -> LiveState {
        self.poller.as_ref().map(PollerHandle::state).unwrap_or_default()
    }

    /// Current history view.
    pub fn history(&self) -> HistoryView {
        self.history.view()
    }

    /// Record count the next history refresh will request.
    pub fn selected_records(&self) -> RecordCount {
        self.history.selected()
    }

    pub fn is_polling(&self) -> bool {
        self.poller.is_some()
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired.
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < STATUS_MESSAGE_TTL {
                return Some(msg);
            }
        }
        None
    }

    /// Switch to the next view.
    pub fn next_view(&mut self) {
        self.set_view(self.current_view.next());
    }

    /// Switch to the previous view.
    pub fn prev_view(&mut self) {
        self.set_view(self.current_view.prev());
    }

    /// Switch to a specific view, stopping or starting background work.
    pub fn set_view(&mut self, view: View) {
        if view == self.current_view {
            return;
        }
        self.leave(self.current_view);
        self.current_view = view;
        self.enter(view);
    }

    fn enter(&mut self, view: View) {
        match view {
            View::Live => {
                let _guard = self.runtime.enter();
                self.poller = Some(LivePoller::spawn(
                    Arc::clone(&self.source),
                    self.poller_config,
                ));
            }
            View::History => self.refresh_history(),
        }
    }

    fn leave(&mut self, view: View) {
        if view == View::Live {
            if let Some(poller) = self.poller.take() {
                info!("Leaving live view, stopping poller");
                poller.stop();
            }
        }
    }

    /// Select the next larger record count. Takes effect on refresh.
    pub fn increase_records(&mut self) {
        self.change_records(RecordCount::next);
    }

    /// Select the next smaller record count. Takes effect on refresh.
    pub fn decrease_records(&mut self) {
        self.change_records(RecordCount::prev);
    }

    fn change_records(&mut self, step: fn(RecordCount) -> RecordCount) {
        if self.current_view != View::History {
            return;
        }
        let count = step(self.history.selected());
        self.history.select(count);
        self.set_status_message(format!("Records: {} (r to refresh)", count.get()));
    }

    /// Reload history with the selected record count.
    pub fn refresh_history(&mut self) {
        let _guard = self.runtime.enter();
        self.history.spawn_refresh();
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.leave(self.current_view);
        self.running = false;
    }
}
