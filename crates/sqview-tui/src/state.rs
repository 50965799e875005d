//! Application state composition.
//!
//! State is split between `DashState` (the dashboard proper) and
//! `Option<Overlay>` (modal screens). `AppState` combines both so overlay
//! handling can take the overlay and the dashboard state without borrow
//! conflicts.
//!
//! ```text
//! AppState
//! ├── dash: DashState
//! │   ├── queue: QueueState     (squeue rows, cursor, refresh status)
//! │   ├── stdout_pane: LogPane  (path, viewport, scroll, errors)
//! │   ├── stderr_pane: LogPane
//! │   └── opened_job / selected_node
//! └── overlay: Option<Overlay>  (help, sacct detail)
//! ```

use std::path::PathBuf;

use chrono::{DateTime, Local};
use sqview_core::config::Config;
use sqview_core::logs::LogViewport;
use sqview_core::queue::JobRecord;

/// Combined application state for the TUI.
pub struct AppState {
    pub dash: DashState,
    pub overlay: Option<Overlay>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            dash: DashState::new(config),
            overlay: None,
        }
    }
}

/// Modal overlays, rendered on top of the dashboard.
pub enum Overlay {
    Help,
    JobDetail(JobDetailState),
}

/// State of the sacct job detail overlay.
pub struct JobDetailState {
    pub job_id: String,
    /// `None` while the sacct call is in flight.
    pub content: Option<String>,
    pub error: Option<String>,
}

/// Which log stream a pane shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTab {
    Stdout,
    Stderr,
}

impl LogTab {
    pub fn title(self) -> &'static str {
        match self {
            LogTab::Stdout => "STDOUT",
            LogTab::Stderr => "STDERR",
        }
    }

    pub fn other(self) -> Self {
        match self {
            LogTab::Stdout => LogTab::Stderr,
            LogTab::Stderr => LogTab::Stdout,
        }
    }

    pub fn index(self) -> usize {
        match self {
            LogTab::Stdout => 0,
            LogTab::Stderr => 1,
        }
    }
}

/// Dashboard state (everything except overlays).
pub struct DashState {
    /// Flag indicating the app should quit.
    pub should_quit: bool,
    pub config: Config,
    pub queue: QueueState,
    pub active_tab: LogTab,
    pub stdout_pane: LogPane,
    pub stderr_pane: LogPane,
    /// The job whose logs the panes show. Independent of the table
    /// cursor: moving the cursor does not reload logs until Enter.
    pub opened_job: Option<JobRecord>,
    /// Node index the panes show, for multi-node jobs.
    pub selected_node: usize,
    /// Spinner animation frame counter.
    pub spinner_frame: usize,
    /// Inner height of the log pane, set during the Frame event so the
    /// reducer and renderer agree on scroll math.
    pub log_height: usize,
    /// Accumulated mouse wheel delta, applied once per frame.
    pub scroll_accumulator: i32,
}

impl DashState {
    pub fn new(config: Config) -> Self {
        Self {
            should_quit: false,
            config,
            queue: QueueState::default(),
            active_tab: LogTab::Stdout,
            stdout_pane: LogPane::default(),
            stderr_pane: LogPane::default(),
            opened_job: None,
            selected_node: 0,
            spinner_frame: 0,
            log_height: 0,
            scroll_accumulator: 0,
        }
    }

    pub fn pane(&self, tab: LogTab) -> &LogPane {
        match tab {
            LogTab::Stdout => &self.stdout_pane,
            LogTab::Stderr => &self.stderr_pane,
        }
    }

    pub fn pane_mut(&mut self, tab: LogTab) -> &mut LogPane {
        match tab {
            LogTab::Stdout => &mut self.stdout_pane,
            LogTab::Stderr => &mut self.stderr_pane,
        }
    }

    pub fn active_pane(&self) -> &LogPane {
        self.pane(self.active_tab)
    }

    pub fn active_pane_mut(&mut self) -> &mut LogPane {
        self.pane_mut(self.active_tab)
    }
}

/// squeue listing state.
#[derive(Default)]
pub struct QueueState {
    pub jobs: Vec<JobRecord>,
    /// Table cursor.
    pub selected: usize,
    pub loading: bool,
    pub error: Option<String>,
    pub refreshed_at: Option<DateTime<Local>>,
}

impl QueueState {
    pub fn selected_job(&self) -> Option<&JobRecord> {
        self.jobs.get(self.selected)
    }

    pub fn select_next(&mut self) {
        if !self.jobs.is_empty() {
            self.selected = (self.selected + 1).min(self.jobs.len() - 1);
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }
}

/// One log stream pane: a viewport plus the host-side scroll offset.
#[derive(Default)]
pub struct LogPane {
    /// Path of the log being (or last successfully) shown.
    pub path: Option<PathBuf>,
    pub view: Option<LogViewport>,
    /// Scroll offset into the viewport's display buffer.
    pub scroll: usize,
    pub loading: bool,
    /// Last load failure. Content from the previous successful load is
    /// kept; a failed load never blanks the pane.
    pub error: Option<String>,
    /// Placeholder shown instead of content (job not running, stream not
    /// configured).
    pub notice: Option<String>,
}

impl LogPane {
    /// Replaces content with a placeholder message.
    pub fn show_notice(&mut self, text: String) {
        self.path = None;
        self.view = None;
        self.scroll = 0;
        self.loading = false;
        self.error = None;
        self.notice = Some(text);
    }

    /// Marks a load in flight. Existing content stays visible until the
    /// replacement arrives.
    pub fn begin_load(&mut self, path: PathBuf) {
        self.path = Some(path);
        self.loading = true;
        self.notice = None;
    }

    /// Largest valid scroll offset for a pane of `height` rows.
    pub fn max_scroll(&self, height: usize) -> usize {
        self.view
            .as_ref()
            .map_or(0, |v| v.display().len().saturating_sub(height))
    }

    pub fn clamp_scroll(&mut self, height: usize) {
        self.scroll = self.scroll.min(self.max_scroll(height));
    }

    pub fn scroll_by(&mut self, delta: i32, height: usize) {
        if delta < 0 {
            self.scroll = self.scroll.saturating_sub(delta.unsigned_abs() as usize);
        } else {
            self.scroll = (self.scroll + delta as usize).min(self.max_scroll(height));
        }
    }
}
