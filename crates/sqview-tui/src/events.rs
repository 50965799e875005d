//! Event vocabulary for the dashboard.
//!
//! Everything the reducer reacts to arrives as a `UiEvent`: terminal
//! input, the per-loop Frame/Tick pair, and completions of async work
//! (queue refresh, log loads, sacct detail) delivered through the
//! runtime's inbox channel.

use std::path::PathBuf;

use sqview_core::logs::LogViewport;
use sqview_core::queue::JobRecord;

use crate::state::LogTab;

pub enum UiEvent {
    /// Render cadence; the only event that marks the frame dirty.
    Tick,
    /// Start-of-loop housekeeping with the current terminal size.
    Frame { width: u16, height: u16 },
    Terminal(crossterm::event::Event),
    QueueLoaded(Vec<JobRecord>),
    QueueFailed(String),
    /// A log finished loading off the render path; the viewport is
    /// swapped in whole.
    LogLoaded {
        tab: LogTab,
        path: PathBuf,
        view: Box<LogViewport>,
    },
    LogFailed {
        tab: LogTab,
        path: PathBuf,
        error: String,
    },
    DetailLoaded {
        job_id: String,
        detail: String,
    },
    DetailFailed {
        job_id: String,
        error: String,
    },
}
