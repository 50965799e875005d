//! Side effects requested by the reducer.
//!
//! The reducer never performs I/O; it returns these and the runtime
//! executes them, reporting results back as events.

use std::path::PathBuf;

use crate::state::LogTab;

pub enum UiEffect {
    Quit,
    /// Re-run squeue and deliver `QueueLoaded`/`QueueFailed`.
    RefreshQueue,
    /// Load a log file into a fresh viewport off the render path.
    LoadLog { tab: LogTab, path: PathBuf },
    /// Fetch sacct detail for the job overlay.
    LoadDetail { job_id: String },
}
