//! Incremental log viewing.
//!
//! Two pieces: [`store::LineStore`] holds every line of a log file in
//! memory, and [`viewport::LogViewport`] materializes a bounded window of
//! those lines for display, growing the window as the host scrolls toward
//! either edge. The store is cheap to slice; the viewport is what keeps
//! rendering cost bounded for very large files.

pub mod store;
pub mod viewport;

pub use store::{LineStore, LogError};
pub use viewport::{HostScroll, LogViewport};
