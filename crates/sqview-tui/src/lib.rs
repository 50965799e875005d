//! Full-screen dashboard TUI for sqview.

pub mod effects;
pub mod events;
pub mod render;
pub mod runtime;
pub mod scrollbar;
pub mod state;
pub mod terminal;
pub mod text;
pub mod update;

use std::io::{IsTerminal, stderr};

use anyhow::Result;
pub use runtime::TuiRuntime;
use sqview_core::config::Config;

/// Runs the interactive dashboard until the user quits.
pub fn run_dashboard(config: Config) -> Result<()> {
    // The dashboard owns the terminal; refuse to start without one.
    if !stderr().is_terminal() {
        anyhow::bail!(
            "The dashboard requires a terminal.\n\
             Use `sqview logs <DIR>` for non-interactive log printing."
        );
    }

    let mut runtime = TuiRuntime::new(config)?;
    runtime.run()
}
