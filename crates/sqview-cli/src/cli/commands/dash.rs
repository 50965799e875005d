//! Default command: the full-screen dashboard.

use anyhow::Result;
use sqview_core::config::Config;

pub fn run(config: Config) -> Result<()> {
    sqview_tui::run_dashboard(config)
}
