//! Terminal lifecycle management.
//!
//! Handles terminal setup, restore, and panic hooks. Terminal state is
//! guaranteed to be restored on normal exit (via Drop), Ctrl+C, and
//! panic.

use std::io::{self, Stdout};
use std::panic;

use anyhow::{Context, Result};
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

/// Sets up the terminal for the TUI: raw mode, alternate screen, and the
/// terminal instance.
///
/// Call `install_panic_hook()` before this to ensure terminal restore on
/// panic.
///
/// # Errors
/// Returns an error if the operation fails.
pub fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("Failed to create terminal")?;
    Ok(terminal)
}

/// Enables mouse capture for wheel scrolling in the log pane.
///
/// Enabled separately from `setup_terminal()` so normal exit paths can
/// disable it before restoring; `restore_terminal()` also disables it to
/// cover panic and Ctrl+C.
///
/// # Errors
/// Returns an error if the operation fails.
pub fn enable_mouse_capture() -> Result<()> {
    execute!(io::stdout(), EnableMouseCapture).context("Failed to enable mouse capture")?;
    Ok(())
}

/// Disables mouse capture enabled by `enable_mouse_capture()`.
///
/// # Errors
/// Returns an error if the operation fails.
pub fn disable_mouse_capture() -> Result<()> {
    execute!(io::stdout(), DisableMouseCapture).context("Failed to disable mouse capture")?;
    Ok(())
}

/// Restores terminal state. Idempotent and safe to call multiple times.
///
/// # Errors
/// Returns an error if the operation fails.
pub fn restore_terminal() -> Result<()> {
    // Mouse capture must go before leaving raw mode.
    let _ = execute!(io::stdout(), DisableMouseCapture);

    execute!(io::stdout(), LeaveAlternateScreen).context("Failed to leave alternate screen")?;
    disable_raw_mode().context("Failed to disable raw mode")?;
    Ok(())
}

/// Installs a panic hook that restores the terminal before printing the
/// panic.
///
/// Call this BEFORE `setup_terminal()`.
pub fn install_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));
}
