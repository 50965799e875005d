//! Ctrl+C handling shared by the CLI and the dashboard.
//!
//! The handler only sets a flag; whoever owns the screen decides how to
//! react. A second Ctrl+C force-exits, running the registered restore
//! hook first so the terminal is never left in raw mode.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

static INTERRUPTED: AtomicBool = AtomicBool::new(false);
static RESTORE_HOOK: OnceLock<Box<dyn Fn() + Send + Sync>> = OnceLock::new();

#[derive(Debug)]
pub struct InterruptedError;

impl std::fmt::Display for InterruptedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Interrupted")
    }
}

impl std::error::Error for InterruptedError {}

/// Installs the Ctrl+C handler.
///
/// # Panics
/// Panics if registering the handler fails.
pub fn init() {
    ctrlc::set_handler(|| {
        if INTERRUPTED.swap(true, Ordering::SeqCst) {
            // Second interrupt - force exit. Restore the terminal first
            // since process::exit() bypasses Drop handlers.
            if let Some(hook) = RESTORE_HOOK.get() {
                hook();
            }
            std::process::exit(130);
        }
    })
    .expect("Error setting Ctrl+C handler");
}

/// Checks if an interrupt has been requested.
pub fn is_interrupted() -> bool {
    INTERRUPTED.load(Ordering::SeqCst)
}

/// Resets the interrupt flag.
pub fn reset() {
    INTERRUPTED.store(false, Ordering::SeqCst);
}

/// Registers a hook called on the second Ctrl+C before exit.
///
/// Used by the dashboard to restore terminal state.
pub fn set_restore_hook<F>(hook: F)
where
    F: Fn() + Send + Sync + 'static,
{
    let _ = RESTORE_HOOK.set(Box::new(hook));
}
