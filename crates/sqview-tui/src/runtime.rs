//! TUI runtime - owns terminal, runs event loop, executes effects.
//!
//! This is the "Elm runtime" boundary: all side effects happen here. The
//! reducer stays pure and produces effects; this module executes them.
//!
//! Async results (queue refreshes, log loads, sacct calls) are collected
//! through an "inbox" channel: handlers send `UiEvent`s to `inbox_tx`,
//! and the runtime drains `inbox_rx` each loop iteration. Log loading in
//! particular runs on a blocking task so a large file never stalls the
//! render path; the finished viewport is swapped in whole when its event
//! arrives.

use std::future::Future;
use std::io::Stdout;

use anyhow::{Context, Result};
use crossterm::event;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use sqview_core::config::Config;
use sqview_core::interrupt;
use sqview_core::logs::{LineStore, LogViewport};
use sqview_core::queue;
use tokio::sync::mpsc;
use tracing::debug;

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::state::AppState;
use crate::{render, terminal, update};

/// Target frame rate while something is in flight (60fps = ~16ms).
pub const FRAME_DURATION: std::time::Duration = std::time::Duration::from_millis(16);

/// Poll duration when idle; longer timeout reduces CPU usage when
/// nothing is happening.
pub const IDLE_POLL_DURATION: std::time::Duration = std::time::Duration::from_millis(100);

/// Full-screen TUI runtime.
///
/// Owns the terminal and state. Terminal state is restored on drop,
/// panic, or Ctrl+C.
pub struct TuiRuntime {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    pub state: AppState,
    inbox_tx: mpsc::UnboundedSender<UiEvent>,
    inbox_rx: mpsc::UnboundedReceiver<UiEvent>,
    last_tick: std::time::Instant,
    last_terminal_event: std::time::Instant,
}

impl TuiRuntime {
    /// Creates a new TUI runtime, entering the alternate screen.
    pub fn new(config: Config) -> Result<Self> {
        // Panic hook and restore hook go in BEFORE the alternate screen.
        terminal::install_panic_hook();
        interrupt::set_restore_hook(|| {
            let _ = terminal::restore_terminal();
        });
        interrupt::reset();

        let terminal = terminal::setup_terminal().context("Failed to setup terminal")?;
        let state = AppState::new(config);
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();

        let now = std::time::Instant::now();
        Ok(Self {
            terminal,
            state,
            inbox_tx,
            inbox_rx,
            last_tick: now,
            last_terminal_event: now,
        })
    }

    /// Runs the main event loop until quit.
    pub fn run(&mut self) -> Result<()> {
        terminal::enable_mouse_capture()?;

        // Populate the table right away, like a manual refresh.
        self.state.dash.queue.loading = true;
        self.execute_effect(UiEffect::RefreshQueue);

        let result = self.event_loop();

        let _ = terminal::disable_mouse_capture();
        result
    }

    fn event_loop(&mut self) -> Result<()> {
        let mut dirty = true; // Start dirty to ensure initial render

        while !self.state.dash.should_quit {
            if interrupt::is_interrupted() {
                break;
            }

            let mut events = self.collect_events()?;

            // Prepend Frame with the current terminal size so layout and
            // viewport sync happen before other events.
            let size = self.terminal.size()?;
            events.insert(
                0,
                UiEvent::Frame {
                    width: size.width,
                    height: size.height,
                },
            );

            for event in events {
                if matches!(&event, UiEvent::Terminal(_)) {
                    self.last_terminal_event = std::time::Instant::now();
                }

                // Only Tick triggers a render - this caps the frame rate
                // at tick cadence.
                let marks_dirty = matches!(&event, UiEvent::Tick);
                let effects = update::update(&mut self.state, event);
                if marks_dirty {
                    dirty = true;
                }
                self.execute_effects(effects);
            }

            if dirty {
                self.terminal.draw(|frame| {
                    render::render(&self.state, frame);
                })?;
                dirty = false;
            }
        }

        Ok(())
    }

    // ========================================================================
    // Event Collection
    // ========================================================================

    /// Collects events from the inbox and the terminal, then emits a
    /// Tick when its interval has elapsed.
    fn collect_events(&mut self) -> Result<Vec<UiEvent>> {
        let mut events = Vec::new();

        let dash = &self.state.dash;
        let busy = dash.queue.loading
            || dash.stdout_pane.loading
            || dash.stderr_pane.loading
            || self.last_terminal_event.elapsed() < IDLE_POLL_DURATION;
        let tick_interval = if busy {
            FRAME_DURATION
        } else {
            IDLE_POLL_DURATION
        };

        while let Ok(ev) = self.inbox_rx.try_recv() {
            events.push(ev);
        }

        // Block on terminal input until the next tick is due, unless we
        // already have events to process.
        let time_until_tick = tick_interval.saturating_sub(self.last_tick.elapsed());
        let poll_duration = if events.is_empty() {
            time_until_tick
        } else {
            std::time::Duration::ZERO
        };

        if event::poll(poll_duration)? {
            events.push(UiEvent::Terminal(event::read()?));
            // Drain any remaining buffered events (non-blocking)
            while event::poll(std::time::Duration::ZERO)? {
                events.push(UiEvent::Terminal(event::read()?));
            }
        }

        if self.last_tick.elapsed() >= tick_interval {
            events.push(UiEvent::Tick);
            self.last_tick = std::time::Instant::now();
        }

        Ok(events)
    }

    // ========================================================================
    // Effect Dispatch
    // ========================================================================

    fn execute_effects(&mut self, effects: Vec<UiEffect>) {
        for effect in effects {
            self.execute_effect(effect);
        }
    }

    /// Spawns an async effect whose resulting event lands in the inbox.
    fn spawn_effect<F, Fut>(&self, f: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = UiEvent> + Send + 'static,
    {
        let tx = self.inbox_tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(f().await);
        });
    }

    fn execute_effect(&mut self, effect: UiEffect) {
        match effect {
            UiEffect::Quit => {
                self.state.dash.should_quit = true;
            }
            UiEffect::RefreshQueue => {
                let queue_command = self.state.dash.config.queue_command.clone();
                self.spawn_effect(move || async move {
                    match queue::fetch_queue(queue_command.as_deref()).await {
                        Ok(jobs) => UiEvent::QueueLoaded(jobs),
                        Err(e) => UiEvent::QueueFailed(format!("{e:#}")),
                    }
                });
            }
            UiEffect::LoadLog { tab, path } => {
                let buffer_size = self.state.dash.config.buffer_size;
                let scroll_buffer = self.state.dash.config.scroll_buffer;
                self.spawn_effect(move || async move {
                    debug!(path = %path.display(), "loading log");
                    let load_path = path.clone();
                    let loaded = tokio::task::spawn_blocking(move || {
                        LineStore::load(&load_path)
                            .map(|store| LogViewport::new(store, buffer_size, scroll_buffer))
                    })
                    .await;
                    match loaded {
                        Ok(Ok(view)) => UiEvent::LogLoaded {
                            tab,
                            path,
                            view: Box::new(view),
                        },
                        Ok(Err(e)) => UiEvent::LogFailed {
                            tab,
                            path,
                            error: e.to_string(),
                        },
                        Err(e) => UiEvent::LogFailed {
                            tab,
                            path,
                            error: format!("log load task failed: {e}"),
                        },
                    }
                });
            }
            UiEffect::LoadDetail { job_id } => {
                self.spawn_effect(move || async move {
                    match queue::job_detail(&job_id).await {
                        Ok(detail) => UiEvent::DetailLoaded { job_id, detail },
                        Err(e) => UiEvent::DetailFailed {
                            job_id,
                            error: format!("{e:#}"),
                        },
                    }
                });
            }
        }
    }
}

impl Drop for TuiRuntime {
    fn drop(&mut self) {
        let _ = terminal::restore_terminal();
    }
}
