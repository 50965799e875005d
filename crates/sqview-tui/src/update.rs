//! TUI reducer (update function).
//!
//! All state mutations happen here. The runtime calls `update(app, event)`
//! and executes the returned effects.
//!
//! This is also where the host side of the log viewport contract lives:
//! every Frame the visible position is reported to the active viewport,
//! and any scroll compensation it returns (lines inserted above the view
//! by a top expansion) is applied immediately so the watched line never
//! jumps.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, MouseEventKind};
use sqview_core::logs::HostScroll;

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::render;
use crate::state::{AppState, DashState, JobDetailState, LogTab, Overlay};

/// Lines to scroll per mouse wheel tick.
const MOUSE_SCROLL_LINES: i32 = 3;

/// The main reducer function.
///
/// Takes the current state and an event, mutates state, and returns
/// effects for the runtime to execute.
pub fn update(app: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    match event {
        UiEvent::Tick => {
            app.dash.spinner_frame = app.dash.spinner_frame.wrapping_add(1);
            vec![]
        }
        UiEvent::Frame { height, .. } => {
            handle_frame(&mut app.dash, height);
            vec![]
        }
        UiEvent::Terminal(term_event) => handle_terminal_event(app, term_event),
        UiEvent::QueueLoaded(jobs) => {
            let queue = &mut app.dash.queue;
            queue.jobs = jobs;
            if !queue.jobs.is_empty() {
                queue.selected = queue.selected.min(queue.jobs.len() - 1);
            } else {
                queue.selected = 0;
            }
            queue.loading = false;
            queue.error = None;
            queue.refreshed_at = Some(chrono::Local::now());
            vec![]
        }
        UiEvent::QueueFailed(error) => {
            app.dash.queue.loading = false;
            app.dash.queue.error = Some(error);
            vec![]
        }
        UiEvent::LogLoaded { tab, path, view } => {
            let pane = app.dash.pane_mut(tab);
            // A load that finished after the pane moved on is stale.
            if pane.path.as_deref() == Some(path.as_path()) {
                pane.view = Some(*view);
                pane.scroll = 0;
                pane.loading = false;
                pane.error = None;
                pane.notice = None;
            }
            vec![]
        }
        UiEvent::LogFailed { tab, path, error } => {
            let pane = app.dash.pane_mut(tab);
            if pane.path.as_deref() == Some(path.as_path()) {
                // Previously loaded content stays; only the error is shown.
                pane.loading = false;
                pane.error = Some(error);
            }
            vec![]
        }
        UiEvent::DetailLoaded { job_id, detail } => {
            if let Some(Overlay::JobDetail(state)) = &mut app.overlay
                && state.job_id == job_id
            {
                state.content = Some(detail);
            }
            vec![]
        }
        UiEvent::DetailFailed { job_id, error } => {
            if let Some(Overlay::JobDetail(state)) = &mut app.overlay
                && state.job_id == job_id
            {
                state.error = Some(error);
            }
            vec![]
        }
    }
}

// ============================================================================
// Frame Handler (scroll coalescing, viewport sync)
// ============================================================================

/// Per-frame housekeeping: records the log pane height, applies the
/// accumulated wheel delta, and reports the visible position to the
/// active viewport.
fn handle_frame(dash: &mut DashState, terminal_height: u16) {
    dash.log_height = render::log_pane_height(dash, terminal_height);

    let delta = std::mem::take(&mut dash.scroll_accumulator);
    let height = dash.log_height;
    if delta != 0 {
        dash.active_pane_mut().scroll_by(delta, height);
    }

    sync_active_viewport(dash);
}

/// Reports the top and bottom visible rows to the active viewport and
/// applies any compensation it demands. Reporting both screen edges
/// mirrors the per-row sweep of the reference behavior and keeps both
/// expansion triggers height-independent.
fn sync_active_viewport(dash: &mut DashState) {
    let height = dash.log_height;
    let pane = dash.active_pane_mut();
    pane.clamp_scroll(height);
    let Some(view) = pane.view.as_mut() else {
        return;
    };

    if let Some(HostScroll::Down(n)) = view.report_visible_position(pane.scroll) {
        pane.scroll += n;
    }
    let bottom_row = pane.scroll + height.saturating_sub(1);
    if let Some(HostScroll::Down(n)) = view.report_visible_position(bottom_row) {
        pane.scroll += n;
    }
}

/// Jumps the active pane to the top or bottom of the file.
fn jump(dash: &mut DashState, to_top: bool) {
    let height = dash.log_height;
    let pane = dash.active_pane_mut();
    let Some(view) = pane.view.as_mut() else {
        return;
    };
    let adjust = if to_top {
        view.goto_top()
    } else {
        view.goto_bottom()
    };
    match adjust {
        HostScroll::ToTop => pane.scroll = 0,
        HostScroll::ToBottom => pane.scroll = view.display().len().saturating_sub(height),
        HostScroll::Down(n) => pane.scroll += n,
    }
}

// ============================================================================
// Job Selection
// ============================================================================

/// Opens the job under the table cursor in the log panes.
fn open_selected_job(dash: &mut DashState) -> Vec<UiEffect> {
    let Some(job) = dash.queue.selected_job().cloned() else {
        return vec![];
    };
    dash.selected_node = 0;
    dash.opened_job = Some(job);
    load_opened_logs(dash)
}

/// (Re)loads both streams of the opened job for the selected node.
fn load_opened_logs(dash: &mut DashState) -> Vec<UiEffect> {
    let Some(job) = dash.opened_job.clone() else {
        return vec![];
    };

    if !job.is_running() {
        let notice = format!(
            "Job {} has not started yet (state: {})",
            job.job_id, job.state
        );
        dash.stdout_pane.show_notice(notice.clone());
        dash.stderr_pane.show_notice(notice);
        return vec![];
    }

    let mut effects = Vec::new();
    let node = dash.selected_node;
    for (tab, paths) in [
        (LogTab::Stdout, job.stdout_paths()),
        (LogTab::Stderr, job.stderr_paths()),
    ] {
        let pane = dash.pane_mut(tab);
        match paths.get(node) {
            None => pane.show_notice(format!(
                "No {} log file configured for job {}",
                tab.title(),
                job.job_id
            )),
            Some(path) => {
                pane.begin_load(path.clone());
                effects.push(UiEffect::LoadLog {
                    tab,
                    path: path.clone(),
                });
            }
        }
    }
    effects
}

/// Cycles the shown node for multi-node jobs and reloads both streams.
fn cycle_node(dash: &mut DashState, step: i64) -> Vec<UiEffect> {
    let Some(job) = &dash.opened_job else {
        return vec![];
    };
    let nodes = job.num_nodes.max(1) as i64;
    if nodes <= 1 {
        return vec![];
    }
    dash.selected_node = (dash.selected_node as i64 + step).rem_euclid(nodes) as usize;
    load_opened_logs(dash)
}

// ============================================================================
// Terminal Event Handlers
// ============================================================================

fn handle_terminal_event(app: &mut AppState, event: Event) -> Vec<UiEffect> {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => handle_key(app, key),
        Event::Mouse(mouse) => {
            match mouse.kind {
                MouseEventKind::ScrollUp => app.dash.scroll_accumulator -= MOUSE_SCROLL_LINES,
                MouseEventKind::ScrollDown => app.dash.scroll_accumulator += MOUSE_SCROLL_LINES,
                _ => {}
            }
            vec![]
        }
        // Resize is handled implicitly: the next Frame recomputes layout.
        _ => vec![],
    }
}

fn handle_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    if app.overlay.is_some() {
        if matches!(
            key.code,
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q' | 'h' | '?' | 'i')
        ) {
            app.overlay = None;
        }
        return vec![];
    }

    let dash = &mut app.dash;
    match key.code {
        KeyCode::Char('q') => vec![UiEffect::Quit],
        KeyCode::Char('r') => {
            dash.queue.loading = true;
            vec![UiEffect::RefreshQueue]
        }
        KeyCode::Char('l') => load_opened_logs(dash),
        KeyCode::Tab => {
            dash.active_tab = dash.active_tab.other();
            vec![]
        }
        KeyCode::Up | KeyCode::Char('k') => {
            dash.queue.select_prev();
            vec![]
        }
        KeyCode::Down | KeyCode::Char('j') => {
            dash.queue.select_next();
            vec![]
        }
        KeyCode::Enter => open_selected_job(dash),
        KeyCode::Char('t') => {
            jump(dash, true);
            vec![]
        }
        KeyCode::Char('b') => {
            jump(dash, false);
            vec![]
        }
        KeyCode::PageUp => {
            let height = dash.log_height;
            dash.active_pane_mut().scroll_by(-(height as i32), height);
            vec![]
        }
        KeyCode::PageDown => {
            let height = dash.log_height;
            dash.active_pane_mut().scroll_by(height as i32, height);
            vec![]
        }
        KeyCode::Char('[') => cycle_node(dash, -1),
        KeyCode::Char(']') => cycle_node(dash, 1),
        KeyCode::Char('h' | '?') => {
            app.overlay = Some(Overlay::Help);
            vec![]
        }
        KeyCode::Char('i') => {
            let Some(job) = dash.queue.selected_job() else {
                return vec![];
            };
            let job_id = job.job_id.clone();
            app.overlay = Some(Overlay::JobDetail(JobDetailState {
                job_id: job_id.clone(),
                content: None,
                error: None,
            }));
            vec![UiEffect::LoadDetail { job_id }]
        }
        _ => vec![],
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crossterm::event::KeyModifiers;
    use sqview_core::config::Config;
    use sqview_core::logs::{LineStore, LogViewport};
    use sqview_core::queue::parse_queue;

    use super::*;

    fn app() -> AppState {
        AppState::new(Config::default())
    }

    fn key(code: KeyCode) -> UiEvent {
        UiEvent::Terminal(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    fn numbered_viewport(dir: &tempfile::TempDir, lines: usize, buffer: usize) -> LogViewport {
        let path = dir.path().join("job.out");
        let contents: String = (0..lines).map(|i| format!("line {i}\n")).collect();
        std::fs::write(&path, contents).unwrap();
        LogViewport::new(LineStore::load(&path).unwrap(), buffer, 50)
    }

    fn sample_jobs(states: &[&str]) -> Vec<sqview_core::queue::JobRecord> {
        let header = "H|H|H|H|H|H|H|H|H|H|H";
        let rows: String = states
            .iter()
            .enumerate()
            .map(|(i, state)| {
                format!("{i}|{i}|N/A|learn|job{i}|{state}|1:00|1|node0{i}|/logs/%j.out|/logs/%j.err\n")
            })
            .collect();
        parse_queue(&format!("{header}\n{rows}")).unwrap()
    }

    #[test]
    fn quit_key_emits_quit() {
        let mut app = app();
        let effects = update(&mut app, key(KeyCode::Char('q')));
        assert!(matches!(effects[..], [UiEffect::Quit]));
    }

    #[test]
    fn refresh_key_marks_loading_and_requests_queue() {
        let mut app = app();
        let effects = update(&mut app, key(KeyCode::Char('r')));
        assert!(app.dash.queue.loading);
        assert!(matches!(effects[..], [UiEffect::RefreshQueue]));
    }

    #[test]
    fn queue_loaded_clamps_cursor() {
        let mut app = app();
        app.dash.queue.selected = 5;
        update(&mut app, UiEvent::QueueLoaded(sample_jobs(&["RUNNING"])));
        assert_eq!(app.dash.queue.selected, 0);
        assert!(app.dash.queue.refreshed_at.is_some());
    }

    #[test]
    fn enter_on_running_job_requests_both_streams() {
        let mut app = app();
        update(&mut app, UiEvent::QueueLoaded(sample_jobs(&["RUNNING"])));
        let effects = update(&mut app, key(KeyCode::Enter));
        assert_eq!(effects.len(), 2);
        assert!(app.dash.stdout_pane.loading);
        assert_eq!(
            app.dash.stdout_pane.path,
            Some(PathBuf::from("/logs/0.out"))
        );
        assert!(matches!(
            effects[0],
            UiEffect::LoadLog {
                tab: LogTab::Stdout,
                ..
            }
        ));
    }

    #[test]
    fn enter_on_pending_job_shows_notice() {
        let mut app = app();
        update(&mut app, UiEvent::QueueLoaded(sample_jobs(&["PENDING"])));
        let effects = update(&mut app, key(KeyCode::Enter));
        assert!(effects.is_empty());
        let notice = app.dash.stdout_pane.notice.as_deref().unwrap();
        assert!(notice.contains("PENDING"));
    }

    #[test]
    fn stale_log_load_is_ignored() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut app = app();
        app.dash.stdout_pane.begin_load(PathBuf::from("/logs/current.out"));
        update(
            &mut app,
            UiEvent::LogLoaded {
                tab: LogTab::Stdout,
                path: PathBuf::from("/logs/old.out"),
                view: Box::new(numbered_viewport(&dir, 10, 500)),
            },
        );
        assert!(app.dash.stdout_pane.view.is_none());
        assert!(app.dash.stdout_pane.loading);
    }

    #[test]
    fn failed_load_keeps_previous_content() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut app = app();
        let path = PathBuf::from("/logs/job.out");
        app.dash.stdout_pane.begin_load(path.clone());
        update(
            &mut app,
            UiEvent::LogLoaded {
                tab: LogTab::Stdout,
                path: path.clone(),
                view: Box::new(numbered_viewport(&dir, 10, 500)),
            },
        );
        assert!(app.dash.stdout_pane.view.is_some());

        app.dash.stdout_pane.begin_load(path.clone());
        update(
            &mut app,
            UiEvent::LogFailed {
                tab: LogTab::Stdout,
                path,
                error: "log file not found".to_string(),
            },
        );
        let pane = &app.dash.stdout_pane;
        assert!(pane.view.is_some());
        assert_eq!(pane.error.as_deref(), Some("log file not found"));
        assert!(!pane.loading);
    }

    #[test]
    fn wheel_delta_is_coalesced_and_applied_on_frame() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut app = app();
        app.dash.stdout_pane.view = Some(numbered_viewport(&dir, 1000, 500));

        for _ in 0..4 {
            update(
                &mut app,
                UiEvent::Terminal(Event::Mouse(crossterm::event::MouseEvent {
                    kind: MouseEventKind::ScrollDown,
                    column: 0,
                    row: 0,
                    modifiers: KeyModifiers::NONE,
                })),
            );
        }
        assert_eq!(app.dash.scroll_accumulator, 12);

        update(&mut app, UiEvent::Frame { width: 80, height: 40 });
        assert_eq!(app.dash.scroll_accumulator, 0);
        assert_eq!(app.dash.stdout_pane.scroll, 12);
    }

    #[test]
    fn frame_near_top_applies_expansion_compensation() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut app = app();
        let mut view = numbered_viewport(&dir, 1000, 500);
        view.goto_bottom();
        app.dash.stdout_pane.view = Some(view);
        app.dash.stdout_pane.scroll = 10;

        update(&mut app, UiEvent::Frame { width: 80, height: 40 });

        let pane = &app.dash.stdout_pane;
        // 10 < 50 triggered a top expansion of 500 lines; the offset
        // followed so the same text is on screen.
        assert_eq!(pane.scroll, 510);
        assert_eq!(pane.view.as_ref().unwrap().window(), (0, 1000));
    }

    #[test]
    fn goto_bottom_key_anchors_scroll_at_tail() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut app = app();
        app.dash.stdout_pane.view = Some(numbered_viewport(&dir, 1000, 500));
        update(&mut app, UiEvent::Frame { width: 80, height: 40 });
        let height = app.dash.log_height;

        update(&mut app, key(KeyCode::Char('b')));
        let pane = &app.dash.stdout_pane;
        let view = pane.view.as_ref().unwrap();
        assert_eq!(view.window(), (500, 1000));
        assert_eq!(pane.scroll, view.display().len() - height);
    }

    #[test]
    fn help_overlay_opens_and_closes() {
        let mut app = app();
        update(&mut app, key(KeyCode::Char('?')));
        assert!(matches!(app.overlay, Some(Overlay::Help)));
        update(&mut app, key(KeyCode::Esc));
        assert!(app.overlay.is_none());
    }

    #[test]
    fn tab_switches_active_stream() {
        let mut app = app();
        assert_eq!(app.dash.active_tab, LogTab::Stdout);
        update(&mut app, key(KeyCode::Tab));
        assert_eq!(app.dash.active_tab, LogTab::Stderr);
    }
}
