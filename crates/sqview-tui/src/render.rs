//! Pure view/render functions for the TUI.
//!
//! Functions here take `&AppState` by immutable reference, draw to a
//! ratatui Frame, and never mutate state or return effects. Layout math
//! shared with the reducer (the log pane height) lives here so both sides
//! agree on scroll coordinates.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Row, Table, TableState, Tabs};

use crate::scrollbar::Scrollbar;
use crate::state::{AppState, DashState, JobDetailState, LogPane, Overlay};
use crate::text::truncate_with_ellipsis;

/// Height of the tab strip between table and log pane.
const TABS_HEIGHT: u16 = 1;

/// Height of the status line at the bottom.
const STATUS_HEIGHT: u16 = 1;

/// Borders of the log pane block.
const LOG_BORDERS: u16 = 2;

/// Spinner frames for status line animation.
const SPINNER_FRAMES: &[&str] = &["◐", "◓", "◑", "◒"];

/// Renders the entire TUI to the frame.
pub fn render(app: &AppState, frame: &mut Frame) {
    let area = frame.area();
    let dash = &app.dash;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(table_height(dash, area.height)),
            Constraint::Length(TABS_HEIGHT),
            Constraint::Min(1),
            Constraint::Length(STATUS_HEIGHT),
        ])
        .split(area);

    render_queue_table(dash, frame, chunks[0]);
    render_tabs(dash, frame, chunks[1]);
    render_log_pane(dash, frame, chunks[2]);
    render_status_line(dash, frame, chunks[3]);

    match &app.overlay {
        Some(Overlay::Help) => render_help(frame, area),
        Some(Overlay::JobDetail(state)) => render_job_detail(dash, state, frame, area),
        None => {}
    }
}

/// Rows given to the job table, clamped so the log pane keeps room.
fn table_height(dash: &DashState, terminal_height: u16) -> u16 {
    let wanted = dash.queue.jobs.len() as u16 + 3;
    wanted.clamp(5, (terminal_height / 2).max(5))
}

/// Inner height of the log pane for a given terminal height.
///
/// The reducer uses this during the Frame event so scroll offsets and
/// expansion triggers line up with what is actually on screen.
pub fn log_pane_height(dash: &DashState, terminal_height: u16) -> usize {
    terminal_height
        .saturating_sub(table_height(dash, terminal_height) + TABS_HEIGHT + STATUS_HEIGHT + LOG_BORDERS)
        as usize
}

// ============================================================================
// Queue Table
// ============================================================================

fn render_queue_table(dash: &DashState, frame: &mut Frame, area: Rect) {
    let queue = &dash.queue;

    let mut title = String::from(" Jobs (squeue --me) ");
    if queue.loading {
        title = format!(" Jobs (squeue --me) {} refreshing ", spinner(dash));
    } else if let Some(at) = queue.refreshed_at {
        title = format!(" Jobs (squeue --me) refreshed {} ", at.format("%H:%M:%S"));
    }

    let mut block = Block::default().borders(Borders::ALL).title(title);
    if let Some(error) = &queue.error {
        let width = area.width.saturating_sub(4) as usize;
        block = block.title_bottom(Line::from(Span::styled(
            format!(" {} ", truncate_with_ellipsis(error, width)),
            Style::default().fg(Color::Red),
        )));
    }

    if queue.jobs.is_empty() {
        let message = if queue.loading {
            "Loading jobs..."
        } else {
            "No jobs in the queue. Press r to refresh."
        };
        let empty = Paragraph::new(message)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let header = Row::new([
        "JOBID", "ARRAY", "TASK", "PARTITION", "NAME", "STATE", "TIME", "NODES", "NODELIST",
    ])
    .style(Style::default().add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = queue
        .jobs
        .iter()
        .map(|job| {
            let state_style = if job.is_running() {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::Yellow)
            };
            Row::new(vec![
                Span::raw(job.job_id.clone()),
                Span::raw(job.array_job_id.clone()),
                Span::raw(job.array_task_id.clone()),
                Span::raw(job.partition.clone()),
                Span::raw(job.name.clone()),
                Span::styled(job.state.clone(), state_style),
                Span::raw(job.time_used.clone()),
                Span::raw(job.num_nodes.to_string()),
                Span::raw(job.nodelist.clone()),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(5),
            Constraint::Length(10),
            Constraint::Fill(2),
            Constraint::Length(10),
            Constraint::Length(9),
            Constraint::Length(5),
            Constraint::Fill(1),
        ],
    )
    .header(header)
    .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
    .block(block);

    let mut table_state = TableState::default().with_selected(Some(queue.selected));
    frame.render_stateful_widget(table, area, &mut table_state);
}

// ============================================================================
// Tabs and Log Pane
// ============================================================================

fn render_tabs(dash: &DashState, frame: &mut Frame, area: Rect) {
    let tabs = Tabs::new(vec!["STDOUT", "STDERR"])
        .select(dash.active_tab.index())
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, area);
}

fn render_log_pane(dash: &DashState, frame: &mut Frame, area: Rect) {
    let pane = dash.active_pane();
    let block = log_block(dash, pane, area);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if let Some(notice) = &pane.notice {
        let paragraph = Paragraph::new(notice.as_str())
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, inner);
        return;
    }

    let Some(view) = &pane.view else {
        let hint = if pane.loading {
            format!("{} Loading log...", spinner(dash))
        } else {
            "No log selected. Choose a job and press Enter.".to_string()
        };
        let paragraph = Paragraph::new(hint)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, inner);
        return;
    };

    let display = view.display();
    let height = inner.height as usize;
    let end = (pane.scroll + height).min(display.len());
    let start = pane.scroll.min(end);
    let lines: Vec<Line> = display[start..end]
        .iter()
        .map(|line| Line::from(line.as_str()))
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);

    frame.render_widget(Scrollbar::new(display.len(), height, pane.scroll), inner);
}

/// The bordered block around the log pane: path and node info on top,
/// window position or error on the bottom.
fn log_block<'a>(dash: &DashState, pane: &'a LogPane, area: Rect) -> Block<'a> {
    let width = area.width.saturating_sub(4) as usize;
    let title = match &pane.path {
        Some(path) => {
            let mut label = format!(" {} ", path.display());
            if let Some(job) = &dash.opened_job
                && job.num_nodes > 1
            {
                label = format!(
                    " {} [node {}/{}] ",
                    path.display(),
                    dash.selected_node,
                    job.num_nodes
                );
            }
            truncate_with_ellipsis(&label, width)
        }
        None => format!(" {} ", dash.active_tab.title()),
    };

    let mut block = Block::default().borders(Borders::ALL).title(title);
    if let Some(error) = &pane.error {
        block = block.title_bottom(Line::from(Span::styled(
            format!(" {} ", truncate_with_ellipsis(error, width)),
            Style::default().fg(Color::Red),
        )));
    } else if let Some(view) = &pane.view {
        let height = area.height.saturating_sub(2) as usize;
        let first = view.window().0 + pane.scroll;
        let last = (first + height).min(view.window().0 + view.display().len());
        block = block.title_bottom(Line::from(Span::styled(
            format!(" lines {first}-{last} of {} ", view.total_lines()),
            Style::default().fg(Color::DarkGray),
        )));
    }
    block
}

// ============================================================================
// Status Line and Overlays
// ============================================================================

fn spinner(dash: &DashState) -> &'static str {
    SPINNER_FRAMES[(dash.spinner_frame / 4) % SPINNER_FRAMES.len()]
}

fn render_status_line(dash: &DashState, frame: &mut Frame, area: Rect) {
    let key_style = Style::default().fg(Color::DarkGray);
    let mut spans = vec![
        Span::styled("r", key_style),
        Span::raw(" refresh  "),
        Span::styled("Enter", key_style),
        Span::raw(" open  "),
        Span::styled("Tab", key_style),
        Span::raw(" stream  "),
        Span::styled("t/b", key_style),
        Span::raw(" top/bottom  "),
        Span::styled("[/]", key_style),
        Span::raw(" node  "),
        Span::styled("h", key_style),
        Span::raw(" help  "),
        Span::styled("q", key_style),
        Span::raw(" quit"),
    ];

    if dash.stdout_pane.loading || dash.stderr_pane.loading {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("{} loading log", spinner(dash)),
            Style::default().fg(Color::Yellow),
        ));
    }

    let status = Paragraph::new(Line::from(spans)).alignment(Alignment::Left);
    frame.render_widget(status, area);
}

const HELP_LINES: &[&str] = &[
    "",
    "  The table shows `squeue --me`; the pane below shows job logs.",
    "",
    "  Up/Down, j/k   move the job cursor",
    "  Enter          open the selected job's logs",
    "  Tab            switch between STDOUT and STDERR",
    "  r              refresh squeue (no auto-refresh)",
    "  l              reload the open logs",
    "  t / b          jump to top / bottom of the log",
    "  PgUp / PgDn    scroll the log by a page",
    "  [ / ]          previous / next node (multi-node jobs)",
    "  i              sacct details for the selected job",
    "  q              quit",
    "",
    "  Esc closes this screen.",
];

fn render_help(frame: &mut Frame, area: Rect) {
    let popup = centered_rect(area, 64, HELP_LINES.len() as u16 + 2);
    let lines: Vec<Line> = HELP_LINES.iter().map(|l| Line::from(*l)).collect();
    let block = Block::default().borders(Borders::ALL).title(" Help ");
    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

fn render_job_detail(dash: &DashState, state: &JobDetailState, frame: &mut Frame, area: Rect) {
    let popup = centered_rect(area, area.width.saturating_sub(8).min(100), 14);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" sacct: job {} ", state.job_id));

    let body = if let Some(error) = &state.error {
        Paragraph::new(error.as_str()).style(Style::default().fg(Color::Red))
    } else if let Some(content) = &state.content {
        Paragraph::new(content.as_str())
    } else {
        Paragraph::new(format!("{} loading...", spinner(dash)))
            .style(Style::default().fg(Color::DarkGray))
    };
    frame.render_widget(Clear, popup);
    frame.render_widget(body.block(block), popup);
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
