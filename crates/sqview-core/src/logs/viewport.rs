//! Windowed viewport over a [`LineStore`].
//!
//! Rendering a multi-gigabyte log wholesale is a non-starter for a
//! terminal backend, so the viewport keeps only a contiguous window of
//! lines materialized and grows it as the host scrolls toward either
//! edge. Growth at the bottom is a plain append. Growth at the top
//! inserts lines above everything the host has already laid out, so the
//! host must shift its scroll offset down by the inserted count to keep
//! the watched line stationary; that compensation is returned as a
//! [`HostScroll`] and applying it is not optional.
//!
//! The window only ever grows between jumps. A monotonic scroll through
//! the whole file therefore ends with the file fully materialized; the
//! jump operations (`goto_top`, `goto_bottom`) are what discard the stale
//! window and re-anchor a fresh one.

use super::store::LineStore;

/// Scroll adjustment the host must apply after a viewport operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostScroll {
    /// Anchor the display at the first line of the window.
    ToTop,
    /// Anchor the display at the last line of the window.
    ToBottom,
    /// Lines were inserted above the window start; move the scroll
    /// offset down by this many lines so the view stays put.
    Down(usize),
}

/// A bounded materialized window into a [`LineStore`].
///
/// The window is the half-open range `[top, bottom)` of store indices;
/// `display` always equals `store.slice(top, bottom)`, in order, with no
/// gaps or duplicates.
#[derive(Debug)]
pub struct LogViewport {
    store: LineStore,
    /// Lines materialized per expansion step.
    buffer_size: usize,
    /// Proximity margin (in lines) that triggers an expansion before the
    /// host reaches the window edge.
    scroll_buffer: usize,
    top: usize,
    bottom: usize,
    display: Vec<String>,
    /// Last host-reported position, in display-buffer coordinates.
    visible_line: usize,
}

impl LogViewport {
    /// Binds a store, materializing the initial window
    /// `[0, min(buffer_size, len))`.
    ///
    /// `scroll_buffer` must be smaller than `buffer_size`; the margin is
    /// clamped if a caller hands us a config that violates that.
    pub fn new(store: LineStore, buffer_size: usize, scroll_buffer: usize) -> Self {
        let buffer_size = buffer_size.max(1);
        let scroll_buffer = scroll_buffer.clamp(1, buffer_size.saturating_sub(1).max(1));
        let mut viewport = Self {
            store,
            buffer_size,
            scroll_buffer,
            top: 0,
            bottom: 0,
            display: Vec::new(),
            visible_line: 0,
        };
        viewport.anchor(0);
        viewport
    }

    /// Discards the window and re-materializes `[top, top + buffer_size)`
    /// clamped to the store.
    fn anchor(&mut self, top: usize) {
        let len = self.store.len();
        self.top = top.min(len);
        self.bottom = (self.top + self.buffer_size).min(len);
        self.display = self.store.slice(self.top, self.bottom).to_vec();
        self.visible_line = 0;
    }

    /// Records the host's visible position and expands whichever window
    /// edges it is close to.
    ///
    /// The two edge checks are independent; both can fire on one call.
    /// Returns the scroll compensation the host must apply when a top
    /// expansion inserted lines above the current view.
    pub fn report_visible_position(&mut self, line: usize) -> Option<HostScroll> {
        self.visible_line = line;

        if self.bottom < self.store.len()
            && self.visible_line + self.scroll_buffer > self.window_len()
        {
            self.expand_bottom();
        }

        let mut inserted = 0;
        if self.top > 0 && self.visible_line < self.scroll_buffer {
            inserted = self.expand_top();
        }
        (inserted > 0).then_some(HostScroll::Down(inserted))
    }

    /// Appends the next `buffer_size` lines below the window.
    ///
    /// A no-op once the window bottom has reached the end of the store.
    /// The top edge is untouched; the display buffer only grows here.
    pub fn expand_bottom(&mut self) {
        let new_bottom = (self.bottom + self.buffer_size).min(self.store.len());
        if new_bottom == self.bottom {
            return;
        }
        self.display
            .extend(self.store.slice(self.bottom, new_bottom).iter().cloned());
        self.bottom = new_bottom;
    }

    /// Prepends up to `buffer_size` lines above the window, preserving
    /// total order, and returns how many were inserted.
    ///
    /// A no-op (returning 0) once the window top is at line zero. The
    /// caller owes the host a [`HostScroll::Down`] by the returned count.
    pub fn expand_top(&mut self) -> usize {
        let new_top = self.top.saturating_sub(self.buffer_size);
        if new_top == self.top {
            return 0;
        }
        let inserted = self.top - new_top;
        self.display
            .splice(0..0, self.store.slice(new_top, self.top).iter().cloned());
        self.top = new_top;
        inserted
    }

    /// Re-anchors a fresh window at the start of the file.
    pub fn goto_top(&mut self) -> HostScroll {
        self.anchor(0);
        HostScroll::ToTop
    }

    /// Re-anchors a fresh window covering the tail of the file.
    pub fn goto_bottom(&mut self) -> HostScroll {
        let len = self.store.len();
        self.anchor(len.saturating_sub(self.buffer_size));
        self.visible_line = self.window_len().saturating_sub(1);
        HostScroll::ToBottom
    }

    /// The materialized lines, equal to `store.slice(top, bottom)`.
    pub fn display(&self) -> &[String] {
        &self.display
    }

    /// The materialized range `[top, bottom)` in store coordinates.
    pub fn window(&self) -> (usize, usize) {
        (self.top, self.bottom)
    }

    /// Number of materialized lines.
    pub fn window_len(&self) -> usize {
        self.bottom - self.top
    }

    /// Total line count of the backing store.
    pub fn total_lines(&self) -> usize {
        self.store.len()
    }

    #[cfg(test)]
    fn assert_invariants(&self) {
        assert!(self.top <= self.bottom);
        assert!(self.bottom <= self.store.len());
        assert_eq!(self.display.len(), self.bottom - self.top);
        assert_eq!(self.display, self.store.slice(self.top, self.bottom));
    }
}

#[cfg(test)]
mod tests {
    use std::fmt::Write as _;
    use std::path::PathBuf;

    use tempfile::TempDir;

    use super::*;

    /// Writes a file of `count` lines reading "line 0".."line count-1"
    /// and loads it.
    fn numbered_store(dir: &TempDir, count: usize) -> LineStore {
        let mut contents = String::new();
        for i in 0..count {
            writeln!(contents, "line {i}").unwrap();
        }
        let path = numbered_path(dir);
        std::fs::write(&path, contents).unwrap();
        LineStore::load(&path).unwrap()
    }

    fn numbered_path(dir: &TempDir) -> PathBuf {
        dir.path().join("numbered.out")
    }

    fn viewport(dir: &TempDir, lines: usize, buffer: usize, margin: usize) -> LogViewport {
        LogViewport::new(numbered_store(dir, lines), buffer, margin)
    }

    #[test]
    fn bind_materializes_initial_window() {
        let dir = TempDir::new().unwrap();
        let vp = viewport(&dir, 1000, 500, 50);

        assert_eq!(vp.window(), (0, 500));
        assert_eq!(vp.display().len(), 500);
        assert_eq!(vp.display()[0], "line 0");
        assert_eq!(vp.display()[499], "line 499");
        vp.assert_invariants();
    }

    #[test]
    fn bind_clamps_window_to_short_files() {
        let dir = TempDir::new().unwrap();
        let vp = viewport(&dir, 12, 500, 50);

        assert_eq!(vp.window(), (0, 12));
        assert_eq!(vp.display().len(), 12);
        vp.assert_invariants();
    }

    #[test]
    fn report_near_bottom_expands_bottom() {
        let dir = TempDir::new().unwrap();
        let mut vp = viewport(&dir, 1000, 500, 50);

        // 460 > 500 - 50, so the bottom grows by one buffer step.
        let adjust = vp.report_visible_position(460);
        assert_eq!(adjust, None);
        assert_eq!(vp.window(), (0, 1000));
        assert_eq!(vp.display().len(), 1000);
        assert_eq!(vp.display()[999], "line 999");
        vp.assert_invariants();
    }

    #[test]
    fn report_inside_margins_is_a_noop() {
        let dir = TempDir::new().unwrap();
        let mut vp = viewport(&dir, 1000, 500, 50);

        assert_eq!(vp.report_visible_position(200), None);
        assert_eq!(vp.window(), (0, 500));
        vp.assert_invariants();
    }

    #[test]
    fn expand_bottom_at_end_of_file_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let mut vp = viewport(&dir, 600, 500, 50);

        vp.expand_bottom();
        assert_eq!(vp.window(), (0, 600));
        let before: Vec<String> = vp.display().to_vec();

        vp.expand_bottom();
        assert_eq!(vp.window(), (0, 600));
        assert_eq!(vp.display(), before);
        vp.assert_invariants();
    }

    #[test]
    fn monotonic_downward_scroll_reaches_end_without_gaps() {
        let dir = TempDir::new().unwrap();
        let mut vp = viewport(&dir, 2300, 500, 50);

        // Track the bottom of the growing window the way a host following
        // the scroll would.
        let mut rounds = 0;
        while vp.window().1 < vp.total_lines() {
            vp.report_visible_position(vp.window_len().saturating_sub(1));
            vp.assert_invariants();
            rounds += 1;
            assert!(rounds < 100, "scroll did not converge");
        }
        assert_eq!(vp.window(), (0, 2300));
        for (i, line) in vp.display().iter().enumerate() {
            assert_eq!(line, &format!("line {i}"));
        }
    }

    #[test]
    fn goto_bottom_anchors_at_tail() {
        let dir = TempDir::new().unwrap();
        let mut vp = viewport(&dir, 1000, 500, 50);

        assert_eq!(vp.goto_bottom(), HostScroll::ToBottom);
        assert_eq!(vp.window(), (500, 1000));
        assert_eq!(vp.display()[0], "line 500");
        assert_eq!(vp.display()[499], "line 999");
        vp.assert_invariants();
    }

    #[test]
    fn report_near_top_expands_top_and_compensates() {
        let dir = TempDir::new().unwrap();
        let mut vp = viewport(&dir, 1000, 500, 50);
        vp.goto_bottom();

        // 30 < 50, so the top grows and the host owes a 500-line shift.
        let adjust = vp.report_visible_position(30);
        assert_eq!(adjust, Some(HostScroll::Down(500)));
        assert_eq!(vp.window(), (0, 1000));
        assert_eq!(vp.display().len(), 1000);
        // The line previously at display index 30 is now at 530.
        assert_eq!(vp.display()[530], "line 530");
        vp.assert_invariants();
    }

    #[test]
    fn expand_top_near_file_start_inserts_partial_step() {
        let dir = TempDir::new().unwrap();
        let mut vp = viewport(&dir, 700, 500, 50);
        vp.goto_bottom();
        assert_eq!(vp.window(), (200, 700));

        let inserted = vp.expand_top();
        assert_eq!(inserted, 200);
        assert_eq!(vp.window(), (0, 700));
        vp.assert_invariants();

        assert_eq!(vp.expand_top(), 0);
    }

    #[test]
    fn top_expansion_keeps_watched_line_stationary() {
        let dir = TempDir::new().unwrap();
        let mut vp = viewport(&dir, 1500, 500, 50);
        vp.goto_bottom();

        // Host is looking at display offset k; after the expansion it
        // applies the compensation and must find the same text there.
        let k = 17;
        let watched = vp.display()[k].clone();
        let Some(HostScroll::Down(shift)) = vp.report_visible_position(k) else {
            panic!("expected a top expansion");
        };
        assert_eq!(vp.display()[k + shift], watched);
    }

    #[test]
    fn round_trip_matches_fresh_bind() {
        let dir = TempDir::new().unwrap();
        let mut vp = viewport(&dir, 1000, 500, 50);
        let fresh: Vec<String> = vp.display().to_vec();

        vp.goto_bottom();
        assert_eq!(vp.goto_top(), HostScroll::ToTop);

        assert_eq!(vp.window(), (0, 500));
        assert_eq!(vp.display(), fresh);
        vp.assert_invariants();
    }

    #[test]
    fn report_checks_both_edges_independently() {
        // A position inside both margins at once: the bottom check is
        // evaluated (a no-op at end of file) and the top check still
        // fires. Neither short-circuits the other.
        let dir = TempDir::new().unwrap();
        let store = numbered_store(&dir, 120);
        let mut vp = LogViewport::new(store, 100, 60);
        vp.goto_bottom();
        assert_eq!(vp.window(), (20, 120));

        let adjust = vp.report_visible_position(50);
        assert_eq!(adjust, Some(HostScroll::Down(20)));
        assert_eq!(vp.window(), (0, 120));
        vp.assert_invariants();
    }

    #[test]
    fn empty_file_is_all_noops() {
        let dir = TempDir::new().unwrap();
        let mut vp = viewport(&dir, 0, 500, 50);

        assert_eq!(vp.window(), (0, 0));
        assert!(vp.display().is_empty());

        assert_eq!(vp.report_visible_position(0), None);
        vp.expand_bottom();
        assert_eq!(vp.expand_top(), 0);
        assert_eq!(vp.goto_bottom(), HostScroll::ToBottom);
        assert_eq!(vp.goto_top(), HostScroll::ToTop);
        assert!(vp.display().is_empty());
        vp.assert_invariants();
    }
}
