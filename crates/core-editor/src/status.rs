//! Status bar: bottom-row summary of the session.
//!
//! Normal mode shows the working directory on the left and a visibility
//! indicator on the right, rendered in inverse video. Reverse-search mode
//! shows the live filter with a right-aligned match count, leaving the
//! terminal cursor parked after the filter text. Field composition is pure
//! so tests cover it without a sink.

use crate::Repl;
use anyhow::Result;
use core_history::SearchStats;
use core_terminal::TerminalControl;
use std::io::Write;

/// Right-hand status field: how much of the buffer the window shows.
pub(crate) fn visibility_indicator(
    view_start: usize,
    view_end: usize,
    cursor: usize,
    len: usize,
) -> String {
    if view_end < len && view_start == 0 {
        "Start".to_string()
    } else if view_end == len && view_start > 0 {
        "End".to_string()
    } else if view_end < len && view_start > 0 {
        let pct = if len == 0 { 0 } else { cursor * 100 / len };
        format!("{pct}%")
    } else {
        "All".to_string()
    }
}

pub(crate) fn search_info(stats: SearchStats) -> String {
    if stats.total == 0 {
        "No matches".to_string()
    } else if let Some(current) = stats.current {
        format!("{}/{} matches", current + 1, stats.total)
    } else {
        // Matches exist but none is selected; the dispatcher never leaves
        // the session here, but a status repaint must not abort it.
        format!("{} matches", stats.total)
    }
}

/// Truncate to at most `max` bytes without splitting a UTF-8 character.
pub(crate) fn truncate_on_char_boundary(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

fn current_dir_display() -> String {
    std::env::current_dir()
        .map(|p| p.display().to_string())
        .unwrap_or_default()
}

impl<T: TerminalControl, W: Write> Repl<T, W> {
    pub(crate) fn status_visible(&self) -> bool {
        self.width >= 10
    }

    pub(crate) fn clear_status(&mut self) -> Result<()> {
        if self.status_visible() {
            self.sink
                .move_cursor_to(0, self.height.saturating_sub(1))?;
            self.sink.clear_row()?;
            self.sync_cursor()?;
        }
        Ok(())
    }

    pub(crate) fn write_status(&mut self) -> Result<()> {
        if !self.status_visible() {
            return self.sync_cursor();
        }
        self.bound_prompt_row()?;
        self.sink
            .move_cursor_to(0, self.height.saturating_sub(1))?;

        let width = self.width;
        if let Some(filter) = self.filter.clone() {
            let prefix = "Reverse-search: ";
            self.sink.print_str(prefix)?;
            let filter_text = String::from_utf8_lossy(&filter).into_owned();
            self.sink.print_str(&filter_text)?;

            if !filter.is_empty() && width > filter.len() + prefix.len() + 10 {
                let info = search_info(self.history.search_stats(&filter, self.history_index));
                let pad = width.saturating_sub(info.len() + prefix.len() + filter.len());
                self.sink.print_str(&" ".repeat(pad))?;
                self.sink.print_str(&info)?;
                // Rest the cursor just after the filter text.
                self.sink.move_to_col(prefix.len() + filter.len())?;
            }
            Ok(())
        } else {
            let left = current_dir_display();
            let right = {
                let (_, end) = self.view_bounds();
                visibility_indicator(self.view_start, end, self.cursor, self.buffer.len())
            };
            self.sink.highlight()?;
            let left = truncate_on_char_boundary(&left, width.saturating_sub(right.len()));
            self.sink.print_str(left)?;
            let pad = width.saturating_sub(left.len() + right.len());
            self.sink.print_str(&" ".repeat(pad))?;
            self.sink.print_str(&right)?;
            self.sink.reset_decorations()?;
            self.sync_cursor()
        }
    }
}
