//! Viewport bookkeeping and the redraw protocol.
//!
//! The buffer may render taller than the visible inner area (terminal
//! height minus the status row). When it does, `view_start..view_end`
//! windows the buffer so the cursor always stays on screen. Redraws come in
//! two strengths: the fast paths in `edit` patch single cells, and
//! [`Repl::force`] here rebuilds the whole prompt region from scratch.

use crate::Repl;
use anyhow::Result;
use core_terminal::TerminalControl;
use core_text::{BufferPos, buffer_pos_at, rel_coord, rendered_height};
use std::io::Write;
use tracing::trace;

impl<T: TerminalControl, W: Write> Repl<T, W> {
    /// Rows available to the buffer: the status bar, when visible, owns the
    /// bottom row.
    pub(crate) fn inner_height(&self) -> usize {
        if self.status_visible() {
            self.height.saturating_sub(1)
        } else {
            self.height
        }
    }

    pub(crate) fn calc_height(&self) -> usize {
        rendered_height(&self.buffer, self.prompt_len(), self.width)
    }

    /// Effective window bounds with the `None` sentinel resolved.
    pub(crate) fn view_bounds(&self) -> (usize, usize) {
        let end = self.view_end.unwrap_or(self.buffer.len()).min(self.buffer.len());
        (self.view_start.min(end), end)
    }

    fn calc_view_height(&self) -> usize {
        let (start, end) = self.view_bounds();
        rendered_height(&self.buffer[start..end], self.prompt_len(), self.width)
    }

    pub(crate) fn calc_view_end_height(&self) -> usize {
        self.calc_height().saturating_sub(self.calc_view_height())
    }

    /// True when the full buffer no longer fits; resets the window to the
    /// whole buffer whenever it does fit again.
    pub(crate) fn overflow(&mut self) -> bool {
        let over = self.calc_height() > self.inner_height();
        if !over {
            self.view_start = 0;
            self.view_end = None;
        }
        over
    }

    fn view_overflow(&self) -> bool {
        self.calc_view_height() > self.inner_height()
    }

    /// Re-window around the cursor: pull the window when the cursor left
    /// it, otherwise grow the bottom edge greedily while everything still
    /// fits. Guarantees `view_start <= cursor <= view_end` under overflow.
    pub(crate) fn adjust_view(&mut self) {
        let len = self.buffer.len();
        if self.cursor < self.view_start {
            self.view_start = self.cursor;
            self.view_end = Some(len);
            self.shrink_view_end();
        } else if self.view_end.is_none_or(|end| self.cursor > end) {
            self.view_end = Some(self.cursor);
            loop {
                let (start, end) = self.view_bounds();
                if !self.view_overflow() || start >= end {
                    break;
                }
                self.view_start = start + 1;
            }
        } else if self.view_overflow() {
            self.view_end = Some(len);
            self.shrink_view_end();
        } else {
            loop {
                let end = self.view_end.unwrap_or(len);
                if end >= len || self.view_overflow() {
                    break;
                }
                self.view_end = Some(end + 1);
            }
            self.shrink_view_end();
        }
    }

    fn shrink_view_end(&mut self) {
        loop {
            let (start, end) = self.view_bounds();
            if !self.view_overflow() || end <= start {
                break;
            }
            self.view_end = Some(end - 1);
        }
    }

    /// Screen cell of buffer position `pos`, in viewport coordinates
    /// anchored at the prompt row.
    pub(crate) fn coord_at(&self, pos: usize) -> (usize, usize) {
        let start = self.view_start.min(self.buffer.len());
        let rel = pos.saturating_sub(self.view_start);
        let (x, y) = rel_coord(&self.buffer[start..], self.prompt_len(), rel, self.width);
        (x, y + self.prompt_row)
    }

    pub(crate) fn cursor_coord(&self) -> (usize, usize) {
        self.coord_at(self.cursor)
    }

    /// Inverse of [`Repl::coord_at`]: buffer position best matching a
    /// screen cell. `None` means the cell lies above the window.
    pub(crate) fn buffer_pos_from_cell(&self, x: usize, y: usize) -> Option<usize> {
        let start = self.view_start.min(self.buffer.len());
        match buffer_pos_at(
            &self.buffer[start..],
            self.prompt_len(),
            self.prompt_row,
            self.width,
            x,
            y,
        ) {
            BufferPos::At(i) => Some(i + self.view_start),
            BufferPos::Before => None,
            BufferPos::End => Some(self.view_end.unwrap_or(self.buffer.len())),
        }
    }

    pub(crate) fn sync_cursor(&mut self) -> Result<()> {
        let (x, y) = self.cursor_coord();
        self.sink.move_cursor_to(x, y)?;
        Ok(())
    }

    pub(crate) fn redraw(&mut self) -> Result<()> {
        let buffer = self.buffer.clone();
        let cursor = self.cursor;
        self.force(buffer, cursor)
    }

    pub(crate) fn sync_cursor_overflow(&mut self) -> Result<()> {
        if self.overflow() {
            self.redraw()
        } else {
            self.sync_cursor()
        }
    }

    /// If rendering would spill past the inner area, emit a literal newline
    /// so the terminal scrolls, and pull the prompt anchor up to match.
    pub(crate) fn bound_prompt_row(&mut self) -> Result<()> {
        let end = self.view_end.unwrap_or(self.buffer.len());
        let (xe, ye) = self.coord_at(end);
        let inner = self.inner_height();
        if ye >= inner {
            self.sink.move_cursor_to(xe, ye)?;
            self.sink.print_str("\n")?;
            let overshoot = ye + 1 - inner;
            self.set_prompt_row(self.prompt_row.saturating_sub(overshoot));
        }
        Ok(())
    }

    pub(crate) fn set_prompt_row(&mut self, row: usize) {
        self.prompt_row = row.min(self.height.saturating_sub(1));
        trace!(target: "editor.render", prompt_row = self.prompt_row, "prompt_row_updated");
    }

    pub(crate) fn clear_after_prompt(&mut self) -> Result<()> {
        self.sink
            .move_cursor_to(0, self.height.saturating_sub(1))?;
        let rows = self.height.saturating_sub(1).saturating_sub(self.prompt_row);
        self.sink.clear_rows(rows)?;
        Ok(())
    }

    /// Erase the prompt region and start over with an empty buffer.
    pub(crate) fn clear_buffer(&mut self) -> Result<()> {
        self.clear_after_prompt()?;
        self.sink.clear_row()?;
        self.reset_buffer()
    }

    pub(crate) fn reset_buffer(&mut self) -> Result<()> {
        self.cursor = 0;
        self.buffer.clear();
        self.print_prompt()?;
        self.view_start = 0;
        self.view_end = None;
        Ok(())
    }

    fn clear_screen_and_reset(&mut self) -> Result<()> {
        self.sink.clear_screen()?;
        self.sink.move_to_screen_start()?;
        self.set_prompt_row(0);
        self.reset_buffer()
    }

    /// Ctrl-L: repaint everything from the top-left corner.
    pub(crate) fn redraw_screen(&mut self) -> Result<()> {
        let buffer = self.buffer.clone();
        let cursor = self.cursor;
        self.clear_screen_and_reset()?;
        self.force(buffer, cursor)
    }

    /// Worst-case redraw: install `new_buffer` with the cursor at `pos` and
    /// rebuild the visible region. Overflowing buffers clear the whole
    /// screen and paint the adjusted window; fitting buffers clear just the
    /// prompt region and replay the bytes through the append path.
    pub(crate) fn force(&mut self, new_buffer: Vec<u8>, pos: usize) -> Result<()> {
        self.clear_status()?;
        let tall = rendered_height(&new_buffer, self.prompt_len(), self.width) > self.inner_height();
        if tall {
            let saved = (self.view_start, self.view_end);
            self.clear_screen_and_reset()?;
            self.buffer = new_buffer;
            self.cursor = pos.min(self.buffer.len());
            (self.view_start, self.view_end) = saved;
            self.adjust_view();
            let (start, end) = self.view_bounds();
            trace!(
                target: "editor.render",
                start, end,
                len = self.buffer.len(),
                "force_windowed"
            );
            let window = self.buffer[start..end].to_vec();
            self.sink.write_bytes(&window)?;
            self.sync_cursor()?;
        } else {
            self.clear_buffer()?;
            self.add_bytes_to_buffer(new_buffer)?;
            self.cursor = pos.min(self.buffer.len());
            self.sync_cursor()?;
        }
        self.write_status()
    }
}
