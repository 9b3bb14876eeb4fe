//! Cursor motions. Each motion moves the cursor index, then either resyncs
//! the terminal cursor or, when the cursor hit the edge of an overflowing
//! window, triggers a windowed redraw so the viewport follows.

use crate::Repl;
use anyhow::Result;
use core_terminal::TerminalControl;
use std::io::Write;

impl<T: TerminalControl, W: Write> Repl<T, W> {
    pub(crate) fn move_to_buffer_start(&mut self) -> Result<()> {
        self.cursor = 0;
        self.sync_cursor_overflow()
    }

    pub(crate) fn move_to_buffer_end(&mut self) -> Result<()> {
        self.cursor = self.buffer.len();
        self.sync_cursor_overflow()
    }

    pub(crate) fn move_left_one_char(&mut self) -> Result<()> {
        if self.cursor > 0 {
            self.cursor -= 1;
            if self.scrolled_off_top() {
                return self.redraw();
            }
            self.sync_cursor()?;
        }
        Ok(())
    }

    pub(crate) fn move_right_one_char(&mut self) -> Result<()> {
        if self.cursor < self.buffer.len() {
            self.cursor += 1;
            if self.scrolled_off_bottom() {
                return self.redraw();
            }
            self.sync_cursor()?;
        }
        Ok(())
    }

    pub(crate) fn move_left_one_phrase(&mut self) -> Result<()> {
        if let Some(pos) = self.phrases.prev_start(&self.buffer, self.cursor) {
            self.cursor = pos;
            if self.scrolled_off_top() {
                return self.redraw();
            }
            self.sync_cursor()?;
        }
        Ok(())
    }

    pub(crate) fn move_right_one_phrase(&mut self) -> Result<()> {
        if let Some(pos) = self.phrases.next_start(&self.buffer, self.cursor) {
            self.cursor = pos;
            if self.scrolled_off_bottom() {
                return self.redraw();
            }
            self.sync_cursor()?;
        }
        Ok(())
    }

    /// Move to the same column one rendered row up, scrolling the window
    /// when the cursor is already on its top row.
    pub(crate) fn move_up_one_line(&mut self) -> Result<()> {
        let (x, y) = self.cursor_coord();
        let new_pos = if y <= self.prompt_row {
            // Top visible row already; drag the window upward if it can go.
            if self.view_start == 0 {
                return Ok(());
            }
            self.view_start - 1
        } else {
            match self.buffer_pos_from_cell(x, y - 1) {
                Some(pos) => pos,
                None => self.view_start.saturating_sub(1),
            }
        };
        self.cursor = new_pos.min(self.buffer.len());
        if self.scrolled_off_top() {
            return self.redraw();
        }
        self.sync_cursor()
    }

    /// Move to the same column one rendered row down, scrolling the window
    /// when hidden rows remain below.
    pub(crate) fn move_down_one_line(&mut self) -> Result<()> {
        let (x, y) = self.cursor_coord();
        let end = self.view_end.unwrap_or(self.buffer.len());
        let (_, end_y) = self.coord_at(end);
        let hidden_below = self.calc_view_end_height() > 0;
        if y < end_y || (y <= end_y && hidden_below) {
            if let Some(pos) = self.buffer_pos_from_cell(x, y + 1) {
                self.cursor = pos.min(self.buffer.len());
            }
            if self.scrolled_off_bottom() {
                return self.redraw();
            }
            self.sync_cursor()?;
        }
        Ok(())
    }

    fn scrolled_off_top(&mut self) -> bool {
        self.overflow() && self.cursor <= self.view_start
    }

    fn scrolled_off_bottom(&mut self) -> bool {
        self.overflow() && self.view_end.is_none_or(|end| self.cursor >= end)
    }
}
