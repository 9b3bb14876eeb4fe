//! Buffer mutations: insertion, deletion, kills, yank, completion.
//!
//! Two fast paths keep ordinary typing cheap: appending at the end writes
//! the new bytes in place, and backspacing at the end clears to the end of
//! the row. Everything else routes through the force-redraw in `view`.

use crate::Repl;
use anyhow::Result;
use core_terminal::TerminalControl;
use std::io::Write;

impl<T: TerminalControl, W: Write> Repl<T, W> {
    /// Insert `bytes` at the cursor.
    pub(crate) fn add_bytes_to_buffer(&mut self, bytes: Vec<u8>) -> Result<()> {
        if self.cursor == self.buffer.len() {
            // Append path: write the bytes where the cursor already is.
            let (x_before, _) = self.cursor_coord();
            self.cursor += bytes.len();
            let prev_len = self.buffer.len();
            self.buffer.extend_from_slice(&bytes);

            if !self.overflow() {
                self.sink.write_bytes(&bytes)?;
                // A write that crossed the right margin leaves the real
                // cursor position ambiguous; resync explicitly.
                let at_margin = self.width > 0 && x_before == self.width - 1;
                if at_margin && bytes.iter().any(|&b| b != b'\n') {
                    self.sync_cursor()?;
                }
                self.bound_prompt_row()?;
                return Ok(());
            }

            // The append tipped the buffer into overflow; undo and fall
            // through to the windowed redraw.
            self.cursor -= bytes.len();
            self.buffer.truncate(prev_len);
        }

        let mut new_buffer = Vec::with_capacity(self.buffer.len() + bytes.len());
        new_buffer.extend_from_slice(&self.buffer[..self.cursor]);
        new_buffer.extend_from_slice(&bytes);
        new_buffer.extend_from_slice(&self.buffer[self.cursor..]);
        let new_pos = self.cursor + bytes.len();
        self.force(new_buffer, new_pos)
    }

    /// Delete the byte before the cursor.
    pub(crate) fn backspace(&mut self) -> Result<()> {
        if self.buffer.is_empty() || self.cursor == 0 {
            return Ok(());
        }
        let new_pos = self.cursor - 1;
        let mut new_buffer = self.buffer.clone();
        new_buffer.remove(new_pos);

        let (_, y0) = self.cursor_coord();
        let (x1, y1) = self.coord_at(new_pos);
        if y0 == y1 && self.cursor == self.buffer.len() && !self.overflow() {
            self.sink.move_to_col(x1)?;
            self.sink.clear_row_after_cursor()?;
            self.buffer = new_buffer;
            self.cursor = new_pos;
            Ok(())
        } else {
            self.force(new_buffer, new_pos)
        }
    }

    /// Delete the byte at the cursor (forward delete).
    pub(crate) fn delete_char(&mut self) -> Result<()> {
        if self.cursor < self.buffer.len() {
            let mut new_buffer = self.buffer.clone();
            new_buffer.remove(self.cursor);
            let pos = self.cursor;
            self.force(new_buffer, pos)?;
        }
        Ok(())
    }

    /// Kill from the cursor to the end of the buffer.
    pub(crate) fn clear_to_end(&mut self) -> Result<()> {
        if self.cursor != self.buffer.len() {
            let new_buffer = self.buffer[..self.cursor].to_vec();
            self.prev_deletion = self.buffer[self.cursor..].to_vec();
            let pos = self.cursor;
            self.force(new_buffer, pos)?;
        }
        Ok(())
    }

    /// Kill from the start of the buffer to the cursor.
    pub(crate) fn clear_to_start(&mut self) -> Result<()> {
        if self.cursor > 0 {
            let new_buffer = self.buffer[self.cursor..].to_vec();
            self.prev_deletion = self.buffer[..self.cursor].to_vec();
            self.force(new_buffer, 0)?;
        }
        Ok(())
    }

    /// Kill back to the previous phrase boundary.
    pub(crate) fn clear_one_phrase_left(&mut self) -> Result<()> {
        let Some(idx) = self.phrases.prev_boundary(&self.buffer, self.cursor) else {
            return Ok(());
        };
        let mut new_buffer = Vec::with_capacity(self.buffer.len());
        new_buffer.extend_from_slice(&self.buffer[..idx]);
        new_buffer.extend_from_slice(&self.buffer[self.cursor..]);
        self.prev_deletion = self.buffer[idx..self.cursor].to_vec();

        let (_, y0) = self.cursor_coord();
        let (x1, y1) = self.coord_at(idx);
        if self.cursor == self.buffer.len() && y0 == y1 && x1 > 0 && !self.overflow() {
            self.cursor = idx;
            self.buffer = new_buffer;
            self.sync_cursor()?;
            self.sink.clear_row_after_cursor()?;
            Ok(())
        } else {
            self.force(new_buffer, idx)
        }
    }

    /// Kill forward to the next phrase boundary.
    pub(crate) fn clear_one_phrase_right(&mut self) -> Result<()> {
        let Some(idx) = self.phrases.next_boundary(&self.buffer, self.cursor) else {
            return Ok(());
        };
        let mut new_buffer = Vec::with_capacity(self.buffer.len());
        new_buffer.extend_from_slice(&self.buffer[..self.cursor]);
        new_buffer.extend_from_slice(&self.buffer[idx..]);
        self.prev_deletion = self.buffer[self.cursor..idx].to_vec();
        let pos = self.cursor;
        self.force(new_buffer, pos)
    }

    /// Re-insert the most recent kill at the cursor.
    pub(crate) fn insert_prev_deletion(&mut self) -> Result<()> {
        let bytes = self.prev_deletion.clone();
        self.add_bytes_to_buffer(bytes)
    }

    /// Ask the evaluator for a completion of everything left of the cursor
    /// and insert whatever comes back.
    pub(crate) fn tab_complete(&mut self) -> Result<()> {
        let prefix = String::from_utf8_lossy(&self.buffer[..self.cursor]).into_owned();
        let extra = self.evaluator.tab(&prefix);
        if !extra.is_empty() {
            self.add_bytes_to_buffer(extra.into_bytes())?;
        }
        Ok(())
    }
}
