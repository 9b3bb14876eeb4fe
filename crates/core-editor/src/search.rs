//! Reverse-search mode and history navigation.
//!
//! While a filter is present, Up/Down cycle only through matching entries
//! and printable bytes refine the filter. Selecting an entry stashes the
//! fresh buffer in `backup`; walking forward past the newest entry restores
//! it. `history_index` and `backup` are always both present or both absent.

use crate::Repl;
use anyhow::Result;
use core_terminal::TerminalControl;
use std::io::Write;
use tracing::debug;

impl<T: TerminalControl, W: Write> Repl<T, W> {
    pub(crate) fn search_active(&self) -> bool {
        self.filter.is_some()
    }

    pub(crate) fn start_reverse_search(&mut self) -> Result<()> {
        debug!(target: "editor.search", "search_started");
        self.filter = Some(Vec::new());
        self.clear_status()?;
        self.write_status()
    }

    pub(crate) fn stop_search(&mut self) -> Result<()> {
        self.filter = None;
        self.clear_status()?;
        self.write_status()
    }

    /// A printable byte extends the filter and re-runs the search.
    pub(crate) fn search_insert(&mut self, byte: u8) -> Result<()> {
        if let Some(filter) = self.filter.as_mut() {
            filter.push(byte);
        }
        self.update_search_result()?;
        self.write_status()
    }

    /// Backspace shortens the filter.
    pub(crate) fn search_backspace(&mut self) -> Result<()> {
        if let Some(filter) = self.filter.as_mut() {
            filter.pop();
        }
        self.update_search_result()?;
        self.clear_status()?;
        self.write_status()
    }

    /// Select the most recent entry containing the filter, preferring the
    /// already-selected entry while it still matches.
    pub(crate) fn update_search_result(&mut self) -> Result<()> {
        let Some(filter) = self.filter.clone() else {
            return Ok(());
        };
        if filter.is_empty() || self.history.is_empty() {
            return Ok(());
        }
        if self.history_index.is_some() && core_history::matches(&self.buffer, &filter) {
            return Ok(());
        }
        if let Some(found) = self.history.latest_match(&filter) {
            self.use_history_entry(Some(found))?;
        }
        Ok(())
    }

    /// Switch the buffer to a history entry, or back to the stashed fresh
    /// buffer for `None`.
    pub(crate) fn use_history_entry(&mut self, index: Option<usize>) -> Result<()> {
        match index {
            None => {
                self.history_index = None;
                if let Some(backup) = self.backup.take() {
                    let pos = backup.len();
                    self.force(backup, pos)?;
                }
            }
            Some(i) => {
                let Some(entry) = self.history.get(i).map(<[u8]>::to_vec) else {
                    return Ok(());
                };
                if self.backup.is_none() {
                    self.backup = Some(self.buffer.clone());
                }
                self.history_index = Some(i);
                let pos = entry.len();
                self.force(entry, pos)?;
            }
        }
        Ok(())
    }

    pub(crate) fn history_back(&mut self) -> Result<()> {
        if self.search_active() {
            let filter = self.filter.clone().unwrap_or_default();
            if let Some(idx) = self.history_index
                && idx > 0
                && let Some(found) = self.history.prev_match(idx, &filter)
            {
                self.use_history_entry(Some(found))?;
            }
        } else {
            match self.history_index {
                None => {
                    if !self.history.is_empty() {
                        self.use_history_entry(Some(self.history.len() - 1))?;
                    }
                }
                Some(idx) if idx > 0 => self.use_history_entry(Some(idx - 1))?,
                Some(_) => {}
            }
        }
        Ok(())
    }

    pub(crate) fn history_forward(&mut self) -> Result<()> {
        if self.search_active() {
            let filter = self.filter.clone().unwrap_or_default();
            if let Some(idx) = self.history_index
                && idx + 1 < self.history.len()
                && let Some(found) = self.history.next_match(idx, &filter)
            {
                self.use_history_entry(Some(found))?;
            }
        } else if let Some(idx) = self.history_index {
            if idx + 1 < self.history.len() {
                self.use_history_entry(Some(idx + 1))?;
            } else {
                self.use_history_entry(None)?;
            }
        }
        Ok(())
    }
}
