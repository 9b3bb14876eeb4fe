//! Phrase boundaries: the word-jump / word-kill unit.
//!
//! A phrase is a maximal run matching `[0-9A-Za-z_\-\.]+`. Kills operate on
//! the full boundary set (every phrase start and stop plus the buffer
//! ends), so a kill never swallows more than one phrase or one gap. Cursor
//! jumps land on phrase starts only (plus the buffer ends), hopping a whole
//! word per keystroke.

use regex::bytes::Regex;

pub struct PhraseScanner {
    re: Regex,
}

impl Default for PhraseScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl PhraseScanner {
    pub fn new() -> Self {
        // The pattern is a compile-time constant; compiled once per engine.
        Self {
            re: Regex::new(r"[0-9A-Za-z_\-\.]+").expect("phrase pattern is valid"),
        }
    }

    fn matches(&self, bytes: &[u8]) -> Vec<(usize, usize)> {
        self.re
            .find_iter(bytes)
            .map(|m| (m.start(), m.end()))
            .collect()
    }

    /// Every phrase start and stop, bounded by 0 and `bytes.len()`, in
    /// ascending order. The kill unit.
    pub fn jump_positions(&self, bytes: &[u8]) -> Vec<usize> {
        if bytes.is_empty() {
            return vec![0];
        }

        let matches = self.matches(bytes);
        let mut positions = Vec::with_capacity(matches.len() * 2 + 2);
        let last = matches.len().wrapping_sub(1);
        for (i, &(start, stop)) in matches.iter().enumerate() {
            if i == 0 && start != 0 {
                positions.push(0);
            }
            positions.push(start);
            positions.push(stop);
            if i == last && stop != bytes.len() {
                positions.push(bytes.len());
            }
        }

        if positions.first() != Some(&0) {
            positions.insert(0, 0);
        }
        if positions.last() != Some(&bytes.len()) {
            positions.push(bytes.len());
        }

        positions
    }

    /// Phrase starts bounded by 0 and `bytes.len()`. The cursor-jump unit.
    fn start_positions(&self, bytes: &[u8]) -> Vec<usize> {
        let mut positions = vec![0];
        for (start, _) in self.matches(bytes) {
            if start != 0 {
                positions.push(start);
            }
        }
        if positions.last() != Some(&bytes.len()) {
            positions.push(bytes.len());
        }
        positions
    }

    /// Nearest kill boundary strictly right of `pos`, if any.
    pub fn next_boundary(&self, bytes: &[u8], pos: usize) -> Option<usize> {
        if pos >= bytes.len() {
            return None;
        }
        self.jump_positions(bytes).into_iter().find(|&p| p > pos)
    }

    /// Nearest kill boundary strictly left of `pos`, if any.
    pub fn prev_boundary(&self, bytes: &[u8], pos: usize) -> Option<usize> {
        if pos == 0 {
            return None;
        }
        self.jump_positions(bytes)
            .into_iter()
            .rev()
            .find(|&p| p < pos)
    }

    /// Nearest phrase start strictly right of `pos`, if any.
    pub fn next_start(&self, bytes: &[u8], pos: usize) -> Option<usize> {
        if pos >= bytes.len() {
            return None;
        }
        self.start_positions(bytes).into_iter().find(|&p| p > pos)
    }

    /// Nearest phrase start strictly left of `pos`, if any.
    pub fn prev_start(&self, bytes: &[u8], pos: usize) -> Option<usize> {
        if pos == 0 {
            return None;
        }
        self.start_positions(bytes)
            .into_iter()
            .rev()
            .find(|&p| p < pos)
    }
}
