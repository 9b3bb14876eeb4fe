//! Session history: an append-only list of accepted input lines with a
//! reverse-search filter overlay.
//!
//! Entries are byte strings because the editor buffer is one; they are
//! never mutated or removed during a session. Consecutive duplicates are
//! collapsed on push. The filter side is plain contiguous-substring
//! containment, scanned linearly; sessions are short enough that nothing
//! cleverer pays for itself.

#[derive(Debug, Default)]
pub struct History {
    entries: Vec<Vec<u8>>,
}

/// Match statistics for the reverse-search status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchStats {
    /// Number of entries containing the filter.
    pub total: usize,
    /// 0-based position of the selected entry among the matches, counted
    /// from the most recent match.
    pub current: Option<usize>,
}

/// True when `filter` occurs as a contiguous substring of `entry`. An empty
/// filter matches everything.
pub fn matches(entry: &[u8], filter: &[u8]) -> bool {
    if filter.is_empty() {
        return true;
    }
    if filter.len() > entry.len() {
        return false;
    }
    entry.windows(filter.len()).any(|w| w == filter)
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&[u8]> {
        self.entries.get(index).map(Vec::as_slice)
    }

    /// Append unless equal to the last entry (empty equality included).
    pub fn push(&mut self, entry: &[u8]) {
        if self.entries.last().is_some_and(|last| last == entry) {
            return;
        }
        self.entries.push(entry.to_vec());
    }

    /// Most recent index before `from` whose entry matches `filter`.
    pub fn prev_match(&self, from: usize, filter: &[u8]) -> Option<usize> {
        (0..from.min(self.entries.len()))
            .rev()
            .find(|&i| matches(&self.entries[i], filter))
    }

    /// First index after `from` whose entry matches `filter`.
    pub fn next_match(&self, from: usize, filter: &[u8]) -> Option<usize> {
        (from + 1..self.entries.len()).find(|&i| matches(&self.entries[i], filter))
    }

    /// Most recent index matching `filter`, scanning the whole history.
    pub fn latest_match(&self, filter: &[u8]) -> Option<usize> {
        self.prev_match(self.entries.len(), filter)
    }

    /// Count matches and locate `selected` among them, newest first.
    pub fn search_stats(&self, filter: &[u8], selected: Option<usize>) -> SearchStats {
        let mut total = 0;
        let mut current = None;
        for i in (0..self.entries.len()).rev() {
            if matches(&self.entries[i], filter) {
                if selected == Some(i) {
                    current = Some(total);
                }
                total += 1;
            }
        }
        SearchStats { total, current }
    }
}
