//! Byte collator: groups a raw byte stream into keystroke messages.
//!
//! A message is everything that arrived without an idle gap longer than the
//! machine interval. Humans type orders of magnitude slower than that, while
//! a terminal emits an escape sequence (or delivers a paste) as one
//! contiguous burst, so the gap cleanly separates logical input events. Pure
//! state machine; the actors drive it with real timestamps.

use std::time::{Duration, Instant};

#[derive(Debug, Default)]
pub struct Collator {
    pending: Vec<u8>,
    last_byte: Option<Instant>,
}

impl Collator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, byte: u8, now: Instant) {
        self.pending.push(byte);
        self.last_byte = Some(now);
    }

    /// Take the pending group if it has been idle for at least `idle`.
    pub fn take_ready(&mut self, now: Instant, idle: Duration) -> Option<Vec<u8>> {
        if self.pending.is_empty() {
            return None;
        }
        let last = self.last_byte?;
        if now.duration_since(last) >= idle {
            Some(std::mem::take(&mut self.pending))
        } else {
            None
        }
    }

    /// Take whatever is pending regardless of idle time (end of stream).
    pub fn take_all(&mut self) -> Option<Vec<u8>> {
        if self.pending.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.pending))
        }
    }
}
