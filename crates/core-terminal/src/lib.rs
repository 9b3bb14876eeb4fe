//! Terminal raw-mode control and the ANSI escape sink.
//!
//! The engine intercepts control bytes itself, so the terminal must sit in
//! raw mode for the whole session; canonical mode never reaches the
//! dispatcher. [`TerminalControl`] abstracts the mode switch and the size
//! query so tests can substitute a fixed-geometry fake, while [`AnsiSink`]
//! owns every escape sequence the engine ever writes.

use anyhow::Result;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use tracing::debug;

mod ansi;
pub use ansi::AnsiSink;

/// Raw-mode switch and size query, the engine's only OS-facing terminal
/// capability. `unmake_raw`/`make_raw` pairs let an evaluator run a foreign
/// full-screen program mid-session.
pub trait TerminalControl {
    fn make_raw(&mut self) -> Result<()>;
    fn restore(&mut self) -> Result<()>;
    fn size(&self) -> Result<(u16, u16)>;
}

/// Crossterm-backed raw-mode control restoring the terminal on drop.
#[derive(Default)]
pub struct CrosstermBackend {
    raw: bool,
}

impl CrosstermBackend {
    pub fn new() -> Self {
        Self { raw: false }
    }
}

impl TerminalControl for CrosstermBackend {
    fn make_raw(&mut self) -> Result<()> {
        if !self.raw {
            enable_raw_mode()?;
            self.raw = true;
            debug!(target: "terminal", "raw_mode_entered");
        }
        Ok(())
    }

    fn restore(&mut self) -> Result<()> {
        if self.raw {
            disable_raw_mode()?;
            self.raw = false;
            debug!(target: "terminal", "raw_mode_left");
        }
        Ok(())
    }

    fn size(&self) -> Result<(u16, u16)> {
        Ok(crossterm::terminal::size()?)
    }
}

impl Drop for CrosstermBackend {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}
