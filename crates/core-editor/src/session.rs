//! Re-entrant session handle passed to `Evaluator::evaluate`.
//!
//! Evaluation runs synchronously on the dispatcher, but an evaluator may
//! still need terminal services while it is in flight: prompt the user for
//! a secondary line, or drop raw mode around a full-screen child program.
//! The session borrows exactly the engine parts those services need.

use anyhow::Result;
use core_events::Event;
use core_terminal::{AnsiSink, TerminalControl};
use std::io::Write;
use tokio::sync::mpsc::Receiver;

/// Run a blocking closure from dispatcher context. Inside a multi-threaded
/// tokio runtime the blocking section is announced to the executor; outside
/// a runtime (unit tests, sync embedding) the closure runs directly.
pub(crate) fn run_blocking<R>(f: impl FnOnce() -> R) -> R {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == tokio::runtime::RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(f)
        }
        _ => f(),
    }
}

pub struct Session<'a> {
    rx: Option<&'a mut Receiver<Event>>,
    term: &'a mut dyn TerminalControl,
    out: &'a mut dyn Write,
    prompt_row: usize,
    height: usize,
}

impl<'a> Session<'a> {
    pub(crate) fn new(
        rx: Option<&'a mut Receiver<Event>>,
        term: &'a mut dyn TerminalControl,
        out: &'a mut dyn Write,
        prompt_row: usize,
        height: usize,
    ) -> Self {
        Self {
            rx,
            term,
            out,
            prompt_row,
            height,
        }
    }

    /// Bounded secondary input: accumulate printable bytes until Enter.
    /// Byte 27 aborts the rest of its message; echo is best-effort. Returns
    /// what was collected so far if the input stream ends.
    pub fn read_line(&mut self, echo: bool) -> String {
        let Some(rx) = self.rx.take() else {
            return String::new();
        };
        let mut collected = Vec::new();
        loop {
            let Some(event) = run_blocking(|| rx.blocking_recv()) else {
                break;
            };
            match event {
                Event::Keystroke(bytes) => {
                    if bytes.len() == 1 && bytes[0] == 13 {
                        if echo {
                            let _ = self.out.write_all(b"\n\r");
                            let _ = self.out.flush();
                        }
                        break;
                    }
                    for &b in &bytes {
                        if b == 27 {
                            break;
                        }
                        if b >= 32 {
                            if echo {
                                let _ = self.out.write_all(&[b]);
                            }
                            collected.push(b);
                        }
                    }
                    if echo {
                        let _ = self.out.flush();
                    }
                }
                Event::Resize { .. } => {}
                Event::InputClosed => break,
            }
        }
        self.rx = Some(rx);
        String::from_utf8_lossy(&collected).into_owned()
    }

    /// Leave raw mode so a full-screen child program (vi, top, ...) can own
    /// the terminal. Pair with [`Session::make_raw`] when it exits.
    pub fn unmake_raw(&mut self) -> Result<()> {
        self.term.restore()
    }

    pub fn make_raw(&mut self) -> Result<()> {
        self.term.make_raw()
    }

    /// Clean up the screen, restore the terminal, and exit the process.
    pub fn quit(&mut self) -> ! {
        let mut sink = AnsiSink::new(&mut *self.out);
        let _ = sink.move_cursor_to(0, self.height.saturating_sub(1));
        let rows = self.height.saturating_sub(1).saturating_sub(self.prompt_row);
        let _ = sink.clear_rows(rows);
        let _ = sink.newline();
        let _ = sink.move_to_row_start();
        let _ = self.term.restore();
        std::process::exit(0);
    }
}
