//! The redline engine: editor state, keystroke dispatch, and the REPL loop.
//!
//! One [`Repl`] instance owns the input buffer, cursor, viewport window,
//! prompt anchor row, history cursor, reverse-search filter, and kill
//! register. Keystroke messages are decoded into [`keys::Key`] actions and
//! applied here; every mutation ends in a visually consistent terminal
//! state via the minimal-redraw protocol in `view`.
//!
//! Concurrency shape: the reader/flusher actors and the size poller feed
//! one bounded channel; [`Repl::run`] is the sole consumer and the sole
//! mutator of editor state, so rendering never interleaves.

use anyhow::{Result, bail};
use core_events::{EVENT_CHANNEL_CAP, Event, EventSourceRegistry, SizePollSource};
use core_history::History;
use core_input::spawn_stdin_pipeline;
use core_terminal::{AnsiSink, CrosstermBackend, TerminalControl};
use core_text::PhraseScanner;
use std::io::Write;
use tokio::sync::mpsc::{self, Receiver};
use tracing::{debug, info, trace};

mod edit;
mod evaluator;
pub mod keys;
mod motion;
mod search;
mod session;
mod status;
mod view;

pub use core_config::EngineConfig;
pub use evaluator::Evaluator;
pub use keys::Key;
pub use session::Session;

pub struct Repl<T: TerminalControl = CrosstermBackend, W: Write = std::io::Stdout> {
    evaluator: Box<dyn Evaluator>,
    config: EngineConfig,
    term: T,
    sink: AnsiSink<W>,
    phrases: PhraseScanner,

    buffer: Vec<u8>,
    cursor: usize,
    view_start: usize,
    /// `None` means "to the end of the buffer".
    view_end: Option<usize>,
    prompt_row: usize,
    width: usize,
    height: usize,

    history: History,
    history_index: Option<usize>,
    backup: Option<Vec<u8>>,
    filter: Option<Vec<u8>>,
    prev_deletion: Vec<u8>,

    rx: Option<Receiver<Event>>,
}

impl Repl {
    /// Engine over the process terminal: raw mode via crossterm, output on
    /// stdout.
    pub fn new(evaluator: Box<dyn Evaluator>, config: EngineConfig) -> Self {
        Self::with_parts(evaluator, config, CrosstermBackend::new(), AnsiSink::stdout())
    }
}

impl<T: TerminalControl, W: Write> Repl<T, W> {
    /// Engine over explicit terminal parts; tests drive it with a fixed
    /// geometry and a captured byte sink.
    pub fn with_parts(
        evaluator: Box<dyn Evaluator>,
        config: EngineConfig,
        term: T,
        sink: AnsiSink<W>,
    ) -> Self {
        let (width, height) = term.size().unwrap_or((0, 0));
        Self {
            evaluator,
            config,
            term,
            sink,
            phrases: PhraseScanner::new(),
            buffer: Vec::new(),
            cursor: 0,
            view_start: 0,
            view_end: None,
            prompt_row: 0,
            width: width as usize,
            height: height as usize,
            history: History::new(),
            history_index: None,
            backup: None,
            filter: None,
            prev_deletion: Vec::new(),
            rx: None,
        }
    }

    // ---- read-only state, for embedders and tests ----

    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn history_index(&self) -> Option<usize> {
        self.history_index
    }

    pub fn search_filter(&self) -> Option<&[u8]> {
        self.filter.as_deref()
    }

    pub fn view_range(&self) -> (usize, Option<usize>) {
        (self.view_start, self.view_end)
    }

    pub fn prompt_row(&self) -> usize {
        self.prompt_row
    }

    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn prev_deletion(&self) -> &[u8] {
        &self.prev_deletion
    }

    /// Everything written to the terminal so far (captured sinks only).
    pub fn output(&self) -> &W {
        self.sink.writer()
    }

    // ---- main loop ----

    /// Enter raw mode, start the input pipeline and the size poller, then
    /// dispatch keystroke messages until the input stream dies. Requires a
    /// multi-threaded tokio runtime.
    pub async fn run(mut self) -> Result<()> {
        self.term.make_raw()?;
        let (w, h) = self.term.size()?;
        self.width = w as usize;
        self.height = h as usize;

        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAP);
        let pipeline = spawn_stdin_pipeline(tx.clone(), self.config.machine_interval);
        let mut registry = EventSourceRegistry::new();
        registry.register(SizePollSource::new(
            self.config.size_polling_interval,
            (w, h),
        ));
        let _source_handles = registry.spawn_all(tx);
        self.rx = Some(rx);

        self.print_prompt()?;
        self.sink.query_cursor_position()?;
        info!(target: "runtime", width = w, height = h, "session_started");

        loop {
            let event = match self.rx.as_mut() {
                Some(rx) => rx.recv().await,
                None => None,
            };
            match event {
                Some(Event::Keystroke(bytes)) => self.handle_message(&bytes)?,
                Some(Event::Resize { width, height }) => {
                    self.resize(width as usize, height as usize)?;
                }
                Some(Event::InputClosed) => {
                    pipeline.shutdown.signal();
                    self.term.restore()?;
                    bail!("input stream closed");
                }
                None => {
                    self.term.restore()?;
                    bail!("event channel closed");
                }
            }
        }
    }

    /// Decode and apply one keystroke message. This is the dispatcher
    /// entry; `run` calls it for every channel event, and tests feed it
    /// synthetic messages.
    pub fn handle_message(&mut self, bytes: &[u8]) -> Result<()> {
        let Some(key) = keys::decode(bytes) else {
            trace!(target: "editor.dispatch", len = bytes.len(), "message_dropped");
            return Ok(());
        };
        trace!(target: "editor.dispatch", key = key.name(), len = bytes.len(), "keystroke");
        self.apply(key)
    }

    /// Apply a terminal size change and repaint.
    pub fn resize(&mut self, width: usize, height: usize) -> Result<()> {
        if width != self.width || height != self.height {
            self.width = width;
            self.height = height;
            debug!(target: "editor.render", width, height, "resized");
            let buffer = self.buffer.clone();
            let cursor = self.cursor;
            self.force(buffer, cursor)?;
        }
        Ok(())
    }

    fn apply(&mut self, key: Key) -> Result<()> {
        match key {
            Key::MoveBufferStart => self.guarded(Self::move_to_buffer_start),
            Key::MoveBufferEnd => self.guarded(Self::move_to_buffer_end),
            Key::MoveLeft => self.guarded(Self::move_left_one_char),
            Key::MoveRight => self.guarded(Self::move_right_one_char),
            Key::MovePhraseLeft => self.guarded(Self::move_left_one_phrase),
            Key::MovePhraseRight => self.guarded(Self::move_right_one_phrase),
            Key::MoveLineUp => self.guarded(Self::move_up_one_line),
            Key::MoveLineDown => self.guarded(Self::move_down_one_line),
            Key::Cancel => {
                if self.search_active() {
                    self.stop_search()
                } else {
                    self.clear_buffer()?;
                    self.write_status()
                }
            }
            Key::Quit => self.quit(),
            Key::Backspace => {
                if self.search_active() {
                    self.search_backspace()
                } else {
                    self.backspace()
                }
            }
            Key::DeleteChar => self.guarded(Self::delete_char),
            Key::Tab => self.guarded(Self::tab_complete),
            Key::InsertNewline => {
                if self.search_active() {
                    self.stop_search()
                } else {
                    self.clear_status()?;
                    self.add_bytes_to_buffer(vec![b'\n'])?;
                    self.write_status()
                }
            }
            Key::Enter => {
                if self.search_active() {
                    self.stop_search()
                } else {
                    self.eval_buffer()
                }
            }
            Key::KillToEnd => self.guarded(Self::clear_to_end),
            Key::KillToStart => self.guarded(Self::clear_to_start),
            Key::KillPhraseLeft => self.guarded(Self::clear_one_phrase_left),
            Key::KillPhraseRight => self.guarded(Self::clear_one_phrase_right),
            Key::Yank => {
                if self.search_active() {
                    self.stop_search()
                } else {
                    self.clear_status()?;
                    self.insert_prev_deletion()?;
                    self.write_status()
                }
            }
            Key::RedrawScreen => self.redraw_screen(),
            Key::HistoryBack => self.history_back(),
            Key::HistoryForward => self.history_forward(),
            Key::ReverseSearch => {
                if self.search_active() {
                    Ok(())
                } else {
                    self.start_reverse_search()
                }
            }
            Key::Insert(b) => {
                if self.search_active() {
                    self.search_insert(b)
                } else {
                    self.clear_status()?;
                    self.add_bytes_to_buffer(vec![b])?;
                    self.write_status()
                }
            }
            Key::Paste(bytes) => {
                if self.search_active() {
                    self.stop_search()?;
                }
                self.clear_status()?;
                self.add_bytes_to_buffer(bytes)?;
                self.write_status()
            }
            Key::CursorReply { pos, pasted } => {
                if let Some((_x, y)) = pos {
                    self.set_prompt_row(y);
                    self.write_status()?;
                }
                if !pasted.is_empty() {
                    self.clear_status()?;
                    self.add_bytes_to_buffer(pasted)?;
                    self.write_status()?;
                }
                Ok(())
            }
        }
    }

    /// Reverse-search intercepts every non-search-compatible keystroke: it
    /// ends the search instead of performing the action.
    fn guarded(&mut self, action: fn(&mut Self) -> Result<()>) -> Result<()> {
        if self.search_active() {
            self.stop_search()
        } else {
            action(self)
        }
    }

    fn eval_buffer(&mut self) -> Result<()> {
        self.clear_status()?;
        self.sink.newline()?;

        let line = String::from_utf8_lossy(&self.buffer).into_owned();
        let trimmed = line.trim().to_string();
        debug!(target: "editor.dispatch", len = trimmed.len(), "evaluate");

        // Input typed while the evaluator blocks is delivered later in the
        // same message as the cursor-position reply issued below; the
        // CursorReply arm picks it up.
        let out = {
            let Self {
                evaluator,
                rx,
                term,
                sink,
                prompt_row,
                height,
                ..
            } = self;
            let mut session = Session::new(
                rx.as_mut(),
                term,
                sink.writer_mut(),
                *prompt_row,
                *height,
            );
            session::run_blocking(|| evaluator.evaluate(&trimmed, &mut session))
        };

        if !out.is_empty() {
            for part in out.split('\n') {
                self.sink.print_str(part)?;
                self.sink.newline()?;
            }
        }

        self.history.push(&self.buffer);
        self.history_index = None;
        self.backup = None;
        self.reset_buffer()?;
        self.sink.query_cursor_position()?;
        Ok(())
    }

    fn quit(&mut self) -> Result<()> {
        self.clear_after_prompt()?;
        self.sink.newline()?;
        self.sink.move_to_row_start()?;
        self.term.restore()?;
        info!(target: "runtime", "quit");
        std::process::exit(0);
    }

    fn print_prompt(&mut self) -> Result<()> {
        self.sink.move_to_row_start()?;
        let prompt = self.evaluator.prompt();
        self.sink.print_str(&prompt)?;
        Ok(())
    }

    fn prompt_len(&self) -> usize {
        self.evaluator.prompt().len()
    }
}
