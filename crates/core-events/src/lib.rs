//! Event types and channel policy for the redline editor loop.
//!
//! Everything the foreground dispatcher reacts to arrives as an [`Event`] on
//! one bounded mpsc channel: keystroke messages grouped by the input
//! pipeline, terminal size changes from the polling source, and the
//! end-of-input marker. Collapsing all producers onto a single channel keeps
//! the dispatcher a plain receive loop and makes it the sole mutator of
//! editor state.

use std::fmt;
use std::sync::atomic::AtomicU64;
use std::time::Duration;
use tokio::sync::mpsc::Sender;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

// The channel is deliberately small: the flusher performs a blocking send,
// so a full channel pauses the whole input pipeline (and ultimately the
// terminal) until the dispatcher catches up. A keystroke message is one
// grouped burst, not one byte, so a handful of slots is ample headroom for
// typing during a slow `evaluate`.
pub const EVENT_CHANNEL_CAP: usize = 8;

// Relaxed counters for inspection in tests and periodic logging. No locking;
// exactness across threads is not required.
pub static KEYSTROKE_MESSAGES: AtomicU64 = AtomicU64::new(0);
pub static KEYSTROKE_BYTES: AtomicU64 = AtomicU64::new(0);
pub static CHANNEL_BLOCKING_SENDS: AtomicU64 = AtomicU64::new(0);
pub static RESIZE_EVENTS: AtomicU64 = AtomicU64::new(0);

/// One unit of work for the editor loop.
#[derive(Clone)]
pub enum Event {
    /// A keystroke message: a contiguous byte group representing one
    /// keystroke, one pasted run, or one terminal reply.
    Keystroke(Vec<u8>),
    /// The terminal reported new dimensions.
    Resize { width: u16, height: u16 },
    /// Stdin reached EOF or failed; no further keystrokes will arrive.
    InputClosed,
}

// Keystroke payloads are user input; logs carry lengths only.
impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Keystroke(bytes) => write!(f, "Keystroke(len={})", bytes.len()),
            Event::Resize { width, height } => write!(f, "Resize({width}x{height})"),
            Event::InputClosed => write!(f, "InputClosed"),
        }
    }
}

/// An async producer of [`Event`]s. Implementors spawn one background task
/// that pushes into the shared channel and terminates when the channel
/// closes (consumer dropped).
pub trait AsyncEventSource: Send + 'static {
    /// Stable identifier used for logging.
    fn name(&self) -> &'static str;
    /// Consume self and spawn the background task.
    fn spawn(self: Box<Self>, tx: Sender<Event>) -> JoinHandle<()>;
}

/// Registry of event sources spawned together at loop startup.
#[derive(Default)]
pub struct EventSourceRegistry {
    sources: Vec<Box<dyn AsyncEventSource>>,
}

impl EventSourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<S: AsyncEventSource>(&mut self, source: S) {
        self.sources.push(Box::new(source));
    }

    pub fn spawn_all(self, tx: Sender<Event>) -> Vec<JoinHandle<()>> {
        self.sources
            .into_iter()
            .map(|s| {
                debug!(target: "runtime", source = s.name(), "event_source_spawned");
                s.spawn(tx.clone())
            })
            .collect()
    }
}

/// Polls the terminal size and emits [`Event::Resize`] when it changes.
///
/// The interval (default 10 ms) sits between human reaction time and the
/// burst timing of escape sequences, so a resize repaint never lags
/// perceptibly and never races a keystroke group.
pub struct SizePollSource {
    interval: Duration,
    last: Option<(u16, u16)>,
}

impl SizePollSource {
    /// `initial` is the size already installed in editor state; the first
    /// differing poll triggers the first resize event.
    pub fn new(interval: Duration, initial: (u16, u16)) -> Self {
        Self {
            interval,
            last: Some(initial),
        }
    }
}

impl AsyncEventSource for SizePollSource {
    fn name(&self) -> &'static str {
        "size_poll"
    }

    fn spawn(self: Box<Self>, tx: Sender<Event>) -> JoinHandle<()> {
        let mut last = self.last;
        let period = self.interval;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                let Ok((w, h)) = crossterm::terminal::size() else {
                    continue;
                };
                if last == Some((w, h)) {
                    continue;
                }
                last = Some((w, h));
                RESIZE_EVENTS.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
                trace!(target: "poll.size", width = w, height = h, "size_changed");
                if tx
                    .send(Event::Resize {
                        width: w,
                        height: h,
                    })
                    .await
                    .is_err()
                {
                    break;
                }
            }
            debug!(target: "poll.size", "size_poll_stopped");
        })
    }
}
