//! Stdin input pipeline: a reader actor and a flusher actor sharing a
//! [`Collator`] behind a mutex.
//!
//! The reader blocks on byte-at-a-time reads and appends under a short
//! critical section. The flusher wakes every machine interval and, once the
//! pending group has gone idle, moves it out and delivers it as one
//! [`Event::Keystroke`]. The send happens while the collator lock is held
//! and blocks when the channel is full, so backpressure propagates all the
//! way to the reader: terminal input pauses until the dispatcher catches up.

use core_events::{CHANNEL_BLOCKING_SENDS, Event, KEYSTROKE_BYTES, KEYSTROKE_MESSAGES};
use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::mpsc::Sender;
use tokio::task::{self, JoinHandle};
use tracing::{debug, trace, warn};

mod collator;
pub use collator::Collator;

/// Stops the flusher actor. The reader ends on its own at EOF or read
/// error; while it is parked in a stdin read only process exit unblocks it.
#[derive(Clone, Debug)]
pub struct InputShutdown {
    stop: Arc<AtomicBool>,
}

impl InputShutdown {
    pub fn signal(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

pub struct InputPipeline {
    pub reader: JoinHandle<()>,
    pub flusher: JoinHandle<()>,
    pub shutdown: InputShutdown,
}

/// Spawn the pipeline over the process stdin.
pub fn spawn_stdin_pipeline(tx: Sender<Event>, machine_interval: Duration) -> InputPipeline {
    spawn_pipeline(std::io::stdin(), tx, machine_interval)
}

/// Spawn the pipeline over an arbitrary byte source (tests feed cursors).
pub fn spawn_pipeline<R>(source: R, tx: Sender<Event>, machine_interval: Duration) -> InputPipeline
where
    R: Read + Send + 'static,
{
    let collator = Arc::new(Mutex::new(Collator::new()));
    let stop = Arc::new(AtomicBool::new(false));
    let shutdown = InputShutdown { stop: stop.clone() };

    let reader = task::spawn_blocking({
        let collator = collator.clone();
        let tx = tx.clone();
        move || reader_loop(source, &collator, &tx)
    });

    let flusher = task::spawn_blocking({
        let collator = collator.clone();
        move || flusher_loop(&collator, &tx, machine_interval, &stop)
    });

    InputPipeline {
        reader,
        flusher,
        shutdown,
    }
}

fn reader_loop<R: Read>(mut source: R, collator: &Mutex<Collator>, tx: &Sender<Event>) {
    debug!(target: "input.reader", "reader_started");
    let mut byte = [0u8; 1];
    loop {
        match source.read(&mut byte) {
            Ok(0) => {
                debug!(target: "input.reader", "eof");
                break;
            }
            Ok(_) => {
                let mut pending = collator.lock().expect("collator lock poisoned");
                pending.push(byte[0], Instant::now());
            }
            Err(e) => {
                warn!(target: "input.reader", error = %e, "read_failed");
                break;
            }
        }
    }
    // Hand over anything still pending before announcing the end of input.
    let trailing = collator.lock().expect("collator lock poisoned").take_all();
    if let Some(msg) = trailing {
        let _ = tx.blocking_send(Event::Keystroke(msg));
    }
    let _ = tx.blocking_send(Event::InputClosed);
}

fn flusher_loop(
    collator: &Mutex<Collator>,
    tx: &Sender<Event>,
    machine_interval: Duration,
    stop: &AtomicBool,
) {
    debug!(target: "input.flush", interval_us = machine_interval.as_micros() as u64, "flusher_started");
    loop {
        if stop.load(Ordering::Relaxed) {
            break;
        }
        std::thread::sleep(machine_interval);
        // The lock is held across the send on purpose: a full channel must
        // also stall the reader appending new bytes.
        let mut pending = collator.lock().expect("collator lock poisoned");
        if let Some(msg) = pending.take_ready(Instant::now(), machine_interval) {
            KEYSTROKE_MESSAGES.fetch_add(1, Ordering::Relaxed);
            KEYSTROKE_BYTES.fetch_add(msg.len() as u64, Ordering::Relaxed);
            CHANNEL_BLOCKING_SENDS.fetch_add(1, Ordering::Relaxed);
            trace!(target: "input.flush", len = msg.len(), "message_flushed");
            if tx.blocking_send(Event::Keystroke(msg)).is_err() {
                break;
            }
        }
    }
    debug!(target: "input.flush", "flusher_stopped");
}
