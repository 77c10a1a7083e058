//! One-second tick source for the running countdown.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Interval between ticks.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// A tick delivered to the control thread.
///
/// `epoch` identifies the arming that produced it; the engine drops ticks
/// from any earlier arming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub epoch: u64,
}

/// Something that can deliver [`Tick`]s while armed.
pub trait TickScheduler {
    /// Starts delivering ticks stamped with `epoch`, replacing any earlier schedule.
    fn schedule(&mut self, epoch: u64);
    /// Stops delivering ticks.
    fn cancel(&mut self);
}

/// Ticks from a background thread into a channel read by the event loop.
pub struct ThreadTicker {
    tx: Sender<Tick>,
    stop: Option<Arc<AtomicBool>>,
}

impl ThreadTicker {
    pub fn new(tx: Sender<Tick>) -> Self {
        Self { tx, stop: None }
    }
}

impl TickScheduler for ThreadTicker {
    fn schedule(&mut self, epoch: u64) {
        self.cancel();

        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);
        let tx = self.tx.clone();

        thread::spawn(move || loop {
            thread::sleep(TICK_INTERVAL);
            if thread_stop.load(Ordering::Acquire) {
                break;
            }
            if tx.send(Tick { epoch }).is_err() {
                // Receiver gone, the app is shutting down
                break;
            }
        });

        self.stop = Some(stop);
    }

    fn cancel(&mut self) {
        if let Some(stop) = self.stop.take() {
            stop.store(true, Ordering::Release);
        }
    }
}

impl Drop for ThreadTicker {
    fn drop(&mut self) {
        self.cancel();
    }
}
