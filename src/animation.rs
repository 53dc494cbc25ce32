//! Animation driver: the year cursor state machine and the repeating timer
//! that advances it.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Cadence of the year animation.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(1000);

/// When the cursor jumps back to the first year.
///
/// `AfterCount` wraps only once the index is *strictly greater* than the
/// year count, so the cycle walks past the last year onto two empty frames
/// (`0..=count + 1`). This is the long-standing behaviour and the default.
/// `AtCount` wraps right after the last year (`0..count`), which is most
/// likely what was intended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WrapRule {
    #[default]
    AfterCount,
    AtCount,
}

/// One-field state machine: which year group is on screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct YearCursor {
    index: usize,
    rule: WrapRule,
}

impl YearCursor {
    pub fn new(rule: WrapRule) -> Self {
        Self { index: 0, rule }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn rule(&self) -> WrapRule {
        self.rule
    }

    /// Apply one tick given the current number of years. Returns the new index.
    pub fn advance(&mut self, year_count: usize) -> usize {
        let wrap = match self.rule {
            WrapRule::AfterCount => self.index > year_count,
            WrapRule::AtCount => self.index + 1 >= year_count,
        };
        self.index = if wrap { 0 } else { self.index + 1 };
        self.index
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }

    /// Ticks needed to come back to index 0 when starting from 0.
    pub fn cycle_len(&self, year_count: usize) -> usize {
        match self.rule {
            WrapRule::AfterCount => year_count + 2,
            WrapRule::AtCount => year_count.max(1),
        }
    }
}

/// Repeating timer running on its own thread.
///
/// The thread is stopped and joined by [`Ticker::stop`] or on drop, so the
/// timer never outlives its owner.
#[derive(Debug)]
pub struct Ticker {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    /// Call `on_tick` every `interval` until stopped.
    pub fn spawn<F>(interval: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let (stop, stop_rx) = mpsc::channel::<()>();
        let handle = thread::spawn(move || {
            loop {
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => on_tick(),
                    // explicit stop or owner dropped
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            debug!("ticker stopped");
        });
        Self {
            stop: Some(stop),
            handle: Some(handle),
        }
    }

    /// Ticker whose ticks arrive on the returned channel.
    pub fn channel(interval: Duration) -> (Self, Receiver<()>) {
        let (tx, rx) = mpsc::channel();
        let ticker = Self::spawn(interval, move || {
            let _ = tx.send(());
        });
        (ticker, rx)
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop the timer and wait for its thread. Idempotent.
    pub fn stop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            warn!("ticker thread panicked");
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop();
    }
}
