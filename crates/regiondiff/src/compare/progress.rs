use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use tokio::sync::mpsc;

/// Snapshot emitted after every processed batch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Progress {
    /// `processed / total * 100`.
    pub percent: f64,
    /// Row of the last processed pixel.
    pub row: u32,
    /// Column of the last processed pixel.
    pub col: u32,
    /// Pixels processed so far.
    pub processed: u64,
    /// Running `matching / processed * 100`.
    pub match_percent: f64,
}

/// Receives progress notifications. Implementations must return promptly:
/// the engine does not continue until `progress` returns.
pub trait ProgressSink {
    fn progress(&mut self, event: &Progress);
}

/// Discard all events.
impl ProgressSink for () {
    fn progress(&mut self, _event: &Progress) {}
}

impl<F: FnMut(&Progress)> ProgressSink for F {
    fn progress(&mut self, event: &Progress) {
        self(event)
    }
}

/// Forward events to a bounded channel. Events are dropped rather than
/// waited on when the receiver lags behind or has gone away.
impl ProgressSink for mpsc::Sender<Progress> {
    fn progress(&mut self, event: &Progress) {
        let _ = self.try_send(*event);
    }
}

/// Cooperative stop signal shared between the caller and a running comparison.
///
/// Clones observe the same flag. The engine polls it once per batch boundary.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
