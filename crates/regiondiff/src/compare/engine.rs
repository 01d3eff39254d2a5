use image::RgbaImage;
use tracing::debug;

use super::progress::{CancelToken, Progress, ProgressSink};
use super::{ComparisonResult, Outcome};
use crate::CompareError;
use crate::settings::ComparisonSettings;

/// Default number of pixels per batch.
pub const BATCH_SIZE: usize = 2000;

/// What the driver should do after a batch boundary.
enum Flow {
    Continue,
    Done,
    Cancelled,
}

/// One in-flight comparison of two equally sized region buffers.
///
/// `step` is the pure unit of work: it classifies the next batch and returns
/// the progress snapshot. Drivers (`run`, `run_async`) decide how to schedule
/// the steps and where to poll the cancel token.
pub struct Comparison {
    left: RgbaImage,
    right: RgbaImage,
    diff_map: RgbaImage,
    max_allowed_diff: f64,
    match_px: [u8; 4],
    diff_px: [u8; 4],
    batch_size: usize,
    total: u64,
    processed: u64,
    matching: u64,
}

impl Comparison {
    pub fn new(
        left: RgbaImage,
        right: RgbaImage,
        settings: &ComparisonSettings,
    ) -> Result<Self, CompareError> {
        settings.validate()?;
        if left.dimensions() != right.dimensions() {
            return Err(CompareError::DimensionMismatch {
                left_w: left.width(),
                left_h: left.height(),
                right_w: right.width(),
                right_h: right.height(),
            });
        }
        let (w, h) = left.dimensions();
        if w == 0 || h == 0 {
            return Err(CompareError::Input(format!("nothing to compare in a {w}x{h} region")));
        }

        Ok(Self {
            left,
            right,
            diff_map: RgbaImage::new(w, h),
            max_allowed_diff: settings.max_allowed_diff(),
            match_px: settings.match_color.opaque().0,
            diff_px: settings.diff_color.opaque().0,
            batch_size: settings.batch_size,
            total: u64::from(w) * u64::from(h),
            processed: 0,
            matching: 0,
        })
    }

    pub fn total_pixels(&self) -> u64 {
        self.total
    }

    pub fn processed(&self) -> u64 {
        self.processed
    }

    pub fn is_done(&self) -> bool {
        self.processed >= self.total
    }

    /// Classify the next batch of pixels, write their diff-map colours and
    /// return the progress after it. A finished comparison returns the final
    /// progress again without doing any work.
    pub fn step(&mut self) -> Progress {
        let start = self.processed as usize;
        let end = (start + self.batch_size).min(self.total as usize);
        let range = start * 4..end * 4;

        let left = &self.left.as_raw()[range.clone()];
        let right = &self.right.as_raw()[range.clone()];
        let out = &mut (*self.diff_map)[range];

        let mut matching = 0u64;
        for ((a, b), px) in left
            .chunks_exact(4)
            .zip(right.chunks_exact(4))
            .zip(out.chunks_exact_mut(4))
        {
            if f64::from(channel_delta(a, b)) <= self.max_allowed_diff {
                matching += 1;
                px.copy_from_slice(&self.match_px);
            } else {
                px.copy_from_slice(&self.diff_px);
            }
        }

        self.matching += matching;
        self.processed = end as u64;
        self.progress()
    }

    fn progress(&self) -> Progress {
        let width = u64::from(self.left.width());
        let last = self.processed.saturating_sub(1);
        Progress {
            percent: self.processed as f64 / self.total as f64 * 100.0,
            row: (last / width) as u32,
            col: (last % width) as u32,
            processed: self.processed,
            match_percent: if self.processed > 0 {
                self.matching as f64 / self.processed as f64 * 100.0
            } else {
                0.0
            },
        }
    }

    /// Result and diff map, once every pixel has been processed.
    pub fn finish(self) -> Option<Outcome> {
        if self.is_done() {
            Some(self.complete())
        } else {
            None
        }
    }

    fn complete(self) -> Outcome {
        let result = ComparisonResult::from_counts(self.total, self.matching);
        debug!(
            total = result.total_pixels,
            matching = result.matching_pixels,
            similarity = result.similarity,
            "comparison complete"
        );
        Outcome::Completed {
            result,
            diff_map: self.diff_map,
        }
    }

    /// One batch plus the surrounding cancellation polls and progress event.
    fn advance<P: ProgressSink + ?Sized>(&mut self, progress: &mut P, cancel: &CancelToken) -> Flow {
        if cancel.is_cancelled() {
            return Flow::Cancelled;
        }
        let event = self.step();
        if cancel.is_cancelled() {
            return Flow::Cancelled;
        }
        progress.progress(&event);
        if self.is_done() {
            Flow::Done
        } else {
            Flow::Continue
        }
    }

    /// Drive the comparison to the end on the current thread, yielding the
    /// time slice between batches.
    pub fn run<P: ProgressSink + ?Sized>(mut self, progress: &mut P, cancel: &CancelToken) -> Outcome {
        debug!(
            total = self.total,
            batch_size = self.batch_size,
            "starting comparison"
        );
        loop {
            match self.advance(progress, cancel) {
                Flow::Continue => std::thread::yield_now(),
                Flow::Done => return self.complete(),
                Flow::Cancelled => return self.cancelled(),
            }
        }
    }

    /// Async driver: yields to the runtime between batches so other tasks
    /// (signal handlers, progress consumers) get to run.
    pub async fn run_async<P: ProgressSink + ?Sized>(
        mut self,
        progress: &mut P,
        cancel: &CancelToken,
    ) -> Outcome {
        debug!(
            total = self.total,
            batch_size = self.batch_size,
            "starting comparison"
        );
        loop {
            match self.advance(progress, cancel) {
                Flow::Continue => tokio::task::yield_now().await,
                Flow::Done => return self.complete(),
                Flow::Cancelled => return self.cancelled(),
            }
        }
    }

    fn cancelled(self) -> Outcome {
        debug!(processed = self.processed, total = self.total, "comparison cancelled");
        Outcome::Cancelled
    }
}

/// `|dR| + |dG| + |dB|`, alpha ignored. Range 0-765.
fn channel_delta(a: &[u8], b: &[u8]) -> u32 {
    u32::from(a[0].abs_diff(b[0])) + u32::from(a[1].abs_diff(b[1])) + u32::from(a[2].abs_diff(b[2]))
}
