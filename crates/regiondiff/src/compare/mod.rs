pub mod engine;
pub mod progress;

use image::RgbaImage;
use serde::Serialize;

pub use self::engine::{BATCH_SIZE, Comparison};
pub use self::progress::{CancelToken, Progress, ProgressSink};

/// Aggregate statistics of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    pub total_pixels: u64,
    pub matching_pixels: u64,
    pub different_pixels: u64,
    /// `matching_pixels / total_pixels * 100`.
    pub similarity: f64,
}

impl ComparisonResult {
    pub fn from_counts(total_pixels: u64, matching_pixels: u64) -> Self {
        let similarity = if total_pixels > 0 {
            matching_pixels as f64 / total_pixels as f64 * 100.0
        } else {
            0.0
        };
        Self {
            total_pixels,
            matching_pixels,
            different_pixels: total_pixels - matching_pixels,
            similarity,
        }
    }

    pub fn is_identical(&self) -> bool {
        self.different_pixels == 0
    }
}

/// Terminal state of a comparison run.
#[derive(Debug)]
pub enum Outcome {
    Completed {
        result: ComparisonResult,
        /// Match/diff colour per pixel, same dimensions as the region, alpha 255.
        diff_map: RgbaImage,
    },
    /// Stopped through the cancel token. Nothing of the partial run survives.
    Cancelled,
}

impl Outcome {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
