use serde::{Deserialize, Serialize};

use crate::CompareError;
use crate::color::Rgb;
use crate::compare::BATCH_SIZE;
use crate::region::{Region, SizingPolicy};

/// Everything one comparison run needs besides the two images.
///
/// Immutable for the duration of a run: pass it by reference to each invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonSettings {
    /// Maximum summed RGB delta, in percent of 765, still counted as a match.
    pub threshold: u8,
    pub diff_color: Rgb,
    pub match_color: Rgb,
    pub sizing: SizingPolicy,
    /// Pixels processed between cancellation checks and progress events.
    pub batch_size: usize,
    pub region: Region,
}

impl Default for ComparisonSettings {
    fn default() -> Self {
        Self {
            threshold: 15,
            diff_color: Rgb::new(0xff, 0xff, 0xff),
            match_color: Rgb::new(0x1f, 0x1f, 0x3d),
            sizing: SizingPolicy::NoScale,
            batch_size: BATCH_SIZE,
            region: Region::FULL,
        }
    }
}

impl ComparisonSettings {
    /// Validate constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), CompareError> {
        validate_threshold(i64::from(self.threshold))?;
        if self.batch_size == 0 {
            return Err(CompareError::InvalidBatchSize);
        }
        Ok(())
    }

    /// Largest summed channel delta that still counts as a match.
    pub fn max_allowed_diff(&self) -> f64 {
        765.0 * (f64::from(self.threshold) / 100.0)
    }
}

pub fn validate_threshold(v: i64) -> Result<u8, CompareError> {
    match u8::try_from(v) {
        Ok(t) if t <= 100 => Ok(t),
        _ => Err(CompareError::InvalidThreshold(v)),
    }
}
