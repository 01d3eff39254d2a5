use thiserror::Error;

pub mod color;
pub mod compare;
pub mod input;
pub mod metadata;
pub mod region;
pub mod settings;

pub use self::color::Rgb;
pub use self::compare::{
    BATCH_SIZE, CancelToken, Comparison, ComparisonResult, Outcome, Progress, ProgressSink,
};
pub use self::input::FileInfo;
pub use self::metadata::MetadataComparison;
pub use self::region::{Region, SizingPolicy};
pub use self::settings::ComparisonSettings;

#[derive(Debug, Error)]
pub enum CompareError {
    #[error("comparison region has zero area ({width}x{height}), adjust the region settings")]
    InvalidRegion { width: i64, height: i64 },

    #[error("dimension mismatch: {left_w}x{left_h} vs {right_w}x{right_h}")]
    DimensionMismatch {
        left_w: u32,
        left_h: u32,
        right_w: u32,
        right_h: u32,
    },

    #[error("pixel buffer is {actual} bytes, expected {expected} for {width}x{height} RGBA")]
    BufferLength {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("invalid input image: {0}")]
    Input(String),

    #[error("invalid color {0:?}, expected a hex triple like #1f1f3d")]
    InvalidColor(String),

    #[error("threshold must be between 0 and 100, got {0}")]
    InvalidThreshold(i64),

    #[error("batch size must be greater than zero")]
    InvalidBatchSize,
}

impl CompareError {
    /// True for the errors caused by the images themselves rather than the settings.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::DimensionMismatch { .. } | Self::BufferLength { .. } | Self::Input(_)
        )
    }
}

/// Normalize both images onto the shared canvas, crop them to the region and
/// run the pixel comparison with the blocking driver.
pub fn compare_images<P: ProgressSink + ?Sized>(
    left: &image::RgbaImage,
    right: &image::RgbaImage,
    settings: &ComparisonSettings,
    progress: &mut P,
    cancel: &CancelToken,
) -> Result<Outcome, CompareError> {
    input::ensure_not_empty(left)?;
    input::ensure_not_empty(right)?;
    let (left, right) = region::extract(left, right, settings)?;
    let comparison = Comparison::new(left, right, settings)?;
    Ok(comparison.run(progress, cancel))
}
