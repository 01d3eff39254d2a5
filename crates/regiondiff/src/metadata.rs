use serde::Serialize;

use crate::input::FileInfo;

/// Side-by-side view of the two input files.
#[derive(Debug, Clone, Serialize)]
pub struct MetadataComparison {
    pub left: FileInfo,
    pub right: FileInfo,
    pub same_name: bool,
    pub same_format: bool,
    pub same_size: bool,
    pub same_dimensions: bool,
    /// Absolute difference of the file sizes in bytes.
    pub size_delta: u64,
}

impl MetadataComparison {
    pub fn new(left: FileInfo, right: FileInfo) -> Self {
        Self {
            same_name: left.name == right.name,
            same_format: left.format == right.format,
            same_size: left.size_bytes == right.size_bytes,
            same_dimensions: (left.width, left.height) == (right.width, right.height),
            size_delta: left.size_bytes.abs_diff(right.size_bytes),
            left,
            right,
        }
    }

    pub fn all_same(&self) -> bool {
        self.same_name && self.same_format && self.same_size && self.same_dimensions
    }
}
