use std::path::Path;

use image::{ImageReader, RgbaImage};
use serde::Serialize;

use crate::CompareError;

/// What is known about an input file besides its pixels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileInfo {
    pub name: String,
    /// MIME type of the detected format, e.g. `image/png`.
    pub format: Option<String>,
    pub size_bytes: u64,
    pub width: u32,
    pub height: u32,
}

/// Wrap raw RGBA bytes (row-major, 4 bytes per pixel) as an image.
pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<RgbaImage, CompareError> {
    let expected = width as usize * height as usize * 4;
    if data.len() != expected {
        return Err(CompareError::BufferLength {
            width,
            height,
            expected,
            actual: data.len(),
        });
    }
    let img = RgbaImage::from_raw(width, height, data).ok_or_else(|| {
        CompareError::Input(format!("cannot build a {width}x{height} image from the buffer"))
    })?;
    ensure_not_empty(&img)?;
    Ok(img)
}

/// Decode an image file of any format the `image` crate knows into RGBA.
pub fn load(path: &Path) -> Result<RgbaImage, CompareError> {
    load_with_info(path).map(|(img, _)| img)
}

/// Like [`load`], also returning the file's name, format, size and dimensions.
pub fn load_with_info(path: &Path) -> Result<(RgbaImage, FileInfo), CompareError> {
    let size_bytes = std::fs::metadata(path)
        .map_err(|e| CompareError::Input(format!("failed to open {}: {e}", path.display())))?
        .len();
    let reader = ImageReader::open(path)
        .map_err(|e| CompareError::Input(format!("failed to open {}: {e}", path.display())))?
        .with_guessed_format()
        .map_err(|e| CompareError::Input(format!("failed to read {}: {e}", path.display())))?;
    let format = reader.format().map(|f| f.to_mime_type().to_string());
    let img = reader
        .decode()
        .map_err(|e| CompareError::Input(format!("failed to decode {}: {e}", path.display())))?
        .to_rgba8();
    ensure_not_empty(&img)?;

    let info = FileInfo {
        name: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string()),
        format,
        size_bytes,
        width: img.width(),
        height: img.height(),
    };
    Ok((img, info))
}

pub fn ensure_not_empty(img: &RgbaImage) -> Result<(), CompareError> {
    if img.width() == 0 || img.height() == 0 {
        return Err(CompareError::Input(format!(
            "image has no pixels ({}x{})",
            img.width(),
            img.height()
        )));
    }
    Ok(())
}
