use std::path::Path;

use anyhow::{Context, Result};
use image::RgbaImage;

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    Ok(())
}

/// Encode the diff map as PNG, creating parent directories as needed.
pub fn write_diff_map(path: &Path, diff_map: &RgbaImage) -> Result<()> {
    ensure_parent(path)?;
    diff_map
        .save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
