use image::{imageops::FilterType, RgbaImage};
use std::path::Path;

use crate::error::ThumbnailError;

/// Width of generated thumbnails; height follows the aspect ratio
pub const DEFAULT_THUMBNAIL_WIDTH: u32 = 100;

/// Decode a tile image and downsample it to `target_width` pixels wide
pub fn decode_thumbnail(path: &Path, target_width: u32) -> Result<RgbaImage, ThumbnailError> {
    let img = image::open(path).map_err(|source| ThumbnailError {
        path: path.to_path_buf(),
        source,
    })?;

    let target_width = target_width.max(1);
    let target_height = scaled_height(img.width(), img.height(), target_width);

    let thumbnail = img.resize_exact(target_width, target_height, FilterType::Triangle);
    Ok(thumbnail.to_rgba8())
}

/// Height keeping the aspect ratio at the given width, never below 1
fn scaled_height(width: u32, height: u32, target_width: u32) -> u32 {
    if width == 0 {
        return 1;
    }
    let scaled = (height as f64 * target_width as f64 / width as f64).round();
    (scaled as u32).max(1)
}
