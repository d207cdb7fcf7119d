/// Coarse RGB histogram of the selected tile
///
/// Sampled on a sparse grid (about 20 x 20 pixels) so it stays cheap enough
/// to recompute on every selection change.

use image::RgbImage;
use std::path::Path;

use crate::error::HistogramError;

/// Number of bins per channel
pub const BINS: usize = 20;

/// Samples taken along each image axis
const SAMPLES_PER_AXIS: u32 = 20;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Histogram {
    pub reds: [u32; BINS],
    pub greens: [u32; BINS],
    pub blues: [u32; BINS],
}

impl Histogram {
    pub fn from_image(image: &RgbImage) -> Self {
        let mut histogram = Self::default();
        let step_x = (image.width() / SAMPLES_PER_AXIS).max(1) as usize;
        let step_y = (image.height() / SAMPLES_PER_AXIS).max(1) as usize;

        for x in (0..image.width()).step_by(step_x) {
            for y in (0..image.height()).step_by(step_y) {
                let [r, g, b] = image.get_pixel(x, y).0;
                histogram.reds[bin(r)] += 1;
                histogram.greens[bin(g)] += 1;
                histogram.blues[bin(b)] += 1;
            }
        }
        histogram
    }

    pub fn from_path(path: &Path) -> Result<Self, HistogramError> {
        let image = image::open(path).map_err(|source| HistogramError {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_image(&image.to_rgb8()))
    }

    /// Largest stacked bar height, at least 1
    pub fn max_stack(&self) -> u32 {
        (0..BINS)
            .map(|i| self.reds[i] + self.greens[i] + self.blues[i])
            .max()
            .unwrap_or(0)
            .max(1)
    }

    pub fn is_empty(&self) -> bool {
        self.reds.iter().all(|&c| c == 0)
    }
}

fn bin(value: u8) -> usize {
    value as usize * BINS / 256
}
