//! Image loading and buffer helpers on top of the `image` crate

use crate::error::{ComputeError, ComputeResult};
use crate::Result;
use anyhow::Context;
use image::{GrayImage, RgbaImage};
use roadsign_core::{PixelMask, Rectangle};
use std::path::Path;

/// Image utility functions
pub struct ImageUtils;

impl ImageUtils {
    /// Decode any supported image file into RGBA
    pub fn load_rgba<P: AsRef<Path>>(path: P) -> Result<RgbaImage> {
        let img = image::open(&path)
            .with_context(|| format!("Failed to open image: {:?}", path.as_ref()))?;
        Ok(img.to_rgba8())
    }

    /// Copy the `(right - left) x (bottom - top)` block at `(left, top)`.
    ///
    /// The right and bottom bounds themselves are not part of the block.
    pub fn crop(image: &RgbaImage, rect: &Rectangle) -> ComputeResult<RgbaImage> {
        let (width, height) = image.dimensions();
        if rect.right > width || rect.bottom > height {
            return Err(ComputeError::InvalidRegion {
                region: *rect,
                width,
                height,
            });
        }
        Ok(image::imageops::crop_imm(image, rect.left, rect.top, rect.width(), rect.height())
            .to_image())
    }

    /// Mask pixels as `f64`, row-major, for scoring
    pub fn mask_to_f64(mask: &GrayImage) -> Vec<f64> {
        mask.as_raw().iter().map(|&v| v as f64).collect()
    }

    /// Binary mask image: nonzero is foreground
    pub fn gray_to_mask(mask: &GrayImage) -> PixelMask {
        PixelMask::from_fn(mask.width() as usize, mask.height() as usize, |x, y| {
            mask.get_pixel(x as u32, y as u32)[0] != 0
        })
    }
}
