//! Color segmentation of frames and sign-region masking.

use crate::error::{ComputeResult, ConfigError};
use crate::traits::ComputeBackend;
use crate::utils::ImageUtils;
use image::{GrayImage, RgbaImage};
use roadsign_core::PixelMask;
use serde::{Deserialize, Serialize};

/// Inclusive per-channel range over an HSV image (H, S, V, fourth channel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HsvBand {
    pub lower: [u8; 4],
    pub upper: [u8; 4],
}

impl HsvBand {
    pub const fn new(lower: [u8; 4], upper: [u8; 4]) -> Self {
        Self { lower, upper }
    }

    #[inline]
    pub fn contains(&self, pixel: [u8; 4]) -> bool {
        (0..4).all(|c| pixel[c] >= self.lower[c] && pixel[c] <= self.upper[c])
    }

    pub fn validate(&self, band: &'static str) -> Result<(), ConfigError> {
        match (0..4).find(|&c| self.lower[c] > self.upper[c]) {
            Some(channel) => Err(ConfigError::InvertedBand { band, channel }),
            None => Ok(()),
        }
    }
}

/// The three color bands the pipeline thresholds against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaskBands {
    /// Selects candidate sign pixels in the whole frame
    pub frame: HsvBand,
    /// Red rim of a sign, used for region and template masks
    pub red: HsvBand,
    /// Dark pictogram in the middle of a sign
    pub dark: HsvBand,
}

impl Default for MaskBands {
    fn default() -> Self {
        Self {
            frame: HsvBand::new([165, 90, 70, 0], [195, 255, 255, 0]),
            red: HsvBand::new([150, 70, 40, 0], [210, 255, 255, 0]),
            dark: HsvBand::new([0, 0, 0, 0], [255, 255, 100, 0]),
        }
    }
}

impl MaskBands {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.frame.validate("frame")?;
        self.red.validate("red")?;
        self.dark.validate("dark")
    }
}

/// HSV frame plus the foreground mask derived from it
#[derive(Debug, Clone)]
pub struct Segmentation {
    pub hsv: RgbaImage,
    pub mask: PixelMask,
}

/// Convert the frame to HSV and keep pixels inside the frame band as foreground.
pub fn segment<B: ComputeBackend + ?Sized>(
    backend: &B,
    frame: &RgbaImage,
    bands: &MaskBands,
) -> ComputeResult<Segmentation> {
    let hsv = backend.to_hsv(frame)?;
    let band = backend.binary_band_mask(&hsv, &bands.frame)?;
    let mask = ImageUtils::gray_to_mask(&band);

    Ok(Segmentation { hsv, mask })
}

/// Binary mask of a sign: red rim OR dark center.
///
/// The dark band is only evaluated inside a centered window covering
/// `center_fraction` of each dimension.
pub fn clear_region<B: ComputeBackend + ?Sized>(
    backend: &B,
    hsv: &RgbaImage,
    bands: &MaskBands,
    center_fraction: f64,
) -> ComputeResult<GrayImage> {
    let (width, height) = hsv.dimensions();
    let center_width = (width as f64 * center_fraction).round() as u32;
    let center_height = (height as f64 * center_fraction).round() as u32;

    let red = backend.binary_band_mask(hsv, &bands.red)?;
    let dark = backend.band_mask_centered(hsv, &bands.dark, center_width, center_height)?;
    backend.logical_or_merge(&red, &dark)
}
