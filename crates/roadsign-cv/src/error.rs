//! Error types of the compute layer and configuration.

use roadsign_core::Rectangle;
use thiserror::Error;

pub type ComputeResult<T> = std::result::Result<T, ComputeError>;

/// Failure of a compute primitive. Fatal for the frame being processed.
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("{op}: dimension mismatch {left:?} vs {right:?}")]
    DimensionMismatch {
        op: &'static str,
        left: (u32, u32),
        right: (u32, u32),
    },
    #[error("{op}: buffer length mismatch {left} vs {right}")]
    LengthMismatch {
        op: &'static str,
        left: usize,
        right: usize,
    },
    #[error("{op}: empty buffer")]
    EmptyBuffer { op: &'static str },
    #[error("region {region} exceeds the {width}x{height} image")]
    InvalidRegion {
        region: Rectangle,
        width: u32,
        height: u32,
    },
    #[error("label propagation stopped without converging after {passes} passes (pass limit or timeout)")]
    NotConverged { passes: usize },
    #[cfg(feature = "opencv")]
    #[error("OpenCV error: {0}")]
    OpenCv(#[from] opencv::Error),
    #[cfg(feature = "opencv")]
    #[error("image conversion failed: {0}")]
    Conversion(String),
}

/// Rejected detection configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("red_pixel_ratio must be finite and non-negative, got {0}")]
    InvalidRatio(f64),
    #[error("dark_center_fraction must be in (0, 1], got {0}")]
    InvalidCenterFraction(f64),
    #[error("band `{band}` has lower bound above upper bound in channel {channel}")]
    InvertedBand { band: &'static str, channel: usize },
}
