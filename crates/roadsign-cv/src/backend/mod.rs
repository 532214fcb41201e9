//! Compute backends implementing [`ComputeBackend`](crate::traits::ComputeBackend).

pub mod cpu;
#[cfg(feature = "opencv")]
pub mod opencv;

pub use cpu::CpuBackend;
#[cfg(feature = "opencv")]
pub use self::opencv::OpenCvBackend;

use crate::error::{ComputeError, ComputeResult};

pub(crate) fn ensure_same_dimensions(
    op: &'static str,
    left: (u32, u32),
    right: (u32, u32),
) -> ComputeResult<()> {
    if left == right {
        Ok(())
    } else {
        Err(ComputeError::DimensionMismatch { op, left, right })
    }
}

/// Offset and extent of a `width` x `height` window centered in an image
pub(crate) fn centered_window(
    (image_width, image_height): (u32, u32),
    width: u32,
    height: u32,
) -> (u32, u32, u32, u32) {
    let width = width.min(image_width);
    let height = height.min(image_height);
    ((image_width - width) / 2, (image_height - height) / 2, width, height)
}
