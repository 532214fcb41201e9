//! OpenCV-backed color conversion, band masks and area resize.
//!
//! Label propagation, mask merging and scoring are delegated to
//! [`CpuBackend`]; OpenCV has no primitive matching their contracts.

use super::{CpuBackend, centered_window};
use crate::error::{ComputeError, ComputeResult};
use crate::segmentation::HsvBand;
use crate::traits::ComputeBackend;
use image::{GrayImage, RgbaImage};
use opencv::{
    core::{self, Mat, Scalar, Size},
    imgproc,
    prelude::*,
};
use roadsign_core::{Connectivity, LabelGrid};

/// Backend running the per-pixel color work through OpenCV.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenCvBackend {
    host: CpuBackend,
}

impl OpenCvBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Continuous 8-bit Mat with `channels` interleaved channels over `bytes`
fn mat_from_bytes(bytes: &[u8], rows: u32, channels: i32) -> ComputeResult<Mat> {
    let flat = Mat::from_slice(bytes)?;
    let shaped = flat.reshape(channels, rows as i32)?;
    Ok(shaped.try_clone()?)
}

fn band_scalar(values: [u8; 4]) -> Scalar {
    Scalar::new(
        values[0] as f64,
        values[1] as f64,
        values[2] as f64,
        values[3] as f64,
    )
}

fn gray_from_mat(mat: &Mat, width: u32, height: u32) -> ComputeResult<GrayImage> {
    let bytes = mat.data_bytes()?.to_vec();
    GrayImage::from_raw(width, height, bytes)
        .ok_or_else(|| ComputeError::Conversion(format!("expected a {width}x{height} mask")))
}

impl ComputeBackend for OpenCvBackend {
    fn name(&self) -> &'static str {
        "opencv"
    }

    fn to_hsv(&self, frame: &RgbaImage) -> ComputeResult<RgbaImage> {
        let (width, height) = frame.dimensions();
        let rgba = mat_from_bytes(frame.as_raw(), height, 4)?;

        let mut rgb = Mat::default();
        imgproc::cvt_color(&rgba, &mut rgb, imgproc::COLOR_RGBA2RGB, 0)?;

        // RGB bytes read as BGR: same mirrored hue as CpuBackend
        let mut hsv = Mat::default();
        imgproc::cvt_color(&rgb, &mut hsv, imgproc::COLOR_BGR2HSV_FULL, 0)?;

        let hsv_bytes = hsv.data_bytes()?;
        let mut out = Vec::with_capacity(hsv_bytes.len() / 3 * 4);
        for px in hsv_bytes.chunks_exact(3) {
            out.extend_from_slice(&[px[0], px[1], px[2], 0]);
        }

        RgbaImage::from_raw(width, height, out)
            .ok_or_else(|| ComputeError::Conversion(format!("expected a {width}x{height} image")))
    }

    fn binary_band_mask(&self, hsv: &RgbaImage, band: &HsvBand) -> ComputeResult<GrayImage> {
        let (width, height) = hsv.dimensions();
        let src = mat_from_bytes(hsv.as_raw(), height, 4)?;

        let mut dst = Mat::default();
        core::in_range(
            &src,
            &band_scalar(band.lower),
            &band_scalar(band.upper),
            &mut dst,
        )?;

        gray_from_mat(&dst, width, height)
    }

    fn band_mask_centered(
        &self,
        hsv: &RgbaImage,
        band: &HsvBand,
        width: u32,
        height: u32,
    ) -> ComputeResult<GrayImage> {
        let mut mask = self.binary_band_mask(hsv, band)?;
        let (x0, y0, win_width, win_height) = centered_window(hsv.dimensions(), width, height);

        for (x, y, px) in mask.enumerate_pixels_mut() {
            let inside = x >= x0 && x < x0 + win_width && y >= y0 && y < y0 + win_height;
            if !inside {
                px[0] = 0;
            }
        }
        Ok(mask)
    }

    fn logical_or_merge(&self, a: &GrayImage, b: &GrayImage) -> ComputeResult<GrayImage> {
        self.host.logical_or_merge(a, b)
    }

    fn propagate_pass(
        &self,
        labels: &LabelGrid,
        connectivity: Connectivity,
    ) -> ComputeResult<LabelGrid> {
        self.host.propagate_pass(labels, connectivity)
    }

    fn resize_area(&self, mask: &GrayImage, width: u32, height: u32) -> ComputeResult<GrayImage> {
        let (src_width, src_height) = mask.dimensions();
        if src_width == 0 || src_height == 0 || width == 0 || height == 0 {
            return Err(ComputeError::EmptyBuffer { op: "resize_area" });
        }
        let src = mat_from_bytes(mask.as_raw(), src_height, 1)?;

        let mut dst = Mat::default();
        imgproc::resize(
            &src,
            &mut dst,
            Size::new(width as i32, height as i32),
            0.0,
            0.0,
            imgproc::INTER_AREA,
        )?;

        gray_from_mat(&dst, width, height)
    }

    fn mean_squared_difference(&self, a: &[f64], b: &[f64]) -> ComputeResult<f64> {
        self.host.mean_squared_difference(a, b)
    }
}
