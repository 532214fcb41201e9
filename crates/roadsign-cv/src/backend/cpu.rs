//! Host implementation of the pixel primitives.
//!
//! Work is split into rows; with the `parallel` feature the rows run on the
//! rayon pool, otherwise sequentially. Every primitive reads its inputs and
//! writes a fresh output buffer, so results do not depend on scheduling.

use super::{centered_window, ensure_same_dimensions};
use crate::error::{ComputeError, ComputeResult};
use crate::segmentation::HsvBand;
use crate::traits::ComputeBackend;
use image::{GrayImage, RgbaImage};
use roadsign_core::{Connectivity, Grid, LabelGrid};

/// Data-parallel CPU backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuBackend;

impl CpuBackend {
    pub fn new() -> Self {
        Self
    }
}

/// Run `f(row_index, row)` over every `row_len`-sized row of `buf`
fn for_each_row<T, F>(buf: &mut [T], row_len: usize, f: F)
where
    T: Send,
    F: Fn(usize, &mut [T]) + Send + Sync,
{
    if row_len == 0 {
        return;
    }

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        buf.par_chunks_mut(row_len)
            .enumerate()
            .for_each(|(y, row)| f(y, row));
    }

    #[cfg(not(feature = "parallel"))]
    {
        buf.chunks_mut(row_len)
            .enumerate()
            .for_each(|(y, row)| f(y, row));
    }
}

/// 8-bit HSV of one pixel.
///
/// Hue is computed with the red and blue channels exchanged, i.e. mirrored
/// to `240° - h`, which puts the red family around 170 on the 0..=255 scale
/// with no wrap-around. Saturation and value use the full 0..=255 range.
pub(crate) fn hsv_pixel(r: u8, g: u8, b: u8) -> [u8; 3] {
    // swapped on purpose: hue is mirrored, see above
    let (r, g, b) = (b as f32, g as f32, r as f32);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let hue_deg = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * ((g - b) / delta).rem_euclid(6.0)
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };

    let hue = (hue_deg * 255.0 / 360.0).round().min(255.0) as u8;
    let saturation = if max == 0.0 {
        0
    } else {
        (delta / max * 255.0).round() as u8
    };
    [hue, saturation, max as u8]
}

/// Source pixels and coverage weights for each destination pixel of an area resize
fn area_weights(src: u32, dst: u32) -> Vec<Vec<(usize, f64)>> {
    let scale = src as f64 / dst as f64;
    (0..dst)
        .map(|d| {
            let start = d as f64 * scale;
            let end = (start + scale).min(src as f64);
            let mut weights = Vec::new();
            let mut s = start.floor() as usize;
            while (s as f64) < end && s < src as usize {
                let covered = end.min((s + 1) as f64) - start.max(s as f64);
                if covered > 0.0 {
                    weights.push((s, covered / scale));
                }
                s += 1;
            }
            weights
        })
        .collect()
}

impl ComputeBackend for CpuBackend {
    fn name(&self) -> &'static str {
        "cpu"
    }

    fn to_hsv(&self, frame: &RgbaImage) -> ComputeResult<RgbaImage> {
        let (width, height) = frame.dimensions();
        let src = frame.as_raw();
        let row_len = width as usize * 4;
        let mut out = RgbaImage::new(width, height);

        for_each_row(&mut *out, row_len, |y, row| {
            let src_row = &src[y * row_len..(y + 1) * row_len];
            for (dst, px) in row.chunks_exact_mut(4).zip(src_row.chunks_exact(4)) {
                let [h, s, v] = hsv_pixel(px[0], px[1], px[2]);
                dst.copy_from_slice(&[h, s, v, 0]);
            }
        });

        Ok(out)
    }

    fn binary_band_mask(&self, hsv: &RgbaImage, band: &HsvBand) -> ComputeResult<GrayImage> {
        let (width, height) = hsv.dimensions();
        self.band_mask_centered(hsv, band, width, height)
    }

    fn band_mask_centered(
        &self,
        hsv: &RgbaImage,
        band: &HsvBand,
        width: u32,
        height: u32,
    ) -> ComputeResult<GrayImage> {
        let (image_width, image_height) = hsv.dimensions();
        let (x0, y0, win_width, win_height) =
            centered_window((image_width, image_height), width, height);
        let (x_range, y_range) = (
            x0 as usize..(x0 + win_width) as usize,
            y0 as usize..(y0 + win_height) as usize,
        );
        let src = hsv.as_raw();
        let src_row_len = image_width as usize * 4;
        let mut out = GrayImage::new(image_width, image_height);

        for_each_row(&mut *out, image_width as usize, |y, row| {
            if !y_range.contains(&y) {
                return;
            }
            let src_row = &src[y * src_row_len..(y + 1) * src_row_len];
            for x in x_range.clone() {
                let px = &src_row[x * 4..x * 4 + 4];
                if band.contains([px[0], px[1], px[2], px[3]]) {
                    row[x] = 255;
                }
            }
        });

        Ok(out)
    }

    fn logical_or_merge(&self, a: &GrayImage, b: &GrayImage) -> ComputeResult<GrayImage> {
        ensure_same_dimensions("logical_or_merge", a.dimensions(), b.dimensions())?;
        let (width, height) = a.dimensions();
        let (a_raw, b_raw) = (a.as_raw(), b.as_raw());
        let row_len = width as usize;
        let mut out = GrayImage::new(width, height);

        for_each_row(&mut *out, row_len, |y, row| {
            let span = y * row_len..(y + 1) * row_len;
            for ((dst, &pa), &pb) in row.iter_mut().zip(&a_raw[span.clone()]).zip(&b_raw[span]) {
                *dst = if pa != 0 || pb != 0 { 255 } else { 0 };
            }
        });

        Ok(out)
    }

    fn propagate_pass(
        &self,
        labels: &LabelGrid,
        connectivity: Connectivity,
    ) -> ComputeResult<LabelGrid> {
        let (width, height) = (labels.width(), labels.height());
        let mut next = vec![0u32; width * height];

        for_each_row(&mut next[..], width, |y, row| {
            for (x, cell) in row.iter_mut().enumerate() {
                *cell = labels.min_neighbor_label(x, y, connectivity);
            }
        });

        Grid::from_vec(width, height, next)
            .map(LabelGrid::from_grid)
            .map_err(|_| ComputeError::LengthMismatch {
                op: "propagate_pass",
                left: width * height,
                right: labels.as_slice().len(),
            })
    }

    fn resize_area(&self, mask: &GrayImage, width: u32, height: u32) -> ComputeResult<GrayImage> {
        let (src_width, src_height) = mask.dimensions();
        if src_width == 0 || src_height == 0 || width == 0 || height == 0 {
            return Err(ComputeError::EmptyBuffer { op: "resize_area" });
        }

        let x_weights = area_weights(src_width, width);
        let y_weights = area_weights(src_height, height);
        let src = mask.as_raw();
        let src_row_len = src_width as usize;
        let mut out = GrayImage::new(width, height);

        for_each_row(&mut *out, width as usize, |y, row| {
            for (x, dst) in row.iter_mut().enumerate() {
                let mut acc = 0.0;
                for &(sy, wy) in &y_weights[y] {
                    let src_row = &src[sy * src_row_len..(sy + 1) * src_row_len];
                    for &(sx, wx) in &x_weights[x] {
                        acc += src_row[sx] as f64 * wx * wy;
                    }
                }
                *dst = acc.round().clamp(0.0, 255.0) as u8;
            }
        });

        Ok(out)
    }

    fn mean_squared_difference(&self, a: &[f64], b: &[f64]) -> ComputeResult<f64> {
        if a.len() != b.len() {
            return Err(ComputeError::LengthMismatch {
                op: "mean_squared_difference",
                left: a.len(),
                right: b.len(),
            });
        }
        if a.is_empty() {
            return Err(ComputeError::EmptyBuffer {
                op: "mean_squared_difference",
            });
        }

        #[cfg(feature = "parallel")]
        let sum: f64 = {
            use rayon::prelude::*;
            a.par_iter().zip(b.par_iter()).map(|(x, y)| (x - y) * (x - y)).sum()
        };

        #[cfg(not(feature = "parallel"))]
        let sum: f64 = a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum();

        Ok(sum / a.len() as f64)
    }
}
