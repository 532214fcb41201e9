//! Nearest-template classification of sign regions.
//!
//! A region is cropped out of the HSV frame and reduced to its sign mask.
//! Every template mask is area-resized to the region's size and compared by
//! mean squared difference; the lowest score wins.

use super::TemplateSet;
use crate::error::ComputeResult;
use crate::segmentation::{MaskBands, clear_region};
use crate::traits::ComputeBackend;
use crate::utils::ImageUtils;
use image::{GrayImage, RgbaImage};
use log::debug;
use roadsign_core::{Rectangle, Region};
use serde::{Deserialize, Serialize};

/// Winning template and its score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub template: usize,
    pub score: f64,
}

/// Index and value of the smallest score; the first one wins ties
pub fn best_match(scores: &[f64]) -> Option<Classification> {
    scores
        .iter()
        .enumerate()
        .fold(None, |best: Option<Classification>, (i, &score)| match best {
            Some(b) if b.score <= score => Some(b),
            _ => Some(Classification { template: i, score }),
        })
}

/// Scores regions of one frame against a template set
pub struct RegionClassifier<'a, B: ComputeBackend + ?Sized> {
    backend: &'a B,
    bands: &'a MaskBands,
    center_fraction: f64,
}

impl<'a, B: ComputeBackend + ?Sized> RegionClassifier<'a, B> {
    pub fn new(backend: &'a B, bands: &'a MaskBands, center_fraction: f64) -> Self {
        Self {
            backend,
            bands,
            center_fraction,
        }
    }

    /// Sign mask of the `(right - left) x (bottom - top)` block at `(left, top)`
    pub fn region_mask(&self, hsv_frame: &RgbaImage, rect: &Rectangle) -> ComputeResult<GrayImage> {
        let block = ImageUtils::crop(hsv_frame, rect)?;
        clear_region(self.backend, &block, self.bands, self.center_fraction)
    }

    /// One score per template, in template order
    pub fn scores(&self, region_mask: &GrayImage, templates: &TemplateSet) -> ComputeResult<Vec<f64>> {
        let (width, height) = region_mask.dimensions();
        let region = ImageUtils::mask_to_f64(region_mask);

        templates
            .iter()
            .map(|template| {
                let resized = self.backend.resize_area(&template.mask, width, height)?;
                self.backend
                    .mean_squared_difference(&region, &ImageUtils::mask_to_f64(&resized))
            })
            .collect()
    }

    /// Best-matching template for `region`, or `None` with no templates.
    pub fn classify(
        &self,
        hsv_frame: &RgbaImage,
        region: &Region,
        templates: &TemplateSet,
    ) -> ComputeResult<Option<Classification>> {
        if templates.is_empty() {
            return Ok(None);
        }

        let mask = self.region_mask(hsv_frame, &region.rect)?;
        let scores = self.scores(&mask, templates)?;
        debug!("region {} scores {:?}", region.rect, scores);

        Ok(best_match(&scores))
    }
}
