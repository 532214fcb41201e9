//! Sign detection pipeline over an injected compute backend

use super::config::DetectionConfig;
use crate::extraction::extract;
use crate::merge::merge;
use crate::propagation::LabelPropagator;
use crate::regions::RegionCollection;
use crate::segmentation::segment;
use crate::template::{RegionClassifier, TemplateLoader, TemplateSet};
use crate::traits::ComputeBackend;
use crate::utils::ImageUtils;
use crate::Result;
use anyhow::Context;
use image::RgbaImage;
use log::{debug, info};
use roadsign_core::Region;
use serde::Serialize;
use std::path::Path;
use std::time::Instant;

/// Detections of one frame
#[derive(Debug, Clone, Serialize)]
pub struct DetectionResult {
    pub detections: Vec<Region>,
    /// Template names; a detection's `kind` indexes into this list
    pub templates: Vec<String>,
    pub stats: DetectionStats,
}

impl DetectionResult {
    /// Template name of a detection, if it was classified
    pub fn kind_name(&self, region: &Region) -> Option<&str> {
        region
            .kind
            .and_then(|kind| self.templates.get(kind))
            .map(String::as_str)
    }
}

/// Per-frame pipeline counters
#[derive(Debug, Clone, Default, Serialize)]
pub struct DetectionStats {
    pub frame_width: u32,
    pub frame_height: u32,
    pub foreground_pixels: usize,
    pub passes: usize,
    pub components: usize,
    pub raw_boxes: usize,
    pub merged_boxes: usize,
    pub discarded_regions: usize,
    pub processing_time_ms: u64,
}

/// Frame to classified regions: segment, label, extract, merge, filter, classify.
pub struct SignDetector<B: ComputeBackend> {
    backend: B,
    config: DetectionConfig,
    templates: TemplateSet,
}

impl<B: ComputeBackend> SignDetector<B> {
    /// Create a detector with no templates; the configuration is validated
    pub fn new(backend: B, config: DetectionConfig) -> Result<Self> {
        config.validate().context("Invalid detection config")?;
        Ok(Self {
            backend,
            config,
            templates: TemplateSet::new(),
        })
    }

    pub fn with_templates(mut self, templates: TemplateSet) -> Self {
        self.templates = templates;
        self
    }

    /// Load templates from the configured directories
    pub fn load_templates(mut self) -> Result<Self> {
        let loader = self
            .config
            .template_dirs
            .iter()
            .fold(TemplateLoader::new(), |loader, dir| loader.add_template_dir(dir));
        self.templates = loader.load_all(
            &self.backend,
            &self.config.bands,
            self.config.dark_center_fraction,
        )?;
        Ok(self)
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    pub fn templates(&self) -> &TemplateSet {
        &self.templates
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Detect signs in an image file
    pub fn detect_from_file<P: AsRef<Path>>(&self, image_path: P) -> Result<DetectionResult> {
        let frame = ImageUtils::load_rgba(&image_path)?;
        self.detect(&frame)
            .with_context(|| format!("Detection failed for {:?}", image_path.as_ref()))
    }

    /// Run the whole pipeline on one frame
    pub fn detect(&self, frame: &RgbaImage) -> Result<DetectionResult> {
        let start_time = Instant::now();
        let config = &self.config;

        let segmentation = segment(&self.backend, frame, &config.bands)
            .context("Segmentation failed")?;

        let propagator = LabelPropagator::new(config.connectivity, config.convergence.policy());
        let outcome = propagator
            .run(&self.backend, &segmentation.mask)
            .context("Label propagation failed")?;
        let mut labels = outcome.labels;
        let components = labels.distinct_labels().len();

        let raw_boxes = extract(&mut labels, config.min_object_size);
        let merged = merge(&raw_boxes, &config.merge);

        let mut regions = RegionCollection::from_rectangles(&merged, &labels);
        let discarded_regions = regions.retain_signs(config.min_sign_area, config.red_pixel_ratio);
        debug!("sign candidates: {:?}", regions.stats());

        let classifier = RegionClassifier::new(
            &self.backend,
            &config.bands,
            config.dark_center_fraction,
        );
        for region in regions.iter_mut() {
            let classification = classifier
                .classify(&segmentation.hsv, region, &self.templates)
                .with_context(|| format!("Classification failed for region {}", region.rect))?;
            region.kind = classification.map(|c| c.template);
        }

        let stats = DetectionStats {
            frame_width: frame.width(),
            frame_height: frame.height(),
            foreground_pixels: segmentation.mask.foreground_count(),
            passes: outcome.passes,
            components,
            raw_boxes: raw_boxes.len(),
            merged_boxes: merged.len(),
            discarded_regions,
            processing_time_ms: start_time.elapsed().as_millis() as u64,
        };

        info!(
            "{} detections in {}x{} frame ({} components, {} passes, {} ms)",
            regions.len(),
            stats.frame_width,
            stats.frame_height,
            stats.components,
            stats.passes,
            stats.processing_time_ms
        );

        Ok(DetectionResult {
            detections: regions.into_vec(),
            templates: self.templates.names(),
            stats,
        })
    }

    /// Export detection results in JSON format
    pub fn export_json(&self, results: &DetectionResult, output_path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(results)
            .context("Failed to serialize detection results")?;

        std::fs::write(output_path, json)
            .with_context(|| format!("Failed to write JSON to: {:?}", output_path))?;

        Ok(())
    }
}
