//! Reference templates and nearest-template classification

pub mod classifier;
pub mod loader;

pub use classifier::{Classification, RegionClassifier};
pub use loader::TemplateLoader;

use crate::error::ComputeResult;
use crate::segmentation::{MaskBands, clear_region};
use crate::traits::ComputeBackend;
use image::{GrayImage, RgbaImage};
use std::collections::HashMap;

/// Reference image with its precomputed HSV and sign mask
#[derive(Debug, Clone)]
pub struct Template {
    pub name: String,
    pub image: RgbaImage,
    pub hsv: RgbaImage,
    pub mask: GrayImage,
    pub metadata: HashMap<String, String>,
}

impl Template {
    /// Derive the HSV image and the sign mask from `image`.
    ///
    /// The mask is computed with the same bands and center window as region
    /// masks so the two are comparable.
    pub fn build<B: ComputeBackend + ?Sized>(
        backend: &B,
        name: impl Into<String>,
        image: RgbaImage,
        bands: &MaskBands,
        center_fraction: f64,
    ) -> ComputeResult<Self> {
        let hsv = backend.to_hsv(&image)?;
        let mask = clear_region(backend, &hsv, bands, center_fraction)?;
        Ok(Self {
            name: name.into(),
            image,
            hsv,
            mask,
            metadata: HashMap::new(),
        })
    }

    pub fn with_metadata(mut self, key: String, value: String) -> Self {
        self.metadata.insert(key, value);
        self
    }
}

/// Ordered templates. A template's position is the `kind` reported for
/// regions it wins.
#[derive(Debug, Clone, Default)]
pub struct TemplateSet {
    templates: Vec<Template>,
}

impl TemplateSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_templates(templates: Vec<Template>) -> Self {
        Self { templates }
    }

    pub fn push(&mut self, template: Template) {
        self.templates.push(template);
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn get(&self, kind: usize) -> Option<&Template> {
        self.templates.get(kind)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Template> {
        self.templates.iter()
    }

    /// Names in index order
    pub fn names(&self) -> Vec<String> {
        self.templates.iter().map(|t| t.name.clone()).collect()
    }
}

impl FromIterator<Template> for TemplateSet {
    fn from_iter<T: IntoIterator<Item = Template>>(iter: T) -> Self {
        Self::from_templates(iter.into_iter().collect())
    }
}
