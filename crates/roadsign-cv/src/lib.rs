//! Roadsign Computer Vision Library
//!
//! Region extraction and template classification of road signs: frame
//! segmentation, iterative label propagation, bounding-box extraction,
//! rectangle consolidation and nearest-template scoring, all running on an
//! injected compute backend.

pub mod backend;
pub mod detection;
pub mod error;
pub mod extraction;
pub mod merge;
pub mod propagation;
pub mod regions;
pub mod segmentation;
pub mod template;
pub mod utils;

// Re-export commonly used types
pub use backend::CpuBackend;
#[cfg(feature = "opencv")]
pub use backend::OpenCvBackend;
pub use detection::{
    ConvergenceConfig, DetectionConfig, DetectionResult, DetectionStats, SignDetector,
};
pub use error::{ComputeError, ComputeResult, ConfigError};
pub use merge::{IntersectionTest, MergeConfig, MergeMode};
pub use propagation::{ConvergencePolicy, LabelPropagator, Propagation};
pub use regions::RegionCollection;
pub use segmentation::{HsvBand, MaskBands};
pub use template::{Classification, RegionClassifier, Template, TemplateLoader, TemplateSet};
pub use traits::ComputeBackend;

pub use roadsign_core::{Connectivity, LabelGrid, PixelMask, Rectangle, Region};

// Error handling
pub type Result<T> = anyhow::Result<T>;

/// Core traits for the CV system
pub mod traits {
    use crate::error::ComputeResult;
    use crate::segmentation::HsvBand;
    use image::{GrayImage, RgbaImage};
    use roadsign_core::{Connectivity, LabelGrid};

    /// Data-parallel pixel primitives the pipeline is built on.
    ///
    /// Every call is a full barrier: it returns only once the whole output
    /// is available on the host. A backend is constructed once and passed by
    /// reference to every pipeline stage.
    pub trait ComputeBackend {
        /// Short identifier used in logs
        fn name(&self) -> &'static str;

        /// Per-pixel RGBA to HSV conversion, same dimensions
        fn to_hsv(&self, frame: &RgbaImage) -> ComputeResult<RgbaImage>;

        /// 255 where every channel lies inside `band`, 0 elsewhere
        fn binary_band_mask(&self, hsv: &RgbaImage, band: &HsvBand) -> ComputeResult<GrayImage>;

        /// Like [`binary_band_mask`](Self::binary_band_mask), restricted to a
        /// centered `width` x `height` window; 0 outside it
        fn band_mask_centered(
            &self,
            hsv: &RgbaImage,
            band: &HsvBand,
            width: u32,
            height: u32,
        ) -> ComputeResult<GrayImage>;

        fn logical_or_merge(&self, a: &GrayImage, b: &GrayImage) -> ComputeResult<GrayImage>;

        /// One relaxation pass: every labeled pixel takes the minimum nonzero
        /// label of its neighborhood
        fn propagate_pass(
            &self,
            labels: &LabelGrid,
            connectivity: Connectivity,
        ) -> ComputeResult<LabelGrid>;

        /// Area-averaging resize
        fn resize_area(&self, mask: &GrayImage, width: u32, height: u32)
        -> ComputeResult<GrayImage>;

        /// Sum of squared element differences divided by the element count
        fn mean_squared_difference(&self, a: &[f64], b: &[f64]) -> ComputeResult<f64>;
    }

    impl<T: ComputeBackend + ?Sized> ComputeBackend for &T {
        fn name(&self) -> &'static str {
            (**self).name()
        }

        fn to_hsv(&self, frame: &RgbaImage) -> ComputeResult<RgbaImage> {
            (**self).to_hsv(frame)
        }

        fn binary_band_mask(&self, hsv: &RgbaImage, band: &HsvBand) -> ComputeResult<GrayImage> {
            (**self).binary_band_mask(hsv, band)
        }

        fn band_mask_centered(
            &self,
            hsv: &RgbaImage,
            band: &HsvBand,
            width: u32,
            height: u32,
        ) -> ComputeResult<GrayImage> {
            (**self).band_mask_centered(hsv, band, width, height)
        }

        fn logical_or_merge(&self, a: &GrayImage, b: &GrayImage) -> ComputeResult<GrayImage> {
            (**self).logical_or_merge(a, b)
        }

        fn propagate_pass(
            &self,
            labels: &LabelGrid,
            connectivity: Connectivity,
        ) -> ComputeResult<LabelGrid> {
            (**self).propagate_pass(labels, connectivity)
        }

        fn resize_area(
            &self,
            mask: &GrayImage,
            width: u32,
            height: u32,
        ) -> ComputeResult<GrayImage> {
            (**self).resize_area(mask, width, height)
        }

        fn mean_squared_difference(&self, a: &[f64], b: &[f64]) -> ComputeResult<f64> {
            (**self).mean_squared_difference(a, b)
        }
    }
}
