//! High-level detection module

pub mod config;
pub mod detector;

pub use config::{ConvergenceConfig, DetectionConfig};
pub use detector::{DetectionResult, DetectionStats, SignDetector};
