//! Detection configuration

use crate::error::ConfigError;
use crate::merge::{IntersectionTest, MergeConfig, MergeMode};
use crate::propagation::ConvergencePolicy;
use crate::segmentation::MaskBands;
use crate::Result;
use anyhow::Context;
use roadsign_core::Connectivity;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main detection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    pub template_dirs: Vec<PathBuf>,
    /// Components with fewer pixels are dropped before merging
    pub min_object_size: usize,
    /// Regions must have strictly larger area to be reported
    pub min_sign_area: u64,
    /// Regions must have a strictly lower fill ratio to be reported
    pub red_pixel_ratio: f64,
    pub connectivity: Connectivity,
    pub convergence: ConvergenceConfig,
    pub merge: MergeConfig,
    pub bands: MaskBands,
    /// Share of each region dimension searched for the dark pictogram
    pub dark_center_fraction: f64,
}

/// Optional bounds on label propagation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvergenceConfig {
    pub max_passes: Option<usize>,
    pub timeout_ms: Option<u64>,
}

impl ConvergenceConfig {
    pub fn policy(&self) -> ConvergencePolicy {
        ConvergencePolicy {
            max_passes: self.max_passes,
            timeout: self.timeout_ms.map(Duration::from_millis),
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            template_dirs: vec!["templates".into()],
            min_object_size: 100,
            min_sign_area: 1000,
            red_pixel_ratio: 0.5,
            connectivity: Connectivity::Eight,
            convergence: ConvergenceConfig::default(),
            merge: MergeConfig::default(),
            bands: MaskBands::default(),
            dark_center_fraction: 0.5,
        }
    }
}

impl DetectionConfig {
    /// Bounded propagation for untrusted or very large frames
    pub fn hardened() -> Self {
        Self {
            convergence: ConvergenceConfig {
                max_passes: Some(10_000),
                timeout_ms: Some(30_000),
            },
            ..Default::default()
        }
    }

    /// Merge overlapping boxes until none intersect, with the true overlap test
    pub fn strict_merge() -> Self {
        Self {
            merge: MergeConfig {
                mode: MergeMode::Converge,
                intersection: IntersectionTest::Overlap,
            },
            ..Default::default()
        }
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if !self.red_pixel_ratio.is_finite() || self.red_pixel_ratio < 0.0 {
            return Err(ConfigError::InvalidRatio(self.red_pixel_ratio));
        }
        let fraction = self.dark_center_fraction;
        if !(fraction > 0.0 && fraction <= 1.0) {
            return Err(ConfigError::InvalidCenterFraction(fraction));
        }
        self.bands.validate()
    }

    /// Read a JSON configuration; missing fields take their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {:?}", path))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config: {:?}", path))?;
        config
            .validate()
            .with_context(|| format!("Invalid config: {:?}", path))?;
        Ok(config)
    }

    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config: {:?}", path))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_valid() {
        assert!(DetectionConfig::default().validate().is_ok());
        assert!(DetectionConfig::hardened().validate().is_ok());
        assert!(DetectionConfig::strict_merge().validate().is_ok());
    }

    #[test]
    fn test_negative_ratio_rejected() {
        let config = DetectionConfig {
            red_pixel_ratio: -0.1,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidRatio(-0.1)));

        let config = DetectionConfig {
            red_pixel_ratio: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidRatio(_))));
    }

    #[test]
    fn test_center_fraction_range() {
        for bad in [0.0, 1.5] {
            let config = DetectionConfig {
                dark_center_fraction: bad,
                ..Default::default()
            };
            assert_eq!(
                config.validate(),
                Err(ConfigError::InvalidCenterFraction(bad))
            );
        }
    }

    #[test]
    fn test_partial_json_uses_defaults() -> Result<()> {
        let config: DetectionConfig = serde_json::from_str(
            r#"{
                "min_object_size": 12,
                "connectivity": "four",
                "merge": { "mode": "converge" },
                "convergence": { "max_passes": 50 }
            }"#,
        )?;

        assert_eq!(config.min_object_size, 12);
        assert_eq!(config.connectivity, Connectivity::Four);
        assert_eq!(config.merge.mode, MergeMode::Converge);
        assert_eq!(config.merge.intersection, IntersectionTest::Corner);
        assert_eq!(config.convergence.policy().max_passes, Some(50));
        assert_eq!(config.convergence.policy().timeout, None);
        assert_eq!(config.min_sign_area, 1000);
        assert_eq!(config.bands, MaskBands::default());
        Ok(())
    }

    #[test]
    fn test_file_round_trip() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("config.json");

        let config = DetectionConfig::hardened();
        config.to_file(&path)?;
        assert_eq!(DetectionConfig::from_file(&path)?, config);
        Ok(())
    }

    #[test]
    fn test_invalid_file_rejected() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{ "red_pixel_ratio": -1.0 }"#)?;

        let err = DetectionConfig::from_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("red_pixel_ratio"));
        Ok(())
    }
}
