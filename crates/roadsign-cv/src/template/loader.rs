//! Template loading utilities

use super::{Template, TemplateSet};
use crate::segmentation::MaskBands;
use crate::traits::ComputeBackend;
use crate::utils::image::ImageUtils;
use crate::Result;
use anyhow::Context;
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Collects template images from a list of directories
#[derive(Debug, Clone)]
pub struct TemplateLoader {
    template_dirs: Vec<PathBuf>,
    supported_extensions: Vec<String>,
}

impl TemplateLoader {
    /// Create new template loader
    pub fn new() -> Self {
        Self {
            template_dirs: Vec::new(),
            supported_extensions: vec![
                "png".to_string(),
                "jpg".to_string(),
                "jpeg".to_string(),
                "bmp".to_string(),
            ],
        }
    }

    /// Add template directory
    pub fn add_template_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.template_dirs.push(dir.as_ref().to_path_buf());
        self
    }

    /// Template image paths: directories in the order added, files sorted by
    /// name within each directory. Missing directories are skipped.
    pub fn template_paths(&self) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::new();

        for dir in &self.template_dirs {
            if !dir.is_dir() {
                warn!("Template directory not found, skipping: {:?}", dir);
                continue;
            }

            let entries = fs::read_dir(dir)
                .with_context(|| format!("Failed to read directory: {:?}", dir))?;

            let mut found = Vec::new();
            for entry in entries {
                let path = entry?.path();
                if path.is_file() && self.is_supported(&path) {
                    found.push(path);
                }
            }
            found.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
            paths.extend(found);
        }

        Ok(paths)
    }

    /// Load every template and precompute its mask.
    ///
    /// Names are file stems; indices follow [`template_paths`](Self::template_paths).
    pub fn load_all<B: ComputeBackend + ?Sized>(
        &self,
        backend: &B,
        bands: &MaskBands,
        center_fraction: f64,
    ) -> Result<TemplateSet> {
        let mut set = TemplateSet::new();

        for path in self.template_paths()? {
            let name = match path.file_stem() {
                Some(stem) => stem.to_string_lossy().to_string(),
                None => continue,
            };
            let image = ImageUtils::load_rgba(&path)?;
            let template = Template::build(backend, name, image, bands, center_fraction)
                .with_context(|| format!("Failed to build template mask: {:?}", path))?
                .with_metadata("path".to_string(), path.to_string_lossy().to_string());
            set.push(template);
        }

        info!(
            "Loaded {} templates from {} directories",
            set.len(),
            self.template_dirs.len()
        );
        Ok(set)
    }

    fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .is_some_and(|ext| self.supported_extensions.contains(&ext))
    }
}

impl Default for TemplateLoader {
    fn default() -> Self {
        Self::new()
    }
}
