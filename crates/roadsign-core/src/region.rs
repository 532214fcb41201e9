use crate::rect::Rectangle;
use serde::{Deserialize, Serialize};

/// Candidate object area of a frame, optionally classified against a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub rect: Rectangle,
    pub foreground_pixel_count: usize,
    /// Index of the best-matching template, once classified
    pub kind: Option<usize>,
}

impl Region {
    pub fn new(rect: Rectangle, foreground_pixel_count: usize) -> Self {
        Self {
            rect,
            foreground_pixel_count,
            kind: None,
        }
    }

    pub fn with_kind(mut self, kind: usize) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn area(&self) -> u64 {
        self.rect.area()
    }

    /// Foreground pixels per unit of area; `None` for zero-area regions
    pub fn fill_ratio(&self) -> Option<f64> {
        match self.area() {
            0 => None,
            area => Some(self.foreground_pixel_count as f64 / area as f64),
        }
    }
}
