//! Per-pixel component labels.

use crate::connectivity::Connectivity;
use crate::grid::Grid;
use crate::mask::PixelMask;
use crate::rect::Rectangle;
use anyhow::Result;
use std::collections::HashSet;

/// Label value of background and discarded pixels
pub const UNLABELED: u32 = 0;

/// Integer label per pixel; `0` is background, positive values are components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelGrid {
    cells: Grid<u32>,
}

impl LabelGrid {
    /// Give every foreground pixel a unique label, counting up from 1 in scan order.
    pub fn seeded(mask: &PixelMask) -> Self {
        let mut next = 0u32;
        let cells = Grid::from_fn(mask.width(), mask.height(), |x, y| {
            if mask.is_foreground(x, y) {
                next += 1;
                next
            } else {
                UNLABELED
            }
        });
        Self { cells }
    }

    pub fn from_grid(cells: Grid<u32>) -> Self {
        Self { cells }
    }

    pub fn from_vec(width: usize, height: usize, labels: Vec<u32>) -> Result<Self> {
        Ok(Self {
            cells: Grid::from_vec(width, height, labels)?,
        })
    }

    pub fn width(&self) -> usize {
        self.cells.width()
    }

    pub fn height(&self) -> usize {
        self.cells.height()
    }

    /// Label at `(x, y)`; `0` outside the grid
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u32 {
        self.cells.get(x, y).copied().unwrap_or(UNLABELED)
    }

    pub fn grid(&self) -> &Grid<u32> {
        &self.cells
    }

    pub fn as_slice(&self) -> &[u32] {
        self.cells.as_slice()
    }

    /// Smallest nonzero label among `(x, y)` and its neighbors.
    ///
    /// Background stays background: returns `0` when `(x, y)` itself is unlabeled.
    #[inline]
    pub fn min_neighbor_label(&self, x: usize, y: usize, connectivity: Connectivity) -> u32 {
        let own = self.get(x, y);
        if own == UNLABELED {
            return UNLABELED;
        }

        let mut best = own;
        for &(dx, dy) in connectivity.offsets() {
            let (Some(nx), Some(ny)) = (x.checked_add_signed(dx), y.checked_add_signed(dy)) else {
                continue;
            };
            let label = self.get(nx, ny);
            if label != UNLABELED && label < best {
                best = label;
            }
        }
        best
    }

    /// Distinct nonzero labels in order of first appearance
    pub fn distinct_labels(&self) -> Vec<u32> {
        let mut seen = HashSet::new();
        self.cells
            .as_slice()
            .iter()
            .copied()
            .filter(|&label| label != UNLABELED && seen.insert(label))
            .collect()
    }

    pub fn labeled_count(&self) -> usize {
        self.cells
            .as_slice()
            .iter()
            .filter(|&&label| label != UNLABELED)
            .count()
    }

    /// Reset every pixel carrying one of `dead` to unlabeled
    pub fn clear_labels(&mut self, dead: &HashSet<u32>) {
        if dead.is_empty() {
            return;
        }
        for label in self.cells.as_mut_slice() {
            if dead.contains(label) {
                *label = UNLABELED;
            }
        }
    }

    /// Number of labeled pixels inside the closed bounds of `rect`
    pub fn labeled_within(&self, rect: &Rectangle) -> usize {
        if self.cells.is_empty() {
            return 0;
        }
        let right = (rect.right as usize).min(self.width() - 1);
        let bottom = (rect.bottom as usize).min(self.height() - 1);
        let left = rect.left as usize;
        if left > right {
            return 0;
        }

        (rect.top as usize..=bottom)
            .map(|y| {
                self.cells.row(y)[left..=right]
                    .iter()
                    .filter(|&&label| label != UNLABELED)
                    .count()
            })
            .sum()
    }
}
