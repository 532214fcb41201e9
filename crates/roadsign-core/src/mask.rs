//! Binary foreground/background masks.

use crate::grid::Grid;
use anyhow::{Result, bail, ensure};

/// Per-pixel foreground flag produced by frame segmentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelMask {
    cells: Grid<bool>,
}

impl PixelMask {
    /// All-background mask
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            cells: Grid::new_filled(width, height, false),
        }
    }

    pub fn from_grid(cells: Grid<bool>) -> Self {
        Self { cells }
    }

    pub fn from_fn(width: usize, height: usize, f: impl FnMut(usize, usize) -> bool) -> Self {
        Self {
            cells: Grid::from_fn(width, height, f),
        }
    }

    /// Parse a picture where `#` marks foreground and `.` background.
    ///
    /// Blank lines and surrounding whitespace are ignored, which keeps
    /// indented raw strings in tests readable.
    pub fn from_ascii(picture: &str) -> Result<Self> {
        let rows: Vec<&str> = picture
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let width = rows.first().map_or(0, |row| row.chars().count());
        let mut data = Vec::with_capacity(width * rows.len());

        for (row_num, row) in rows.iter().enumerate() {
            ensure!(
                row.chars().count() == width,
                "mask row {} has {} columns, expected {}",
                row_num,
                row.chars().count(),
                width
            );
            for ch in row.chars() {
                match ch {
                    '#' => data.push(true),
                    '.' => data.push(false),
                    other => bail!("unexpected mask character {:?} in row {}", other, row_num),
                }
            }
        }

        Ok(Self {
            cells: Grid::from_vec(width, rows.len(), data)?,
        })
    }

    pub fn width(&self) -> usize {
        self.cells.width()
    }

    pub fn height(&self) -> usize {
        self.cells.height()
    }

    /// Foreground test; coordinates outside the mask count as background
    #[inline]
    pub fn is_foreground(&self, x: usize, y: usize) -> bool {
        self.cells.get(x, y).copied().unwrap_or(false)
    }

    pub fn foreground_count(&self) -> usize {
        self.cells.as_slice().iter().filter(|&&fg| fg).count()
    }

    /// Foreground coordinates `(x, y)` in row-major scan order
    pub fn foreground_coords(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.cells
            .iter_cells()
            .filter(|(_, _, fg)| **fg)
            .map(|(x, y, _)| (x, y))
    }

    pub fn grid(&self) -> &Grid<bool> {
        &self.cells
    }
}
