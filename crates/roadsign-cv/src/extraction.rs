//! Per-label bounding boxes from a converged labeling.

use log::debug;
use roadsign_core::{LabelGrid, Rectangle, UNLABELED};
use std::collections::{HashMap, HashSet};

/// Pixel count and tight bounds of one label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelStats {
    pub label: u32,
    pub pixel_count: usize,
    pub bounds: Rectangle,
}

/// Statistics for every nonzero label, ordered by first appearance in scan order.
pub fn label_stats(labels: &LabelGrid) -> Vec<LabelStats> {
    let mut index: HashMap<u32, usize> = HashMap::new();
    let mut stats: Vec<LabelStats> = Vec::new();

    for (x, y, &label) in labels.grid().iter_cells() {
        if label == UNLABELED {
            continue;
        }
        let (x, y) = (x as u32, y as u32);
        match index.get(&label) {
            Some(&i) => {
                stats[i].pixel_count += 1;
                stats[i].bounds.include_point(x, y);
            }
            None => {
                index.insert(label, stats.len());
                stats.push(LabelStats {
                    label,
                    pixel_count: 1,
                    bounds: Rectangle::from_point(x, y),
                });
            }
        }
    }

    stats
}

/// Discard undersized labels and return the bounding box of every survivor.
///
/// Labels with fewer than `min_object_size` pixels are reset to unlabeled
/// in `labels`, so later stages never see them.
pub fn extract(labels: &mut LabelGrid, min_object_size: usize) -> Vec<Rectangle> {
    let stats = label_stats(labels);
    let (kept, dead): (Vec<_>, Vec<_>) = stats
        .into_iter()
        .partition(|s| s.pixel_count >= min_object_size);

    let dead: HashSet<u32> = dead.iter().map(|s| s.label).collect();
    labels.clear_labels(&dead);

    debug!(
        "extracted {} boxes, discarded {} labels below {} px",
        kept.len(),
        dead.len(),
        min_object_size
    );

    kept.into_iter().map(|s| s.bounds).collect()
}
