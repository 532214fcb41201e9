//! Region collections and sign-candidate filtering.

use roadsign_core::{LabelGrid, Rectangle, Region};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Ordered collection of regions with batch operations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionCollection {
    regions: Vec<Region>,
}

impl RegionCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_vec(regions: Vec<Region>) -> Self {
        Self { regions }
    }

    /// Build one region per rectangle, counting the labeled pixels of
    /// `labels` inside each rectangle's closed bounds.
    pub fn from_rectangles(rects: &[Rectangle], labels: &LabelGrid) -> Self {
        rects
            .iter()
            .map(|rect| Region::new(*rect, labels.labeled_within(rect)))
            .collect()
    }

    pub fn push(&mut self, region: Region) {
        self.regions.push(region);
    }

    pub fn as_slice(&self) -> &[Region] {
        &self.regions
    }

    pub fn as_mut_slice(&mut self) -> &mut [Region] {
        &mut self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Keep regions that look like signs: `area > min_sign_area` and
    /// fill ratio below `red_pixel_ratio`. The area test runs first, so
    /// zero-area regions are dropped before any division.
    ///
    /// Returns the number of regions discarded.
    pub fn retain_signs(&mut self, min_sign_area: u64, red_pixel_ratio: f64) -> usize {
        let before = self.regions.len();
        self.regions
            .retain(|region| is_sign_candidate(region, min_sign_area, red_pixel_ratio));
        before - self.regions.len()
    }

    pub fn stats(&self) -> RegionStats {
        let mut kind_counts: HashMap<usize, usize> = HashMap::new();
        let mut unclassified = 0;
        let mut total_area = 0u64;

        for region in &self.regions {
            match region.kind {
                Some(kind) => *kind_counts.entry(kind).or_insert(0) += 1,
                None => unclassified += 1,
            }
            total_area += region.area();
        }

        RegionStats {
            total_regions: self.regions.len(),
            kind_counts,
            unclassified,
            total_area,
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Region> {
        self.regions.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Region> {
        self.regions.iter_mut()
    }

    pub fn into_vec(self) -> Vec<Region> {
        self.regions
    }
}

fn is_sign_candidate(region: &Region, min_sign_area: u64, red_pixel_ratio: f64) -> bool {
    if region.area() <= min_sign_area {
        return false;
    }
    region
        .fill_ratio()
        .is_some_and(|ratio| ratio < red_pixel_ratio)
}

impl IntoIterator for RegionCollection {
    type Item = Region;
    type IntoIter = std::vec::IntoIter<Region>;

    fn into_iter(self) -> Self::IntoIter {
        self.regions.into_iter()
    }
}

impl<'a> IntoIterator for &'a RegionCollection {
    type Item = &'a Region;
    type IntoIter = std::slice::Iter<'a, Region>;

    fn into_iter(self) -> Self::IntoIter {
        self.regions.iter()
    }
}

impl FromIterator<Region> for RegionCollection {
    fn from_iter<T: IntoIterator<Item = Region>>(iter: T) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

/// Summary of a region collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionStats {
    pub total_regions: usize,
    /// Regions per template index
    pub kind_counts: HashMap<usize, usize>,
    pub unclassified: usize,
    pub total_area: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn test_from_rectangles_counts_surviving_pixels() -> Result<()> {
        // label 3 was cleared as dead before region building
        let labels = LabelGrid::from_vec(4, 3, vec![1, 1, 0, 0, 1, 0, 0, 2, 0, 0, 2, 2])?;
        let rects = [Rectangle::new(0, 1, 0, 1), Rectangle::new(0, 3, 0, 2)];

        let regions = RegionCollection::from_rectangles(&rects, &labels);
        let counts: Vec<usize> = regions.iter().map(|r| r.foreground_pixel_count).collect();
        assert_eq!(counts, vec![3, 6]);
        Ok(())
    }

    #[test]
    fn test_retain_signs_thresholds() {
        let mut regions = RegionCollection::from_vec(vec![
            // area 1000: not strictly above the minimum
            Region::new(Rectangle::new(0, 100, 0, 10), 10),
            // area 1200, ratio 0.25
            Region::new(Rectangle::new(0, 40, 0, 30), 300),
            // area 1200, ratio exactly 0.5
            Region::new(Rectangle::new(0, 40, 0, 30), 600),
            // zero area
            Region::new(Rectangle::new(5, 5, 0, 3000), 3001),
        ]);

        let discarded = regions.retain_signs(1000, 0.5);
        assert_eq!(discarded, 3);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions.as_slice()[0].foreground_pixel_count, 300);
    }

    #[test]
    fn test_stats() {
        let regions: RegionCollection = vec![
            Region::new(Rectangle::new(0, 2, 0, 2), 1).with_kind(1),
            Region::new(Rectangle::new(0, 1, 0, 1), 1).with_kind(1),
            Region::new(Rectangle::new(0, 1, 0, 3), 1),
        ]
        .into_iter()
        .collect();

        let stats = regions.stats();
        assert_eq!(stats.total_regions, 3);
        assert_eq!(stats.kind_counts.get(&1), Some(&2));
        assert_eq!(stats.unclassified, 1);
        assert_eq!(stats.total_area, 4 + 1 + 3);
    }
}
