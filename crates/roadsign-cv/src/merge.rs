//! Consolidation of overlapping bounding boxes.
//!
//! Labeling and color masking often split one physical sign into several
//! components whose boxes overlap. A merge pass replaces intersecting pairs
//! by their envelope. The pass always builds a new list from the old one.

use log::debug;
use roadsign_core::Rectangle;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Pairwise intersection predicate used by the merger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntersectionTest {
    /// A corner of one rectangle lies inside the other. Misses crossing
    /// rectangles where neither holds a corner of the other.
    #[default]
    Corner,
    /// Closed-interval overlap on both axes
    Overlap,
}

impl IntersectionTest {
    /// Whether the unordered pair intersects. Rectangles equal by value never do.
    pub fn intersects(self, a: &Rectangle, b: &Rectangle) -> bool {
        if a == b {
            return false;
        }
        match self {
            IntersectionTest::Corner => a.contains_corner_of(b) || b.contains_corner_of(a),
            IntersectionTest::Overlap => a.overlaps(b),
        }
    }
}

/// How far merging is carried.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeMode {
    /// Exactly one pass; chains of three or more boxes may stay split
    #[default]
    SinglePass,
    /// Merge clusters until no two boxes intersect
    Converge,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    pub mode: MergeMode,
    pub intersection: IntersectionTest,
}

/// Merge `rects` according to `config`
pub fn merge(rects: &[Rectangle], config: &MergeConfig) -> Vec<Rectangle> {
    let merged = match config.mode {
        MergeMode::SinglePass => merge_pass(rects, config.intersection),
        MergeMode::Converge => merge_to_fixed_point(rects, config.intersection),
    };
    debug!(
        "merged {} boxes into {} ({:?}, {:?})",
        rects.len(),
        merged.len(),
        config.mode,
        config.intersection
    );
    merged
}

/// One merge pass.
///
/// For each intersecting pair `(i, j)`, `i < j`: both are marked for removal
/// when neither is marked yet, and their envelope is always emitted. The
/// result is the unmarked inputs in order followed by the envelopes in
/// creation order.
pub fn merge_pass(rects: &[Rectangle], test: IntersectionTest) -> Vec<Rectangle> {
    let mut marked = vec![false; rects.len()];
    let mut envelopes = Vec::new();

    for i in 0..rects.len() {
        for j in (i + 1)..rects.len() {
            if !test.intersects(&rects[i], &rects[j]) {
                continue;
            }
            if !marked[i] && !marked[j] {
                marked[i] = true;
                marked[j] = true;
            }
            envelopes.push(rects[i].envelope(&rects[j]));
        }
    }

    rects
        .iter()
        .zip(&marked)
        .filter(|&(_, &gone)| !gone)
        .map(|(rect, _)| *rect)
        .chain(envelopes)
        .collect()
}

/// Replace every cluster of transitively intersecting boxes by its envelope,
/// repeating until no pair intersects.
///
/// Each round that finds an intersection strictly reduces the number of
/// boxes, so this terminates after at most `rects.len()` rounds.
pub fn merge_to_fixed_point(rects: &[Rectangle], test: IntersectionTest) -> Vec<Rectangle> {
    let mut current = dedup(rects.iter().copied());

    loop {
        let n = current.len();
        let mut parent: Vec<usize> = (0..n).collect();
        let mut merged_any = false;

        for i in 0..n {
            for j in (i + 1)..n {
                if test.intersects(&current[i], &current[j]) {
                    let (ri, rj) = (find(&mut parent, i), find(&mut parent, j));
                    if ri != rj {
                        parent[ri.max(rj)] = ri.min(rj);
                    }
                    merged_any = true;
                }
            }
        }

        if !merged_any {
            return current;
        }

        let mut order = Vec::new();
        let mut clusters: HashMap<usize, Rectangle> = HashMap::new();
        for i in 0..n {
            let root = find(&mut parent, i);
            clusters
                .entry(root)
                .and_modify(|env| *env = env.envelope(&current[i]))
                .or_insert_with(|| {
                    order.push(root);
                    current[i]
                });
        }
        current = dedup(order.iter().map(|root| clusters[root]));
    }
}

fn find(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

/// Drop repeated rectangles, keeping first occurrences in order
fn dedup(rects: impl Iterator<Item = Rectangle>) -> Vec<Rectangle> {
    let mut out: Vec<Rectangle> = Vec::new();
    for rect in rects {
        if !out.contains(&rect) {
            out.push(rect);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(left: u32, right: u32, top: u32, bottom: u32) -> Rectangle {
        Rectangle::new(left, right, top, bottom)
    }

    #[test]
    fn test_disjoint_boxes_pass_through() {
        let input = vec![rect(0, 2, 0, 2), rect(5, 7, 5, 7), rect(10, 10, 0, 0)];
        assert_eq!(merge_pass(&input, IntersectionTest::Corner), input);
    }

    #[test]
    fn test_pair_becomes_envelope() {
        let a = rect(0, 4, 0, 4);
        let b = rect(3, 9, 2, 6);
        let merged = merge_pass(&[a, b], IntersectionTest::Corner);

        assert_eq!(merged, vec![rect(0, 9, 0, 6)]);
        assert!(merged[0].contains(&a) && merged[0].contains(&b));
    }

    #[test]
    fn test_three_mutually_overlapping_single_pass() {
        let a = rect(0, 4, 0, 4);
        let b = rect(2, 6, 2, 6);
        let c = rect(3, 8, 3, 8);

        let merged = merge_pass(&[a, b, c], IntersectionTest::Corner);

        // (a, b) marks both; c survives because each of its pairs has a marked member
        assert_eq!(
            merged,
            vec![c, rect(0, 6, 0, 6), rect(0, 8, 0, 8), rect(2, 8, 2, 8)]
        );
    }

    #[test]
    fn test_chain_converges_to_one_box() {
        let chain = [rect(0, 4, 0, 4), rect(3, 7, 3, 7), rect(6, 10, 6, 10)];
        let config = MergeConfig {
            mode: MergeMode::Converge,
            intersection: IntersectionTest::Corner,
        };
        assert_eq!(merge(&chain, &config), vec![rect(0, 10, 0, 10)]);
    }

    #[test]
    fn test_converged_output_has_no_intersections() {
        let input = [
            rect(0, 3, 0, 3),
            rect(20, 25, 20, 25),
            rect(2, 5, 2, 5),
            rect(24, 30, 0, 21),
            rect(50, 50, 50, 50),
            rect(50, 50, 50, 50),
        ];
        let merged = merge_to_fixed_point(&input, IntersectionTest::Corner);

        for (i, a) in merged.iter().enumerate() {
            for b in &merged[i + 1..] {
                assert!(!IntersectionTest::Corner.intersects(a, b), "{a} vs {b}");
            }
        }
        assert_eq!(
            merged,
            vec![rect(0, 5, 0, 5), rect(20, 30, 0, 25), rect(50, 50, 50, 50)]
        );
    }

    #[test]
    fn test_crossing_boxes_need_overlap_test() {
        let wide = rect(0, 10, 4, 6);
        let tall = rect(4, 6, 0, 10);

        assert_eq!(
            merge_pass(&[wide, tall], IntersectionTest::Corner),
            vec![wide, tall]
        );
        assert_eq!(
            merge_pass(&[wide, tall], IntersectionTest::Overlap),
            vec![rect(0, 10, 0, 10)]
        );
    }

    #[test]
    fn test_containment_is_detected_either_way_round() {
        let outer = rect(0, 10, 0, 10);
        let inner = rect(3, 5, 3, 5);
        assert_eq!(merge_pass(&[inner, outer], IntersectionTest::Corner), vec![outer]);
        assert_eq!(merge_pass(&[outer, inner], IntersectionTest::Corner), vec![outer]);
    }

    #[test]
    fn test_duplicates_never_merge_with_each_other() {
        let a = rect(1, 2, 1, 2);
        assert_eq!(merge_pass(&[a, a], IntersectionTest::Overlap), vec![a, a]);
    }

    #[test]
    fn test_config_serde_names() {
        let config: MergeConfig =
            serde_json::from_str(r#"{"mode": "converge", "intersection": "overlap"}"#).unwrap();
        assert_eq!(config.mode, MergeMode::Converge);
        assert_eq!(config.intersection, IntersectionTest::Overlap);
    }
}
