// tests/pipeline_tests.rs
use anyhow::Result;
use image::{Rgba, RgbaImage};
use rand::{rngs::StdRng, Rng, SeedableRng};
use roadsign_core::{Connectivity, LabelGrid, PixelMask, Rectangle};
use roadsign_cv::{
    extraction::{extract, label_stats},
    merge::merge_pass,
    ComputeBackend, ConvergencePolicy, CpuBackend, DetectionConfig, IntersectionTest,
    LabelPropagator, MaskBands, SignDetector, Template, TemplateSet,
};
use std::collections::{HashMap, VecDeque};

const RED: Rgba<u8> = Rgba([230, 20, 20, 255]);
const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

fn propagate(mask: &PixelMask, connectivity: Connectivity) -> Result<LabelGrid> {
    Ok(LabelPropagator::new(connectivity, ConvergencePolicy::UNBOUNDED)
        .propagate(&CpuBackend, mask)?)
}

/// Breadth-first component ids, numbered from 1 in scan order
fn reference_components(mask: &PixelMask, connectivity: Connectivity) -> Vec<usize> {
    let (w, h) = (mask.width(), mask.height());
    let mut ids = vec![0usize; w * h];
    let mut next = 0;

    for (sx, sy) in mask.foreground_coords() {
        if ids[sy * w + sx] != 0 {
            continue;
        }
        next += 1;
        ids[sy * w + sx] = next;
        let mut queue = VecDeque::from([(sx, sy)]);
        while let Some((x, y)) = queue.pop_front() {
            for &(dx, dy) in connectivity.offsets() {
                let (Some(nx), Some(ny)) = (x.checked_add_signed(dx), y.checked_add_signed(dy))
                else {
                    continue;
                };
                if nx < w && ny < h && mask.is_foreground(nx, ny) && ids[ny * w + nx] == 0 {
                    ids[ny * w + nx] = next;
                    queue.push_back((nx, ny));
                }
            }
        }
    }
    ids
}

/// Red ring on white, `size` pixels across
fn ring(size: u32, thickness: u32) -> RgbaImage {
    let c = (size as f64 - 1.0) / 2.0;
    let outer = size as f64 / 2.0;
    RgbaImage::from_fn(size, size, |x, y| {
        let d = ((x as f64 - c).powi(2) + (y as f64 - c).powi(2)).sqrt();
        if d <= outer && d >= outer - thickness as f64 {
            RED
        } else {
            WHITE
        }
    })
}

fn ring_templates(backend: &CpuBackend) -> Result<TemplateSet> {
    let bands = MaskBands::default();
    Ok(TemplateSet::from_templates(vec![
        Template::build(backend, "blank", RgbaImage::from_pixel(60, 60, WHITE), &bands, 0.5)?,
        Template::build(backend, "ring", ring(60, 8), &bands, 0.5)?,
    ]))
}

#[test]
fn test_two_small_clusters_yield_no_regions() -> Result<()> {
    // two 5x5 red clusters on a diagonal, 40 px apart on each axis
    let mut frame = RgbaImage::from_pixel(50, 50, WHITE);
    for (ox, oy) in [(2, 2), (42, 42)] {
        image::imageops::replace(&mut frame, &RgbaImage::from_pixel(5, 5, RED), ox, oy);
    }

    let detector = SignDetector::new(CpuBackend::new(), DetectionConfig::default())?;
    let result = detector.detect(&frame)?;

    assert_eq!(result.stats.foreground_pixels, 50);
    assert_eq!(result.stats.components, 2);
    assert_eq!(result.stats.raw_boxes, 0);
    assert!(result.detections.is_empty());

    // same picture at the mask level: extraction clears both labels
    let mask = PixelMask::from_fn(50, 50, |x, y| {
        let blob = |o: usize| (o..o + 5).contains(&x) && (o..o + 5).contains(&y);
        blob(2) || blob(42)
    });
    let mut labels = propagate(&mask, Connectivity::Eight)?;
    assert!(extract(&mut labels, 100).is_empty());
    assert_eq!(labels.labeled_count(), 0);
    Ok(())
}

#[test]
fn test_labels_partition_random_masks() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(0x5160);

    for round in 0..20 {
        let (w, h) = (rng.gen_range(1..24), rng.gen_range(1..24));
        let density = rng.gen_range(0.2..0.7);
        let mask = PixelMask::from_fn(w, h, |_, _| rng.gen_bool(density));

        for connectivity in [Connectivity::Four, Connectivity::Eight] {
            let labels = propagate(&mask, connectivity)?;
            let reference = reference_components(&mask, connectivity);
            let seeds = LabelGrid::seeded(&mask);

            let mut to_label: HashMap<usize, u32> = HashMap::new();
            let mut to_component: HashMap<u32, usize> = HashMap::new();
            for (i, (&label, &component)) in labels.as_slice().iter().zip(&reference).enumerate() {
                assert_eq!(label == 0, component == 0, "round {round} pixel {i}");
                if component == 0 {
                    continue;
                }
                // the first pixel of a component carries its smallest seed
                let expected = *to_label.entry(component).or_insert(seeds.as_slice()[i]);
                assert_eq!(label, expected, "round {round} pixel {i} {connectivity:?}");
                assert_eq!(*to_component.entry(label).or_insert(component), component);
            }
        }
    }
    Ok(())
}

#[test]
fn test_boxes_tightly_bound_their_labels() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(7);
    let mask = PixelMask::from_fn(40, 30, |_, _| rng.gen_bool(0.45));

    let labels = propagate(&mask, Connectivity::Eight)?;
    for stats in label_stats(&labels) {
        let pixels: Vec<(u32, u32)> = labels
            .grid()
            .iter_cells()
            .filter(|&(_, _, &l)| l == stats.label)
            .map(|(x, y, _)| (x as u32, y as u32))
            .collect();

        assert_eq!(pixels.len(), stats.pixel_count);
        let b = stats.bounds;
        assert!(pixels.iter().all(|&(x, y)| b.contains_point(x, y)));
        assert!(pixels.iter().any(|&(x, _)| x == b.left));
        assert!(pixels.iter().any(|&(x, _)| x == b.right));
        assert!(pixels.iter().any(|&(_, y)| y == b.top));
        assert!(pixels.iter().any(|&(_, y)| y == b.bottom));
    }
    Ok(())
}

#[test]
fn test_single_pass_merge_of_three_overlapping_boxes() {
    let a = Rectangle::new(10, 20, 10, 20);
    let b = Rectangle::new(15, 25, 15, 25);
    let c = Rectangle::new(18, 30, 12, 22);

    let merged = merge_pass(&[a, b, c], IntersectionTest::Corner);
    assert_eq!(
        merged,
        vec![c, a.envelope(&b), a.envelope(&c), b.envelope(&c)]
    );
}

#[test]
fn test_ring_sign_is_detected_and_classified() -> Result<()> {
    let backend = CpuBackend::new();
    let templates = ring_templates(&backend)?;

    let mut frame = RgbaImage::from_pixel(100, 100, WHITE);
    image::imageops::replace(&mut frame, &ring(60, 8), 20, 20);

    let detector = SignDetector::new(backend, DetectionConfig::default())?.with_templates(templates);
    let result = detector.detect(&frame)?;

    assert_eq!(result.stats.components, 1);
    assert_eq!(result.detections.len(), 1);
    let sign = &result.detections[0];
    assert_eq!(sign.rect, Rectangle::new(20, 79, 20, 79));
    assert_eq!(result.kind_name(sign), Some("ring"));
    Ok(())
}

#[test]
fn test_thresholds_filter_regions() -> Result<()> {
    let backend = CpuBackend::new();
    let mut frame = RgbaImage::from_pixel(200, 100, WHITE);
    // accepted ring
    image::imageops::replace(&mut frame, &ring(60, 8), 10, 10);
    // solid block: fill ratio above 0.5
    image::imageops::replace(&mut frame, &RgbaImage::from_pixel(40, 40, RED), 100, 10);
    // small ring: enough pixels to survive extraction, area too small
    image::imageops::replace(&mut frame, &ring(20, 4), 160, 10);

    let detector = SignDetector::new(backend, DetectionConfig::default())?;
    let result = detector.detect(&frame)?;

    assert_eq!(result.stats.merged_boxes, 3);
    assert_eq!(result.stats.discarded_regions, 2);
    assert_eq!(result.detections.len(), 1);
    assert_eq!(result.detections[0].rect.left, 10);
    // no templates: reported but unclassified
    assert_eq!(result.detections[0].kind, None);

    let strict = DetectionConfig {
        red_pixel_ratio: 0.3,
        ..Default::default()
    };
    let result = SignDetector::new(backend, strict)?.detect(&frame)?;
    assert!(result.detections.is_empty());
    Ok(())
}

#[test]
fn test_backend_handle_is_shared_by_reference() -> Result<()> {
    let backend = CpuBackend::new();
    let detector = SignDetector::new(&backend, DetectionConfig::default())?;
    let result = detector.detect(&RgbaImage::from_pixel(16, 16, WHITE))?;
    assert_eq!(detector.backend().name(), "cpu");
    assert!(result.detections.is_empty());
    Ok(())
}
