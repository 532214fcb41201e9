//! Detection run driven from the command line

use log::info;
use roadsign_cv::{ComputeBackend, DetectionConfig, DetectionResult, Result, SignDetector};
use std::path::Path;

#[cfg(feature = "opencv")]
fn backend() -> roadsign_cv::OpenCvBackend {
    roadsign_cv::OpenCvBackend::new()
}

#[cfg(not(feature = "opencv"))]
fn backend() -> roadsign_cv::CpuBackend {
    roadsign_cv::CpuBackend::new()
}

/// Load templates, detect signs in `frame_path`, print a summary and
/// optionally write the result as JSON.
pub fn run_detection(
    frame_path: &Path,
    config: DetectionConfig,
    out: Option<&Path>,
) -> Result<()> {
    let backend = backend();
    info!("Using {} backend", backend.name());

    let detector = SignDetector::new(backend, config)?.load_templates()?;
    let result = detector.detect_from_file(frame_path)?;

    print_summary(&result);

    if let Some(path) = out {
        detector.export_json(&result, path)?;
        info!("Results written to {:?}", path);
    }

    Ok(())
}

fn print_summary(result: &DetectionResult) {
    let stats = &result.stats;
    println!(
        "Frame {}x{}: {} foreground px, {} components after {} passes",
        stats.frame_width, stats.frame_height, stats.foreground_pixels, stats.components, stats.passes
    );
    println!(
        "Boxes: {} raw, {} merged, {} discarded",
        stats.raw_boxes, stats.merged_boxes, stats.discarded_regions
    );

    if result.detections.is_empty() {
        println!("No signs detected");
        return;
    }

    for (i, region) in result.detections.iter().enumerate() {
        println!(
            "  #{:<3} {}  area {:>7}  fg {:>6}  kind {}",
            i,
            region.rect,
            region.area(),
            region.foreground_pixel_count,
            result.kind_name(region).unwrap_or("-")
        );
    }
    println!("Completed in {} ms", stats.processing_time_ms);
}
