//! The heatmap pipeline, from raster + diagnosis label to overlay + severity.
//!
//! Stages run in a fixed order and each one returns a freshly allocated
//! buffer: resize, color conversion, segmentation, baseline, signals,
//! fusion/suppression, smoothing, normalization, severity, compositing.

use std::fs;
use std::path::{Path, PathBuf};

use image::RgbImage;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::baseline::{estimate_baseline, BaselineEstimate};
use crate::color_space::PixelColors;
use crate::config::{Config, HeatmapParams};
use crate::diagnosis::Diagnosis;
use crate::errors::Result;
use crate::field::{LeafMask, ScalarField};
use crate::fusion::{fuse_signals, suppress_false_positives};
use crate::image_io::{decode_image, save_image, InputImage};
use crate::image_utils::resize_to_working;
use crate::normalize::normalize;
use crate::output::{write_report_json, ScanRecord};
use crate::overlay::composite_overlay;
use crate::segmentation::segment;
use crate::severity::{lesion_coverage, score_severity};
use crate::signals::{compute_signals, SignalMaps};
use crate::smoothing::multi_scale_smooth;

/// What callers of the core get back
#[derive(Debug, Clone)]
pub struct HeatmapResult {
    /// Overlay at working resolution
    pub overlay: RgbImage,
    /// Severity in [0,1]
    pub severity: f64,
}

/// Every intermediate of one run, for inspection and debug output
#[derive(Debug, Clone)]
pub struct HeatmapAnalysis {
    pub diagnosis: Diagnosis,
    pub working_image: RgbImage,
    pub mask: LeafMask,
    /// `None` for healthy diagnoses and empty masks
    pub baseline: Option<BaselineEstimate>,
    /// `None` for healthy diagnoses and empty masks
    pub signals: Option<SignalMaps>,
    /// Activation before smoothing
    pub activation: ScalarField,
    /// Smoothed and normalized activation
    pub heatmap: ScalarField,
    pub overlay: RgbImage,
    pub severity: f64,
    pub lesion_coverage: f64,
}

impl HeatmapAnalysis {
    pub fn into_result(self) -> HeatmapResult {
        HeatmapResult {
            overlay: self.overlay,
            severity: self.severity,
        }
    }
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Low random activation over the leaf, so a healthy leaf renders cool
fn healthy_activation<R: Rng>(mask: &LeafMask, range: [f32; 2], rng: &mut R) -> ScalarField {
    let (width, height) = mask.dimensions();
    let [low, high] = range;
    let data: Vec<f32> = (0..mask.len())
        .map(|i| {
            if !mask.is_leaf(i) {
                0.0
            } else if high > low {
                rng.gen_range(low..high)
            } else {
                low
            }
        })
        .collect();
    ScalarField::from_index_fn(width, height, |i| data[i])
}

/// Run the full pipeline and keep every intermediate
pub fn analyze(image: &RgbImage, diagnosis: Diagnosis, params: &HeatmapParams) -> HeatmapAnalysis {
    let mut rng = make_rng(params.seed);
    analyze_with_rng(image, diagnosis, params, &mut rng)
}

/// [`analyze`] with a caller-supplied random source
pub fn analyze_with_rng<R: Rng>(
    image: &RgbImage,
    diagnosis: Diagnosis,
    params: &HeatmapParams,
    rng: &mut R,
) -> HeatmapAnalysis {
    let working_image = resize_to_working(image, params.max_working_size);
    let (width, height) = working_image.dimensions();
    debug!(
        "Analyzing {}x{} working image (source {}x{}) as {}",
        width,
        height,
        image.width(),
        image.height(),
        diagnosis
    );

    let colors = PixelColors::from_image(&working_image);
    let mask = if colors.is_empty() {
        LeafMask::empty(width, height)
    } else {
        segment(&colors, &params.segmentation)
    };

    let (baseline, signals, activation) = if diagnosis.is_healthy() {
        let activation = healthy_activation(&mask, params.normalization.healthy_activation, rng);
        (None, None, activation)
    } else if !mask.has_leaf() {
        (None, None, ScalarField::zeros(width, height))
    } else {
        let estimate = estimate_baseline(&colors, &mask, &params.baseline);
        let signals = compute_signals(&colors, &mask, &estimate.baseline, diagnosis, params);
        let fused = fuse_signals(&signals, &mask, &params.fusion);
        let activation = suppress_false_positives(&fused, &colors, &mask, &params.suppression);
        (Some(estimate), Some(signals), activation)
    };

    let smoothed = multi_scale_smooth(&activation, &params.smoothing);
    let heatmap = normalize(&smoothed, &mask, &params.normalization);

    let severity = score_severity(&heatmap, &mask, diagnosis, &params.severity, rng);
    let lesion_coverage = lesion_coverage(&heatmap, &mask, params.severity.lesion_threshold);
    let overlay = composite_overlay(&working_image, &heatmap, &mask, &params.overlay);

    HeatmapAnalysis {
        diagnosis,
        working_image,
        mask,
        baseline,
        signals,
        activation,
        heatmap,
        overlay,
        severity,
        lesion_coverage,
    }
}

/// Overlay and severity for a decoded raster and a free-text diagnosis label
pub fn generate_heatmap(image: &RgbImage, label: &str, params: &HeatmapParams) -> HeatmapResult {
    analyze(image, Diagnosis::from_label(label), params).into_result()
}

/// Like [`generate_heatmap`], decoding the image first.
///
/// Fails with [`crate::HeatmapError::Decode`] on corrupt or unsupported data.
pub fn generate_heatmap_from_bytes(
    bytes: &[u8],
    label: &str,
    params: &HeatmapParams,
) -> Result<HeatmapResult> {
    let image = decode_image(bytes)?;
    Ok(generate_heatmap(&image, label, params))
}

/// Grayscale dumps of every stage
fn save_debug_images(analysis: &HeatmapAnalysis, debug_dir: &Path, filename: &str) -> Result<()> {
    fs::create_dir_all(debug_dir)?;

    let mut layers: Vec<(&str, &ScalarField)> = vec![
        ("mask", analysis.mask.as_field()),
        ("activation", &analysis.activation),
        ("heatmap", &analysis.heatmap),
    ];
    if let Some(signals) = &analysis.signals {
        layers.push(("deviation", &signals.deviation));
        layers.push(("spot", &signals.spot));
        layers.push(("contrast", &signals.contrast));
        layers.push(("cluster", &signals.cluster));
    }

    for (name, field) in layers {
        field
            .to_gray_image()
            .save_with_format(
                debug_dir.join(format!("{}_{}.png", filename, name)),
                image::ImageFormat::Png,
            )?;
    }
    Ok(())
}

/// Process a single image file: analyze, save the overlay and optional reports
pub fn process_image(input_image: InputImage, config: &Config, debug: bool) -> Result<ScanRecord> {
    let InputImage { image, path, filename } = input_image;
    let diagnosis = Diagnosis::from_label(&config.diagnosis_label);

    let analysis = analyze(&image, diagnosis, &config.heatmap);

    let output_base = PathBuf::from(&config.output_base_dir);
    let overlay_dir = output_base.join("overlays");
    fs::create_dir_all(&overlay_dir)?;
    save_image(&analysis.overlay, overlay_dir.join(format!("{}_heatmap.png", filename)))?;

    if debug {
        save_debug_images(&analysis, &output_base.join("debug"), &filename)?;
        if let Some(estimate) = &analysis.baseline {
            debug!(
                "{}: baseline from {} samples{}",
                filename,
                estimate.sample_count,
                if estimate.used_fallback { " (fallback)" } else { "" }
            );
        }
    }

    let record = ScanRecord::from_analysis(&path, &config.diagnosis_label, &analysis);

    if config.write_reports {
        write_report_json(&record, output_base.join("reports"), &filename)?;
    }

    info!(
        "{}: {} severity {:.1}% (lesion coverage {:.1}%, leaf coverage {:.1}%)",
        filename,
        diagnosis,
        record.severity * 100.0,
        record.lesion_coverage * 100.0,
        record.leaf_coverage * 100.0
    );

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn empty_raster_does_not_panic() {
        let image = RgbImage::new(0, 0);
        let mut params = HeatmapParams::default();
        params.seed = Some(1);
        let result = generate_heatmap(&image, "late blight", &params);
        assert_eq!(result.overlay.dimensions(), (0, 0));
        assert_eq!(result.severity, 0.0);
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let image = RgbImage::from_fn(40, 40, |x, y| {
            if (x / 10 + y / 10) % 2 == 0 {
                Rgb([60, 140, 50])
            } else {
                Rgb([100, 60, 30])
            }
        });
        let mut params = HeatmapParams::default();
        params.seed = Some(99);
        let a = generate_heatmap(&image, "healthy", &params);
        let b = generate_heatmap(&image, "healthy", &params);
        assert_eq!(a.severity, b.severity);
        assert_eq!(a.overlay, b.overlay);
    }

    #[test]
    fn healthy_run_skips_signals() {
        let image = RgbImage::from_pixel(30, 30, Rgb([60, 140, 50]));
        let analysis = analyze(&image, Diagnosis::Healthy, &HeatmapParams::default());
        assert!(analysis.signals.is_none());
        assert!(analysis.baseline.is_none());
        assert!((0.02..=0.05).contains(&analysis.severity));
    }
}
