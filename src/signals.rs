//! Independent per-pixel evidence maps for "this pixel looks diseased".
//!
//! Every generator returns a fresh field in [0,1] that is zero outside the
//! leaf mask.

use rayon::prelude::*;

use crate::baseline::HealthyBaseline;
use crate::color_space::{luma, strictly_within, within, Hsv, Lab, PixelColors};
use crate::config::{ClusterParams, ContrastParams, DeviationParams, HeatmapParams, SpotParams};
use crate::diagnosis::Diagnosis;
use crate::field::{LeafMask, ScalarField};

/// The four evidence maps fused into the activation field
#[derive(Debug, Clone)]
pub struct SignalMaps {
    pub deviation: ScalarField,
    pub spot: ScalarField,
    pub contrast: ScalarField,
    pub cluster: ScalarField,
}

/// Run all four generators. They share no state, so they run concurrently.
pub fn compute_signals(
    colors: &PixelColors,
    mask: &LeafMask,
    baseline: &HealthyBaseline,
    diagnosis: Diagnosis,
    params: &HeatmapParams,
) -> SignalMaps {
    let ((deviation, spot), (contrast, cluster)) = rayon::join(
        || {
            rayon::join(
                || color_deviation_map(colors, mask, baseline, &params.deviation),
                || disease_spot_map(colors, mask, diagnosis, &params.spot),
            )
        },
        || {
            rayon::join(
                || local_contrast_map(colors, mask, &params.contrast),
                || baseline_distance_map(colors, mask, baseline, &params.cluster),
            )
        },
    );

    SignalMaps {
        deviation,
        spot,
        contrast,
        cluster,
    }
}

/// Weighted z-score distance of H, S, V, a*, b* from the healthy baseline
pub fn color_deviation_map(
    colors: &PixelColors,
    mask: &LeafMask,
    baseline: &HealthyBaseline,
    params: &DeviationParams,
) -> ScalarField {
    let w = params.weights;
    ScalarField::from_index_fn(colors.width(), colors.height(), |i| {
        if !mask.is_leaf(i) {
            return 0.0;
        }
        let hsv = colors.hsv[i];
        let lab = colors.lab[i];
        let deviation = baseline.hue.z(hsv.h) * w[0]
            + baseline.saturation.z(hsv.s) * w[1]
            + baseline.value.z(hsv.v) * w[2]
            + baseline.a.z(lab.a) * w[3]
            + baseline.b.z(lab.b) * w[4];
        (deviation / params.divisor).clamp(0.0, 1.0)
    })
}

/// Lesion-color evidence for one pixel under the given diagnosis
pub fn spot_score(diagnosis: Diagnosis, hsv: Hsv, lab: Lab, params: &SpotParams) -> f32 {
    let Hsv { h, s, v } = hsv;
    let mut score = 0.0;

    match diagnosis {
        Diagnosis::EarlyBlight => {
            let p = &params.early;
            if within(h, p.ring_hue) && within(v, p.ring_value) {
                score += (p.ring_value_ceiling - v) * p.ring_gain;
            }
            if within(h, p.tan_hue) && s >= p.tan_min_saturation && within(v, p.tan_value) {
                score += p.tan_score;
            }
            if within(h, p.halo_hue) && s >= p.halo_min_saturation && v >= p.halo_min_value {
                score += p.halo_score;
            }
            if lab.a > p.warm_min_a && lab.b > p.warm_min_b {
                score += p.warm_score;
            }
        }
        Diagnosis::LateBlight => {
            let p = &params.late;
            if within(v, p.necrosis_value) {
                score += (p.necrosis_value_ceiling - v) * p.necrosis_gain;
            }
            if within(s, p.water_soaked_saturation) && within(h, p.water_soaked_hue) {
                score += p.water_soaked_score;
            }
            if v < p.black_max_value && s < p.black_max_saturation {
                score += p.black_score;
            }
            if h >= p.red_hue_from || h <= p.red_hue_to {
                score += p.red_score;
            }
        }
        Diagnosis::Healthy | Diagnosis::Diseased => {
            let p = &params.generic;
            if within(h, p.brown_hue) && s >= p.brown_min_saturation {
                score += p.brown_score;
                if v < p.dark_brown_max_value {
                    score += p.dark_brown_bonus;
                }
            }
            if strictly_within(v, p.dark_value) {
                score += (p.dark_value_ceiling - v) * p.dark_gain;
            }
            if within(h, p.yellow_hue) && s >= p.yellow_min_saturation {
                score += p.yellow_score;
            }
        }
    }

    if h < params.healthy_hue_low || h > params.healthy_hue_high {
        score += params.off_band_bonus;
    }

    score.clamp(0.0, 1.0)
}

/// Label-conditioned lesion color signatures
pub fn disease_spot_map(
    colors: &PixelColors,
    mask: &LeafMask,
    diagnosis: Diagnosis,
    params: &SpotParams,
) -> ScalarField {
    ScalarField::from_index_fn(colors.width(), colors.height(), |i| {
        if !mask.is_leaf(i) {
            return 0.0;
        }
        spot_score(diagnosis, colors.hsv[i], colors.lab[i], params)
    })
}

/// Windowed luma spread (std and range) over leaf neighbors
pub fn local_contrast_map(
    colors: &PixelColors,
    mask: &LeafMask,
    params: &ContrastParams,
) -> ScalarField {
    let width = colors.width() as usize;
    let height = colors.height() as usize;
    let half = params.half_window as usize;
    let gray: Vec<f32> = colors.rgb.par_iter().map(|p| luma(*p)).collect();

    ScalarField::from_index_fn(colors.width(), colors.height(), |idx| {
        if !mask.is_leaf(idx) {
            return 0.0;
        }
        let x = idx % width;
        let y = idx / width;
        let (x0, x1) = (x.saturating_sub(half), (x + half).min(width - 1));
        let (y0, y1) = (y.saturating_sub(half), (y + half).min(height - 1));

        let mut sum = 0.0f64;
        let mut sum_sq = 0.0f64;
        let mut min_val = 1.0f32;
        let mut max_val = 0.0f32;
        let mut count = 0usize;

        for ny in y0..=y1 {
            for nx in x0..=x1 {
                let n = ny * width + nx;
                if mask.is_leaf(n) {
                    let val = gray[n];
                    sum += val as f64;
                    sum_sq += (val as f64) * (val as f64);
                    min_val = min_val.min(val);
                    max_val = max_val.max(val);
                    count += 1;
                }
            }
        }

        if count < params.min_neighbors {
            return 0.0;
        }

        let mean = sum / count as f64;
        let std = (sum_sq / count as f64 - mean * mean).max(0.0).sqrt() as f32;
        let range = max_val - min_val;
        ((std * params.std_gain + range * params.range_gain) / 2.0).clamp(0.0, 1.0)
    })
}

/// Scaled Euclidean distance in (L*, a*, b*) from the healthy baseline mean
pub fn baseline_distance_map(
    colors: &PixelColors,
    mask: &LeafMask,
    baseline: &HealthyBaseline,
    params: &ClusterParams,
) -> ScalarField {
    let [sl, sa, sb] = params.scale;
    ScalarField::from_index_fn(colors.width(), colors.height(), |i| {
        if !mask.is_leaf(i) {
            return 0.0;
        }
        let lab = colors.lab[i];
        let dl = (lab.l - baseline.lightness.mean) / sl;
        let da = (lab.a - baseline.a.mean) / sa;
        let db = (lab.b - baseline.b.mean) / sb;
        ((dl * dl + da * da + db * db).sqrt() * params.gain).min(1.0)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baseline::estimate_baseline;
    use crate::color_space::{rgb_to_hsv, rgb_to_lab};
    use crate::config::BaselineParams;
    use image::{GrayImage, Luma, Rgb, RgbImage};

    const GREEN: [u8; 3] = [60, 140, 50];
    const BROWN: [u8; 3] = [100, 60, 30];

    fn full_mask(w: u32, h: u32) -> LeafMask {
        LeafMask::from_gray(&GrayImage::from_pixel(w, h, Luma([255])))
    }

    fn spot(diagnosis: Diagnosis, rgb: [u8; 3]) -> f32 {
        spot_score(diagnosis, rgb_to_hsv(rgb), rgb_to_lab(rgb), &SpotParams::default())
    }

    #[test]
    fn early_blight_prefers_brown_over_green() {
        assert!(spot(Diagnosis::EarlyBlight, BROWN) > 0.8);
        assert!(spot(Diagnosis::EarlyBlight, GREEN) < 0.05);
    }

    #[test]
    fn late_blight_rewards_dark_necrosis() {
        let necrotic = spot(Diagnosis::LateBlight, [35, 30, 28]);
        let green = spot(Diagnosis::LateBlight, GREEN);
        assert!(necrotic > 0.8, "necrotic score {}", necrotic);
        assert!(green < 0.05);
    }

    #[test]
    fn generic_branch_rewards_brown() {
        assert!(spot(Diagnosis::Diseased, BROWN) > 0.8);
        assert!(spot(Diagnosis::Diseased, GREEN) < 0.05);
    }

    #[test]
    fn spot_bands_follow_config() {
        let mut params = SpotParams::default();
        params.early.tan_score = 0.0;
        params.early.warm_score = 0.0;
        params.off_band_bonus = 0.0;
        let hsv = rgb_to_hsv(BROWN);
        let lab = rgb_to_lab(BROWN);
        let ring_only = spot_score(Diagnosis::EarlyBlight, hsv, lab, &params);
        assert!(ring_only > 0.0 && ring_only < 0.3, "ring score {}", ring_only);

        params.early.ring_hue = [200.0, 220.0];
        assert_eq!(spot_score(Diagnosis::EarlyBlight, hsv, lab, &params), 0.0);
    }

    #[test]
    fn uniform_green_signals_are_near_zero() {
        let img = RgbImage::from_pixel(30, 30, Rgb(GREEN));
        let colors = PixelColors::from_image(&img);
        let mask = full_mask(30, 30);
        let params = HeatmapParams::default();
        let baseline = estimate_baseline(&colors, &mask, &BaselineParams::default()).baseline;
        let maps = compute_signals(&colors, &mask, &baseline, Diagnosis::Healthy, &params);
        for field in [&maps.deviation, &maps.spot, &maps.contrast, &maps.cluster] {
            assert!(field.values().iter().all(|v| *v < 0.01));
        }
    }

    #[test]
    fn signals_are_zero_outside_mask() {
        let img = RgbImage::from_pixel(12, 12, Rgb(BROWN));
        let colors = PixelColors::from_image(&img);
        let mask = LeafMask::empty(12, 12);
        let params = HeatmapParams::default();
        let maps = compute_signals(
            &colors,
            &mask,
            &params.baseline.fallback,
            Diagnosis::EarlyBlight,
            &params,
        );
        for field in [&maps.deviation, &maps.spot, &maps.contrast, &maps.cluster] {
            assert!(field.values().iter().all(|v| *v == 0.0));
        }
    }

    #[test]
    fn contrast_fires_on_edges_only() {
        let img = RgbImage::from_fn(30, 30, |x, _| if x < 15 { Rgb(GREEN) } else { Rgb(BROWN) });
        let colors = PixelColors::from_image(&img);
        let field = local_contrast_map(&colors, &full_mask(30, 30), &ContrastParams::default());
        assert!(field.get(15, 15) > 0.1);
        assert!(field.get(2, 15) < 1e-3);
        assert!(field.get(27, 15) < 1e-3);
    }

    #[test]
    fn sparse_windows_are_skipped() {
        let img = RgbImage::from_fn(20, 20, |x, _| if x % 2 == 0 { Rgb(GREEN) } else { Rgb(BROWN) });
        let colors = PixelColors::from_image(&img);
        let mut gray = GrayImage::new(20, 20);
        gray.put_pixel(10, 10, Luma([255]));
        gray.put_pixel(11, 10, Luma([255]));
        let mask = LeafMask::from_gray(&gray);
        let field = local_contrast_map(&colors, &mask, &ContrastParams::default());
        assert!(field.values().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn cluster_distance_grows_with_color_shift() {
        let img = RgbImage::from_fn(2, 1, |x, _| if x == 0 { Rgb(GREEN) } else { Rgb(BROWN) });
        let colors = PixelColors::from_image(&img);
        let lab = rgb_to_lab(GREEN);
        let params = HeatmapParams::default();
        let mut baseline = params.baseline.fallback;
        baseline.lightness.mean = lab.l;
        baseline.a.mean = lab.a;
        baseline.b.mean = lab.b;
        let field = baseline_distance_map(&colors, &full_mask(2, 1), &baseline, &params.cluster);
        assert!(field.get(0, 0) < 1e-3);
        assert!(field.get(1, 0) > 0.5);
    }
}
