//! Leaf/background segmentation from color heuristics plus morphological cleanup

use image::{GrayImage, Luma};
use log::{debug, warn};
use rayon::prelude::*;

use crate::color_space::{strictly_within, within, Hsv, Lab, PixelColors};
use crate::config::SegmentationParams;
use crate::field::LeafMask;
use crate::morphology::{apply_closing, apply_opening};

/// How plant-like a single pixel looks. Higher is more leaf.
pub fn leaf_score(hsv: Hsv, lab: Lab, params: &SegmentationParams) -> f32 {
    let mut score = 0.0;

    if within(hsv.h, params.green_hue) {
        score += params.green_band_score;
        if hsv.s > params.green_min_saturation {
            score += params.green_saturation_bonus;
        }
        if strictly_within(hsv.v, params.green_value_range) {
            score += params.green_value_bonus;
        }
    }

    if within(hsv.h, params.brown_hue) && hsv.s > params.brown_min_saturation {
        score += params.brown_band_score;
        if strictly_within(hsv.v, params.brown_value_range) {
            score += params.brown_value_bonus;
        }
    }

    if within(hsv.h, params.yellow_green_hue) && hsv.s > params.yellow_green_min_saturation {
        score += params.yellow_green_score;
    }

    if strictly_within(lab.a, params.neutral_a_range) {
        score += params.neutral_chroma_score;
    }

    // Shadows and specular highlights
    if hsv.v < params.dark_value || hsv.v > params.bright_value {
        score *= params.extreme_value_factor;
    }

    let [low, high] = params.washed_out_value_range;
    if hsv.s < params.washed_out_saturation && (hsv.v < low || hsv.v > high) {
        score *= params.washed_out_factor;
    }

    score
}

/// Per-pixel threshold of [`leaf_score`], before any cleanup
pub fn raw_leaf_mask(colors: &PixelColors, params: &SegmentationParams) -> GrayImage {
    let values: Vec<u8> = colors
        .hsv
        .par_iter()
        .zip(colors.lab.par_iter())
        .map(|(hsv, lab)| {
            if leaf_score(*hsv, *lab, params) > params.score_threshold {
                255
            } else {
                0
            }
        })
        .collect();

    let mut mask = GrayImage::new(colors.width(), colors.height());
    for (pixel, value) in mask.pixels_mut().zip(values) {
        *pixel = Luma([value]);
    }
    mask
}

/// Build the binary leaf mask: threshold, open, close, then fill small holes
pub fn segment(colors: &PixelColors, params: &SegmentationParams) -> LeafMask {
    let raw = raw_leaf_mask(colors, params);
    let opened = apply_opening(&raw, params.open_radius);
    let closed = apply_closing(&opened, params.close_radius);
    let filled = apply_closing(&closed, params.fill_radius);

    let mask = LeafMask::from_gray(&filled);
    if mask.has_leaf() {
        debug!(
            "Leaf mask: {} of {} pixels ({:.1}%)",
            mask.leaf_count(),
            mask.len(),
            mask.coverage() * 100.0
        );
    } else {
        warn!("Leaf segmentation found no leaf pixels; output will be background only");
    }
    mask
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color_space::{rgb_to_hsv, rgb_to_lab};
    use image::{Rgb, RgbImage};

    fn score_of(rgb: [u8; 3]) -> f32 {
        leaf_score(rgb_to_hsv(rgb), rgb_to_lab(rgb), &SegmentationParams::default())
    }

    #[test]
    fn green_and_brown_tissue_score_as_leaf() {
        assert!(score_of([60, 140, 50]) > 0.4);
        assert!(score_of([100, 60, 30]) > 0.4);
        assert!(score_of([170, 180, 60]) > 0.4);
    }

    #[test]
    fn black_white_and_blue_score_as_background() {
        assert!(score_of([5, 5, 5]) <= 0.4);
        assert!(score_of([252, 252, 252]) <= 0.4);
        assert!(score_of([40, 60, 200]) <= 0.4);
    }

    #[test]
    fn score_increments_follow_config() {
        let brown = [100, 60, 30];
        let mut params = SegmentationParams::default();
        params.brown_band_score = 0.0;
        params.brown_value_bonus = 0.0;
        params.neutral_chroma_score = 0.0;
        assert_eq!(leaf_score(rgb_to_hsv(brown), rgb_to_lab(brown), &params), 0.0);
    }

    #[test]
    fn mask_is_binary_and_sized() {
        let img = RgbImage::from_fn(64, 48, |x, y| {
            if (16..48).contains(&x) && (12..36).contains(&y) {
                Rgb([60, 140, 50])
            } else {
                Rgb([250, 250, 252])
            }
        });
        let colors = PixelColors::from_image(&img);
        let mask = segment(&colors, &SegmentationParams::default());
        assert_eq!(mask.dimensions(), (64, 48));
        assert!(mask.as_field().values().iter().all(|v| *v == 0.0 || *v == 1.0));
        assert_eq!(mask.leaf_count(), 32 * 24);
    }

    #[test]
    fn isolated_specks_are_removed() {
        let mut img = RgbImage::from_pixel(40, 40, Rgb([250, 250, 252]));
        img.put_pixel(20, 20, Rgb([60, 140, 50]));
        img.put_pixel(21, 20, Rgb([60, 140, 50]));
        let colors = PixelColors::from_image(&img);
        let mask = segment(&colors, &SegmentationParams::default());
        assert!(!mask.has_leaf());
    }
}
