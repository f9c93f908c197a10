//! False-color rendering of the activation field

use image::{Rgb, RgbImage};
use rayon::prelude::*;

use crate::config::OverlayParams;
use crate::field::{LeafMask, ScalarField};

/// Jet colormap: dark blue -> blue -> cyan -> green -> yellow -> red -> dark red.
///
/// Non-finite input maps like 0.
pub fn value_to_jet_color(value: f32) -> Rgb<u8> {
    let v = if value.is_finite() { value.clamp(0.0, 1.0) } else { 0.0 };

    let (r, g, b) = if v < 0.125 {
        let t = v / 0.125;
        (0.0, 0.0, 0.5 + t * 0.5)
    } else if v < 0.375 {
        let t = (v - 0.125) / 0.25;
        (0.0, t, 1.0)
    } else if v < 0.625 {
        let t = (v - 0.375) / 0.25;
        (t, 1.0, 1.0 - t)
    } else if v < 0.875 {
        let t = (v - 0.625) / 0.25;
        (1.0, 1.0 - t, 0.0)
    } else {
        let t = (v - 0.875) / 0.125;
        (1.0 - t * 0.3, 0.0, 0.0)
    };

    Rgb([to_byte(r * 255.0), to_byte(g * 255.0), to_byte(b * 255.0)])
}

#[inline]
fn to_byte(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Blend the colormapped heatmap over leaf pixels and darken the background
pub fn composite_overlay(
    image: &RgbImage,
    heatmap: &ScalarField,
    mask: &LeafMask,
    params: &OverlayParams,
) -> RgbImage {
    let alpha = params.alpha;
    let tint = params.background_tint;
    let values = heatmap.values();
    let mut out = image.clone();

    let buffer: &mut [u8] = &mut out;
    buffer.par_chunks_mut(3).enumerate().for_each(|(i, pixel)| {
        let (r, g, b) = (pixel[0], pixel[1], pixel[2]);
        let blended = if mask.is_leaf(i) {
            let color = value_to_jet_color(values[i]);
            let blend = |orig: u8, c: u8| to_byte(orig as f32 * (1.0 - alpha) + c as f32 * alpha);
            [blend(r, color[0]), blend(g, color[1]), blend(b, color[2])]
        } else {
            [
                to_byte(r as f32 * tint[0]),
                to_byte(g as f32 * tint[1]),
                to_byte(b as f32 * tint[2]),
            ]
        };
        pixel.copy_from_slice(&blended);
    });

    out
}
