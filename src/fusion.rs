use crate::color_space::{within, Hsv, PixelColors};
use crate::config::{FusionParams, SuppressionParams};
use crate::field::{LeafMask, ScalarField};
use crate::signals::SignalMaps;

/// Weighted mean of the four signal maps over leaf pixels
pub fn fuse_signals(signals: &SignalMaps, mask: &LeafMask, params: &FusionParams) -> ScalarField {
    let total = params.total_weight();
    let (width, height) = signals.deviation.dimensions();
    let (d, s, c, k) = (
        signals.deviation.values(),
        signals.spot.values(),
        signals.contrast.values(),
        signals.cluster.values(),
    );

    ScalarField::from_index_fn(width, height, |i| {
        if !mask.is_leaf(i) {
            return 0.0;
        }
        let sum = d[i] * params.deviation_weight
            + s[i] * params.spot_weight
            + c[i] * params.contrast_weight
            + k[i] * params.cluster_weight;
        sum / total
    })
}

/// Multiplier that damps colors known to fire without being disease
pub fn suppression_factor(hsv: Hsv, params: &SuppressionParams) -> f32 {
    let mut factor = 1.0;

    // Dark, unsaturated shadow
    if hsv.v < params.shadow_max_value && hsv.s < params.shadow_max_saturation {
        factor *= params.shadow_factor;
    }

    // Strong healthy green
    if within(hsv.h, params.green_hue)
        && hsv.s > params.green_min_saturation
        && hsv.v > params.green_min_value
    {
        factor *= params.green_factor;
    }

    // Specular glare
    if hsv.v > params.glare_min_value && hsv.s < params.glare_max_saturation {
        factor *= params.glare_factor;
    }

    factor
}

/// Apply [`suppression_factor`] to every leaf pixel of `fused`
pub fn suppress_false_positives(
    fused: &ScalarField,
    colors: &PixelColors,
    mask: &LeafMask,
    params: &SuppressionParams,
) -> ScalarField {
    let values = fused.values();
    ScalarField::from_index_fn(fused.width(), fused.height(), |i| {
        if mask.is_leaf(i) {
            values[i] * suppression_factor(colors.hsv[i], params)
        } else {
            values[i]
        }
    })
}
