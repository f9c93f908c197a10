use log::debug;

use crate::config::NormalizationParams;
use crate::field::{LeafMask, ScalarField};

/// Logistic contrast curve centred on `center`
#[inline]
pub fn logistic(x: f32, gain: f32, center: f32) -> f32 {
    1.0 / (1.0 + (-gain * (x - center)).exp())
}

/// Range of leaf values strictly above `floor`, if any
pub fn active_range(field: &ScalarField, mask: &LeafMask, floor: f32) -> Option<(f32, f32)> {
    field
        .values()
        .iter()
        .enumerate()
        .filter(|(i, v)| mask.is_leaf(*i) && **v > floor)
        .fold(None, |acc, (_, &v)| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Min/max rescale over active leaf pixels followed by a logistic boost.
///
/// A flat or empty range returns the field unchanged. Otherwise non-leaf
/// pixels come out as 0.
pub fn normalize(field: &ScalarField, mask: &LeafMask, params: &NormalizationParams) -> ScalarField {
    let (min, max) = match active_range(field, mask, params.min_activation) {
        Some((min, max)) if max > min => (min, max),
        _ => {
            debug!("Normalization range is flat, leaving activations unchanged");
            return field.clone();
        }
    };
    debug!("Normalizing activations over [{:.4}, {:.4}]", min, max);

    let span = max - min;
    let values = field.values();
    ScalarField::from_index_fn(field.width(), field.height(), |i| {
        if !mask.is_leaf(i) {
            return 0.0;
        }
        let x = (values[i] - min) / span;
        logistic(x, params.logistic_gain, params.logistic_center)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use image::{GrayImage, Luma};

    fn full_mask(w: u32, h: u32) -> LeafMask {
        LeafMask::from_gray(&GrayImage::from_pixel(w, h, Luma([255])))
    }

    #[test]
    fn rescales_and_boosts() {
        let field = ScalarField::from_vec(3, 1, vec![0.1, 0.3, 0.5]).unwrap();
        let out = normalize(&field, &full_mask(3, 1), &NormalizationParams::default());
        assert_approx_eq!(out.get(0, 0), logistic(0.0, 6.0, 0.5), 1e-6);
        assert_approx_eq!(out.get(1, 0), 0.5, 1e-6);
        assert_approx_eq!(out.get(2, 0), logistic(1.0, 6.0, 0.5), 1e-6);
    }

    #[test]
    fn flat_field_is_unchanged() {
        let field = ScalarField::from_vec(2, 2, vec![0.4; 4]).unwrap();
        let out = normalize(&field, &full_mask(2, 2), &NormalizationParams::default());
        assert_eq!(out, field);
    }

    #[test]
    fn dead_pixels_do_not_set_the_minimum() {
        let field = ScalarField::from_vec(3, 1, vec![0.0, 0.2, 0.6]).unwrap();
        assert_eq!(
            active_range(&field, &full_mask(3, 1), 0.02),
            Some((0.2, 0.6))
        );
    }

    #[test]
    fn background_is_zeroed() {
        let field = ScalarField::from_vec(3, 1, vec![0.9, 0.2, 0.6]).unwrap();
        let mut gray = GrayImage::from_pixel(3, 1, Luma([255]));
        gray.put_pixel(0, 0, Luma([0]));
        let out = normalize(&field, &LeafMask::from_gray(&gray), &NormalizationParams::default());
        assert_eq!(out.get(0, 0), 0.0);
        assert!(out.get(2, 0) > 0.9);
    }

    #[test]
    fn saturated_field_is_a_fixed_point() {
        let lo = logistic(0.0, 6.0, 0.5);
        let hi = logistic(1.0, 6.0, 0.5);
        let field = ScalarField::from_vec(4, 1, vec![lo, hi, hi, lo]).unwrap();
        let out = normalize(&field, &full_mask(4, 1), &NormalizationParams::default());
        for (a, b) in out.values().iter().zip(field.values()) {
            assert_approx_eq!(*a, *b, 1e-5);
        }
    }

    #[test]
    fn repeated_normalization_converges() {
        // 0.5 is an unstable fixed point of the boost, so it is left out
        let mask = full_mask(8, 1);
        let params = NormalizationParams::default();
        let mut field = ScalarField::from_vec(
            8,
            1,
            vec![0.1, 0.2, 0.3, 0.4, 0.6, 0.7, 0.8, 0.9],
        )
        .unwrap();
        let mut last_change = f32::MAX;
        for _ in 0..30 {
            let next = normalize(&field, &mask, &params);
            last_change = next
                .values()
                .iter()
                .zip(field.values())
                .map(|(a, b)| (a - b).abs())
                .fold(0.0, f32::max);
            assert!(next.values().iter().all(|v| (0.0..=1.0).contains(v)));
            field = next;
        }
        assert!(last_change < 1e-4, "still moving by {}", last_change);
    }
}
