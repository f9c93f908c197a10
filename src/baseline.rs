//! Statistical profile of the healthy green tissue of the current leaf

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::color_space::{within, PixelColors};
use crate::config::BaselineParams;
use crate::field::LeafMask;

/// Spread below which a sample channel is treated as constant
const MIN_STD: f32 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelStats {
    pub mean: f32,
    pub std: f32,
}

impl ChannelStats {
    pub const fn new(mean: f32, std: f32) -> Self {
        Self { mean, std }
    }

    /// Absolute z-score of `v`
    #[inline]
    pub fn z(&self, v: f32) -> f32 {
        (v - self.mean).abs() / self.std
    }

    /// Population mean and standard deviation (divides by n)
    fn from_samples(samples: &[f32]) -> Self {
        let n = samples.len() as f64;
        let mean = samples.iter().map(|v| *v as f64).sum::<f64>() / n;
        let var = samples
            .iter()
            .map(|v| (*v as f64 - mean).powi(2))
            .sum::<f64>()
            / n;
        Self::new(mean as f32, var.sqrt() as f32)
    }

    fn or_fallback_std(self, fallback: ChannelStats) -> Self {
        if self.std < MIN_STD {
            Self::new(self.mean, fallback.std)
        } else {
            self
        }
    }
}

/// Means and standard deviations of H, S, V, L*, a*, b* over healthy tissue
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthyBaseline {
    pub hue: ChannelStats,
    pub saturation: ChannelStats,
    pub value: ChannelStats,
    pub lightness: ChannelStats,
    pub a: ChannelStats,
    pub b: ChannelStats,
}

impl HealthyBaseline {
    pub fn has_positive_spread(&self) -> bool {
        [
            self.hue,
            self.saturation,
            self.value,
            self.lightness,
            self.a,
            self.b,
        ]
        .iter()
        .all(|c| c.std > 0.0)
    }
}

/// Outcome of baselining, so callers can tell measured from assumed profiles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaselineEstimate {
    pub baseline: HealthyBaseline,
    pub sample_count: usize,
    pub used_fallback: bool,
}

/// Estimate the healthy-tissue profile from plausibly green leaf pixels.
///
/// Fewer than `min_samples` qualifying pixels returns the fallback prior.
/// A constant channel keeps its measured mean but takes the prior's spread.
pub fn estimate_baseline(
    colors: &PixelColors,
    mask: &LeafMask,
    params: &BaselineParams,
) -> BaselineEstimate {
    let samples: Vec<usize> = (0..colors.len())
        .filter(|&i| mask.is_leaf(i))
        .filter(|&i| {
            let hsv = colors.hsv[i];
            within(hsv.h, params.hue)
                && hsv.s >= params.min_saturation
                && within(hsv.v, params.value_range)
        })
        .collect();

    if samples.len() < params.min_samples {
        warn!(
            "Only {} healthy tissue samples (need {}), using fallback baseline",
            samples.len(),
            params.min_samples
        );
        return BaselineEstimate {
            baseline: params.fallback,
            sample_count: samples.len(),
            used_fallback: true,
        };
    }

    let channel = |extract: &dyn Fn(usize) -> f32| -> ChannelStats {
        let values: Vec<f32> = samples.iter().map(|&i| extract(i)).collect();
        ChannelStats::from_samples(&values)
    };

    let fb = &params.fallback;
    let baseline = HealthyBaseline {
        hue: channel(&|i| colors.hsv[i].h).or_fallback_std(fb.hue),
        saturation: channel(&|i| colors.hsv[i].s).or_fallback_std(fb.saturation),
        value: channel(&|i| colors.hsv[i].v).or_fallback_std(fb.value),
        lightness: channel(&|i| colors.lab[i].l).or_fallback_std(fb.lightness),
        a: channel(&|i| colors.lab[i].a).or_fallback_std(fb.a),
        b: channel(&|i| colors.lab[i].b).or_fallback_std(fb.b),
    };

    debug!(
        "Healthy baseline from {} samples: H {:.1}±{:.1}, S {:.2}±{:.2}, V {:.2}±{:.2}, L {:.1}±{:.1}, a {:.1}±{:.1}, b {:.1}±{:.1}",
        samples.len(),
        baseline.hue.mean, baseline.hue.std,
        baseline.saturation.mean, baseline.saturation.std,
        baseline.value.mean, baseline.value.std,
        baseline.lightness.mean, baseline.lightness.std,
        baseline.a.mean, baseline.a.std,
        baseline.b.mean, baseline.b.std,
    );

    BaselineEstimate {
        baseline,
        sample_count: samples.len(),
        used_fallback: false,
    }
}
