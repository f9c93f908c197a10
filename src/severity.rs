//! Single-scalar summary of how much of the leaf the activation field implicates

use log::debug;
use rand::Rng;

use crate::config::SeverityParams;
use crate::diagnosis::Diagnosis;
use crate::field::{LeafMask, ScalarField};

/// Intermediate quantities of a severity estimate
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SeverityBreakdown {
    pub low_fraction: f64,
    pub mid_fraction: f64,
    pub high_fraction: f64,
    pub top_mean: f64,
    pub severity: f64,
}

/// Severity from leaf activations alone (no healthy special case).
///
/// Empty input yields severity 0.
pub fn severity_from_activations(activations: &[f32], params: &SeverityParams) -> SeverityBreakdown {
    if activations.is_empty() {
        return SeverityBreakdown::default();
    }

    let mut sorted = activations.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let n = sorted.len();
    let fraction_above = |t: f32| sorted.iter().filter(|v| **v > t).count() as f64 / n as f64;
    let [low_t, mid_t, high_t] = params.thresholds;
    let low_fraction = fraction_above(low_t);
    let mid_fraction = fraction_above(mid_t);
    let high_fraction = fraction_above(high_t);

    let top_start = ((n as f64 * (1.0 - params.top_fraction)).floor() as usize).min(n - 1);
    let top = &sorted[top_start..];
    let top_mean = top.iter().map(|v| *v as f64).sum::<f64>() / top.len() as f64;

    let [w_low, w_mid, w_high] = params.threshold_weights;
    let raw = low_fraction * w_low
        + mid_fraction * w_mid
        + high_fraction * w_high
        + top_mean * params.top_weight;
    let severity = raw
        .max(0.0)
        .powf(params.exponent)
        .clamp(params.clamp[0], params.clamp[1]);

    SeverityBreakdown {
        low_fraction,
        mid_fraction,
        high_fraction,
        top_mean,
        severity,
    }
}

/// Severity for a diagnosis.
///
/// A healthy leaf gets a small jittered value so the result never reads as
/// exactly disease-free. A diseased label with no leaf pixels gets 0.
pub fn score_severity<R: Rng>(
    heatmap: &ScalarField,
    mask: &LeafMask,
    diagnosis: Diagnosis,
    params: &SeverityParams,
    rng: &mut R,
) -> f64 {
    if diagnosis.is_healthy() {
        let [low, high] = params.healthy_range;
        return if high > low { rng.gen_range(low..high) } else { low };
    }

    let breakdown = severity_from_activations(&mask.leaf_values(heatmap), params);
    debug!(
        "Severity {:.3}: >low {:.3}, >mid {:.3}, >high {:.3}, top mean {:.3}",
        breakdown.severity,
        breakdown.low_fraction,
        breakdown.mid_fraction,
        breakdown.high_fraction,
        breakdown.top_mean
    );
    breakdown.severity
}

/// Fraction of leaf pixels whose activation exceeds `threshold`
pub fn lesion_coverage(heatmap: &ScalarField, mask: &LeafMask, threshold: f32) -> f64 {
    if !mask.has_leaf() {
        return 0.0;
    }
    let active = heatmap
        .values()
        .iter()
        .enumerate()
        .filter(|(i, v)| mask.is_leaf(*i) && **v > threshold)
        .count();
    active as f64 / mask.leaf_count() as f64
}
