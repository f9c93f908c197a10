//! Separable Gaussian smoothing with edge renormalisation

use rayon::prelude::*;

use crate::config::SmoothingParams;
use crate::field::ScalarField;

/// Normalised 1-D Gaussian of length `2 * radius + 1`, sigma = radius / `sigma_divisor`
pub fn gaussian_kernel(radius: usize, sigma_divisor: f32) -> Vec<f32> {
    if radius == 0 {
        return vec![1.0];
    }
    let sigma = radius as f32 / sigma_divisor;
    let two_sigma_sq = 2.0 * sigma * sigma;
    let mut kernel: Vec<f32> = (0..=2 * radius)
        .map(|i| {
            let x = i as f32 - radius as f32;
            (-(x * x) / two_sigma_sq).exp()
        })
        .collect();
    let sum: f32 = kernel.iter().sum();
    for k in kernel.iter_mut() {
        *k /= sum;
    }
    kernel
}

/// One 1-D pass. Taps falling outside the raster are dropped and the
/// remaining weights renormalised, so borders do not darken.
fn convolve_1d(input: &[f32], output: &mut [f32], kernel: &[f32]) {
    let len = input.len();
    let half = kernel.len() / 2;
    for pos in 0..len {
        let mut sum = 0.0;
        let mut weight = 0.0;
        let start = pos.saturating_sub(half);
        let end = (pos + half).min(len - 1);
        for n in start..=end {
            let k = kernel[n + half - pos];
            sum += input[n] * k;
            weight += k;
        }
        output[pos] = if weight > 0.0 { sum / weight } else { 0.0 };
    }
}

/// Horizontal then vertical Gaussian blur at the given radius
pub fn gaussian_blur(field: &ScalarField, radius: usize, sigma_divisor: f32) -> ScalarField {
    let (w, h) = field.dimensions();
    let (width, height) = (w as usize, h as usize);
    if field.is_empty() || radius == 0 {
        return field.clone();
    }
    let kernel = gaussian_kernel(radius, sigma_divisor);

    let mut horizontal = vec![0.0f32; field.len()];
    horizontal
        .par_chunks_mut(width)
        .zip(field.values().par_chunks(width))
        .for_each(|(out_row, in_row)| convolve_1d(in_row, out_row, &kernel));

    // Vertical pass over columns, transposed so each column is contiguous
    let mut columns = vec![0.0f32; field.len()];
    columns
        .par_chunks_mut(height)
        .enumerate()
        .for_each(|(x, out_col)| {
            let in_col: Vec<f32> = (0..height).map(|y| horizontal[y * width + x]).collect();
            convolve_1d(&in_col, out_col, &kernel);
        });

    ScalarField::from_index_fn(w, h, |i| {
        let (x, y) = (i % width, i / width);
        columns[x * height + y]
    })
}

/// Blend of blurs at several radii, favouring medium-sized blobs
pub fn multi_scale_smooth(field: &ScalarField, params: &SmoothingParams) -> ScalarField {
    let blurred: Vec<ScalarField> = params.radii[..]
        .par_iter()
        .map(|r| gaussian_blur(field, *r, params.sigma_divisor))
        .collect();

    ScalarField::from_index_fn(field.width(), field.height(), |i| {
        blurred
            .iter()
            .zip(params.blend.iter())
            .map(|(b, weight)| b.values()[i] * weight)
            .sum()
    })
}
