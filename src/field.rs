//! Per-pixel scalar grids shared by every pipeline stage.
//!
//! Each stage allocates a fresh [`ScalarField`]; nothing downstream mutates
//! a field it was handed.

use image::{GrayImage, Luma};
use rayon::prelude::*;

use crate::errors::{HeatmapError, Result};

/// A `width x height` grid of `f32` values, row-major
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarField {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl ScalarField {
    pub fn zeros(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; (width as usize) * (height as usize)],
        }
    }

    pub fn from_vec(width: u32, height: u32, data: Vec<f32>) -> Result<Self> {
        let expected = (width as usize) * (height as usize);
        if data.len() != expected {
            return Err(HeatmapError::DimensionMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { width, height, data })
    }

    /// Build a field by evaluating `f` for every pixel index in parallel
    pub fn from_index_fn<F>(width: u32, height: u32, f: F) -> Self
    where
        F: Fn(usize) -> f32 + Sync + Send,
    {
        let len = (width as usize) * (height as usize);
        let data = (0..len).into_par_iter().map(f).collect();
        Self { width, height, data }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn values(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.data[(y as usize) * (self.width as usize) + x as usize]
    }

    /// Render to 8-bit grayscale, clamping to [0,1] first
    pub fn to_gray_image(&self) -> GrayImage {
        GrayImage::from_fn(self.width, self.height, |x, y| {
            let v = self.get(x, y).clamp(0.0, 1.0);
            Luma([(v * 255.0).round() as u8])
        })
    }
}

/// Binary leaf/background mask. Values are exactly 0.0 or 1.0.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafMask {
    field: ScalarField,
    leaf_count: usize,
}

impl LeafMask {
    /// Threshold a grayscale mask: any non-zero pixel is leaf
    pub fn from_gray(mask: &GrayImage) -> Self {
        let (width, height) = mask.dimensions();
        let data: Vec<f32> = mask
            .pixels()
            .map(|p| if p[0] > 0 { 1.0 } else { 0.0 })
            .collect();
        let leaf_count = data.iter().filter(|v| **v > 0.5).count();
        Self {
            field: ScalarField { width, height, data },
            leaf_count,
        }
    }

    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            field: ScalarField::zeros(width, height),
            leaf_count: 0,
        }
    }

    #[inline]
    pub fn is_leaf(&self, idx: usize) -> bool {
        self.field.data[idx] > 0.5
    }

    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    pub fn has_leaf(&self) -> bool {
        self.leaf_count > 0
    }

    /// Fraction of the raster covered by leaf pixels
    pub fn coverage(&self) -> f64 {
        if self.field.is_empty() {
            0.0
        } else {
            self.leaf_count as f64 / self.field.len() as f64
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.field.dimensions()
    }

    pub fn len(&self) -> usize {
        self.field.len()
    }

    pub fn is_empty(&self) -> bool {
        self.field.is_empty()
    }

    pub fn as_field(&self) -> &ScalarField {
        &self.field
    }

    /// Values of `field` at leaf pixels, in raster order
    pub fn leaf_values(&self, field: &ScalarField) -> Vec<f32> {
        field
            .values()
            .iter()
            .enumerate()
            .filter(|(i, _)| self.is_leaf(*i))
            .map(|(_, v)| *v)
            .collect()
    }
}
