//! Per-pixel RGB -> HSV and RGB -> CIE L*a*b* conversions

use image::RgbImage;
use rayon::prelude::*;

/// Hue in degrees [0,360), saturation and value in [0,1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsv {
    pub h: f32,
    pub s: f32,
    pub v: f32,
}

/// CIE L*a*b* under D65. L in [0,100], a/b roughly [-100,100].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lab {
    pub l: f32,
    pub a: f32,
    pub b: f32,
}

// D65 reference white
const XN: f32 = 0.95047;
const YN: f32 = 1.0;
const ZN: f32 = 1.08883;

const LAB_EPSILON: f32 = 0.008856;

pub fn rgb_to_hsv(rgb: [u8; 3]) -> Hsv {
    let r = rgb[0] as f32 / 255.0;
    let g = rgb[1] as f32 / 255.0;
    let b = rgb[2] as f32 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let s = if max == 0.0 { 0.0 } else { delta / max };

    // Undefined hue for grays resolves to 0
    let h = if delta == 0.0 {
        0.0
    } else if max == r {
        let sector = (g - b) / delta + if g < b { 6.0 } else { 0.0 };
        sector * 60.0
    } else if max == g {
        ((b - r) / delta + 2.0) * 60.0
    } else {
        ((r - g) / delta + 4.0) * 60.0
    };

    Hsv { h, s, v: max }
}

#[inline]
fn srgb_to_linear(c: f32) -> f32 {
    if c > 0.04045 {
        ((c + 0.055) / 1.055).powf(2.4)
    } else {
        c / 12.92
    }
}

#[inline]
fn lab_f(t: f32) -> f32 {
    if t > LAB_EPSILON {
        t.cbrt()
    } else {
        7.787 * t + 16.0 / 116.0
    }
}

pub fn rgb_to_lab(rgb: [u8; 3]) -> Lab {
    let r = srgb_to_linear(rgb[0] as f32 / 255.0);
    let g = srgb_to_linear(rgb[1] as f32 / 255.0);
    let b = srgb_to_linear(rgb[2] as f32 / 255.0);

    let x = (r * 0.4124 + g * 0.3576 + b * 0.1805) / XN;
    let y = (r * 0.2126 + g * 0.7152 + b * 0.0722) / YN;
    let z = (r * 0.0193 + g * 0.1192 + b * 0.9505) / ZN;

    let fx = lab_f(x);
    let fy = lab_f(y);
    let fz = lab_f(z);

    Lab {
        l: 116.0 * fy - 16.0,
        a: 500.0 * (fx - fy),
        b: 200.0 * (fy - fz),
    }
}

/// Inclusive range test used by the hue/value band rules
#[inline]
pub fn within(v: f32, range: [f32; 2]) -> bool {
    v >= range[0] && v <= range[1]
}

/// Exclusive range test
#[inline]
pub fn strictly_within(v: f32, range: [f32; 2]) -> bool {
    v > range[0] && v < range[1]
}

/// Rec. 601 luma in [0,1]
#[inline]
pub fn luma(rgb: [u8; 3]) -> f32 {
    (rgb[0] as f32 * 0.299 + rgb[1] as f32 * 0.587 + rgb[2] as f32 * 0.114) / 255.0
}

/// RGB, HSV and Lab of every pixel, converted once per run
#[derive(Debug, Clone)]
pub struct PixelColors {
    width: u32,
    height: u32,
    pub rgb: Vec<[u8; 3]>,
    pub hsv: Vec<Hsv>,
    pub lab: Vec<Lab>,
}

impl PixelColors {
    pub fn from_image(image: &RgbImage) -> Self {
        let (width, height) = image.dimensions();
        let rgb: Vec<[u8; 3]> = image.pixels().map(|p| p.0).collect();
        let hsv = rgb.par_iter().map(|p| rgb_to_hsv(*p)).collect();
        let lab = rgb.par_iter().map(|p| rgb_to_lab(*p)).collect();
        Self { width, height, rgb, hsv, lab }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.rgb.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rgb.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn hsv_primaries() {
        let red = rgb_to_hsv([255, 0, 0]);
        assert_approx_eq!(red.h, 0.0);
        assert_approx_eq!(red.s, 1.0);
        assert_approx_eq!(red.v, 1.0);

        let green = rgb_to_hsv([0, 255, 0]);
        assert_approx_eq!(green.h, 120.0, 1e-3);

        let blue = rgb_to_hsv([0, 0, 255]);
        assert_approx_eq!(blue.h, 240.0, 1e-3);

        let magenta = rgb_to_hsv([255, 0, 128]);
        assert!(magenta.h > 300.0 && magenta.h < 360.0);
    }

    #[test]
    fn hsv_gray_has_zero_hue_and_saturation() {
        let gray = rgb_to_hsv([128, 128, 128]);
        assert_eq!(gray.h, 0.0);
        assert_eq!(gray.s, 0.0);
        assert_approx_eq!(gray.v, 128.0 / 255.0);

        let black = rgb_to_hsv([0, 0, 0]);
        assert_eq!(black.s, 0.0);
        assert_eq!(black.v, 0.0);
    }

    #[test]
    fn lab_reference_colors() {
        let white = rgb_to_lab([255, 255, 255]);
        assert_approx_eq!(white.l, 100.0, 0.05);
        assert_approx_eq!(white.a, 0.0, 0.05);
        assert_approx_eq!(white.b, 0.0, 0.05);

        let black = rgb_to_lab([0, 0, 0]);
        assert_approx_eq!(black.l, 0.0, 0.05);

        // sRGB red is roughly L=53, a=80, b=67
        let red = rgb_to_lab([255, 0, 0]);
        assert_approx_eq!(red.l, 53.2, 0.5);
        assert_approx_eq!(red.a, 80.1, 0.5);
        assert_approx_eq!(red.b, 67.2, 0.5);
    }

    #[test]
    fn leaf_green_has_negative_a() {
        let lab = rgb_to_lab([60, 140, 50]);
        assert!(lab.a < -20.0);
        assert!(lab.b > 20.0);
    }

    #[test]
    fn pixel_colors_match_pointwise() {
        let img = RgbImage::from_fn(3, 2, |x, y| image::Rgb([(x * 40) as u8, (y * 90) as u8, 30]));
        let colors = PixelColors::from_image(&img);
        assert_eq!(colors.len(), 6);
        assert_eq!(colors.hsv[4], rgb_to_hsv(img.get_pixel(1, 1).0));
        assert_eq!(colors.lab[5], rgb_to_lab(img.get_pixel(2, 1).0));
    }
}
