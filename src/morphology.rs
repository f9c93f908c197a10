//! Binary morphology on leaf masks.
//!
//! Masks are `GrayImage`s where any non-zero pixel is foreground. The
//! structuring element is the `(2r+1) x (2r+1)` square (L-infinity ball);
//! pixels outside the image never count as background, so a full mask
//! survives erosion intact.

use image::GrayImage;
use imageproc::distance_transform::Norm;
use imageproc::morphology::{dilate, erode};

/// Minimum over the square window
fn erode_square(mask: &GrayImage, radius: u8) -> GrayImage {
    if radius == 0 {
        return mask.clone();
    }
    erode(mask, Norm::LInf, radius)
}

/// Maximum over the square window
fn dilate_square(mask: &GrayImage, radius: u8) -> GrayImage {
    if radius == 0 {
        return mask.clone();
    }
    dilate(mask, Norm::LInf, radius)
}

/// Erode then dilate: removes foreground specks smaller than the window
pub fn apply_opening(mask: &GrayImage, radius: u8) -> GrayImage {
    dilate_square(&erode_square(mask, radius), radius)
}

/// Dilate then erode: fills background gaps smaller than the window
pub fn apply_closing(mask: &GrayImage, radius: u8) -> GrayImage {
    erode_square(&dilate_square(mask, radius), radius)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn square_mask(size: u32, x0: u32, y0: u32, side: u32) -> GrayImage {
        GrayImage::from_fn(size, size, |x, y| {
            if x >= x0 && x < x0 + side && y >= y0 && y < y0 + side {
                Luma([255])
            } else {
                Luma([0])
            }
        })
    }

    fn count(mask: &GrayImage) -> usize {
        mask.pixels().filter(|p| p[0] > 0).count()
    }

    #[test]
    fn opening_removes_speck() {
        let mut mask = square_mask(40, 10, 10, 20);
        mask.put_pixel(2, 2, Luma([255]));
        let opened = apply_opening(&mask, 2);
        assert_eq!(opened.get_pixel(2, 2)[0], 0);
        assert_eq!(count(&opened), 400);
    }

    #[test]
    fn closing_fills_small_hole() {
        let mut mask = square_mask(40, 5, 5, 30);
        mask.put_pixel(20, 20, Luma([0]));
        mask.put_pixel(21, 20, Luma([0]));
        let closed = apply_closing(&mask, 3);
        assert!(closed.get_pixel(20, 20)[0] > 0);
        assert!(closed.get_pixel(21, 20)[0] > 0);
    }

    #[test]
    fn full_mask_survives_erosion() {
        let mask = GrayImage::from_pixel(16, 12, Luma([255]));
        let eroded = erode_square(&mask, 3);
        assert_eq!(count(&eroded), 16 * 12);
    }

    #[test]
    fn dilation_grows_square_window() {
        let mask = square_mask(21, 10, 10, 1);
        let grown = dilate_square(&mask, 2);
        assert_eq!(count(&grown), 25);
        assert!(grown.get_pixel(8, 8)[0] > 0);
        assert_eq!(grown.get_pixel(7, 10)[0], 0);
    }
}
