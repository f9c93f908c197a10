use image::RgbImage;

/// Working dimensions for an image whose longest side must not exceed `max_size`.
///
/// Aspect ratio is preserved and images are never upscaled.
pub fn working_dimensions(width: u32, height: u32, max_size: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (width, height);
    }
    let scale = (max_size as f64 / width as f64)
        .min(max_size as f64 / height as f64)
        .min(1.0);
    let w = ((width as f64 * scale).floor() as u32).max(1);
    let h = ((height as f64 * scale).floor() as u32).max(1);
    (w, h)
}

/// Downsample to the working resolution
pub fn resize_to_working(image: &RgbImage, max_size: u32) -> RgbImage {
    let (width, height) = image.dimensions();
    let (w, h) = working_dimensions(width, height, max_size);
    if (w, h) == (width, height) {
        return image.clone();
    }
    image::imageops::resize(image, w, h, image::imageops::FilterType::Triangle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_images_are_untouched() {
        assert_eq!(working_dimensions(320, 200, 600), (320, 200));
        assert_eq!(working_dimensions(600, 600, 600), (600, 600));
    }

    #[test]
    fn longest_side_is_clamped() {
        assert_eq!(working_dimensions(1200, 800, 600), (600, 400));
        assert_eq!(working_dimensions(1000, 3000, 600), (200, 600));
    }

    #[test]
    fn extreme_aspect_keeps_one_pixel() {
        assert_eq!(working_dimensions(6000, 2, 600), (600, 1));
    }

    #[test]
    fn resize_produces_working_size() {
        let img = RgbImage::new(900, 300);
        let resized = resize_to_working(&img, 600);
        assert_eq!(resized.dimensions(), (600, 200));
    }
}
