use image::{GrayImage, Luma, Rgb};
use imageproc::{distance_transform::Norm, map::map_colors};
use crate::{traits::WallDetector, types::RasterImage};

// Rec.601 luma weights in 14-bit fixed point
const LUMA_R: u32 = 4899;
const LUMA_G: u32 = 9617;
const LUMA_B: u32 = 1868;
const LUMA_SHIFT: u32 = 14;

/// Single-channel Rec.601 luminance of the tile; alpha is ignored
pub fn to_grayscale(image: &RasterImage) -> GrayImage {
    map_colors(&image.to_rgb8(), |Rgb([r, g, b])| {
        let weighted = u32::from(r) * LUMA_R + u32::from(g) * LUMA_G + u32::from(b) * LUMA_B;
        // The weights sum to 1 << LUMA_SHIFT, so the result fits in a u8
        Luma([((weighted + (1 << (LUMA_SHIFT - 1))) >> LUMA_SHIFT) as u8])
    })
}

/// Canny edge detector with hysteresis thresholds
#[derive(Debug, Clone)]
pub struct CannyWallDetector {
    pub low_threshold: f32,
    pub high_threshold: f32,
}

impl Default for CannyWallDetector {
    fn default() -> Self {
        Self {
            low_threshold: 50.0,
            high_threshold: 150.0,
        }
    }
}

impl CannyWallDetector {
    /// Thresholds given in the wrong order are swapped
    pub fn new(low_threshold: f32, high_threshold: f32) -> Self {
        Self {
            low_threshold: low_threshold.min(high_threshold),
            high_threshold: low_threshold.max(high_threshold),
        }
    }
}

impl WallDetector for CannyWallDetector {
    fn detect_walls(&self, gray: &GrayImage) -> GrayImage {
        // canny asserts high >= low; fields are public and may be unordered
        let low = self.low_threshold.min(self.high_threshold);
        let high = self.low_threshold.max(self.high_threshold);
        imageproc::edges::canny(gray, low, high)
    }
}

/// Marks every pixel at or below `threshold` as a wall
#[derive(Debug, Clone)]
pub struct ThresholdWallDetector {
    pub threshold: u8,
}

impl Default for ThresholdWallDetector {
    fn default() -> Self {
        Self { threshold: 128 }
    }
}

impl WallDetector for ThresholdWallDetector {
    fn detect_walls(&self, gray: &GrayImage) -> GrayImage {
        let mut walls = imageproc::contrast::threshold(gray, self.threshold);
        image::imageops::invert(&mut walls);
        walls
    }
}

/// Morphological dilation with a square structuring element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dilation {
    /// Odd edge length of the structuring element
    pub kernel_size: u8,
    pub iterations: u8,
}

impl Default for Dilation {
    fn default() -> Self {
        Self {
            kernel_size: 3,
            iterations: 1,
        }
    }
}

impl Dilation {
    /// Chebyshev reach of the combined passes in pixels.
    ///
    /// `n` passes of a `k`x`k` square equal one pass of radius `n * (k / 2)`.
    pub fn radius(&self) -> u8 {
        let radius = u16::from(self.kernel_size / 2) * u16::from(self.iterations);
        u8::try_from(radius).unwrap_or(u8::MAX)
    }

    pub fn apply(&self, walls: &GrayImage) -> GrayImage {
        match self.radius() {
            0 => walls.clone(),
            radius => imageproc::morphology::dilate(walls, Norm::LInf, radius),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, RgbImage, Rgba, RgbaImage};

    #[test]
    fn test_grayscale_keeps_dimensions() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(12, 7, Rgb([255, 0, 0])));
        let gray = to_grayscale(&image);
        assert_eq!(gray.dimensions(), (12, 7));
        // Red is darker than white in luminance
        assert!(gray.get_pixel(0, 0)[0] < 128);
    }

    #[test]
    fn test_grayscale_uses_rec601_weights() {
        let mut image = RgbaImage::from_pixel(4, 1, Rgba([255, 255, 255, 0]));
        image.put_pixel(1, 0, Rgba([255, 0, 0, 255]));
        image.put_pixel(2, 0, Rgba([0, 255, 0, 255]));
        image.put_pixel(3, 0, Rgba([0, 0, 255, 255]));

        let gray = to_grayscale(&DynamicImage::ImageRgba8(image));
        let levels: Vec<u8> = gray.pixels().map(|p| p[0]).collect();
        assert_eq!(levels, vec![255, 76, 150, 29]);
    }

    #[test]
    fn test_threshold_walls_mark_dark_pixels() {
        let mut gray = GrayImage::from_pixel(10, 10, Luma([255u8]));
        gray.put_pixel(4, 4, Luma([20u8]));

        let walls = ThresholdWallDetector { threshold: 100 }.detect_walls(&gray);
        assert_ne!(walls.get_pixel(4, 4)[0], 0);
        assert_eq!(walls.get_pixel(5, 4)[0], 0);
    }

    #[test]
    fn test_canny_finds_no_walls_in_flat_image() {
        let gray = GrayImage::from_pixel(32, 32, Luma([200u8]));
        let walls = CannyWallDetector::default().detect_walls(&gray);
        assert!(walls.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn test_canny_finds_step_edge() {
        let gray = GrayImage::from_fn(32, 32, |x, _| if x < 16 { Luma([0u8]) } else { Luma([255u8]) });
        let walls = CannyWallDetector::default().detect_walls(&gray);
        let row: Vec<u32> = (0..32).filter(|&x| walls.get_pixel(x, 16)[0] != 0).collect();
        assert!(!row.is_empty(), "Expected an edge on the step");
        assert!(row.iter().all(|&x| (13..=18).contains(&x)), "Edge far from the step: {row:?}");
    }

    #[test]
    fn test_canny_tolerates_swapped_thresholds() {
        let detector = CannyWallDetector::new(150.0, 50.0);
        assert_eq!((detector.low_threshold, detector.high_threshold), (50.0, 150.0));

        let gray = GrayImage::from_fn(32, 32, |x, _| if x < 16 { Luma([0u8]) } else { Luma([255u8]) });
        let unordered = CannyWallDetector { low_threshold: 150.0, high_threshold: 50.0 };
        assert_eq!(unordered.detect_walls(&gray), CannyWallDetector::default().detect_walls(&gray));
    }

    #[test]
    fn test_dilation_grows_single_pixel() {
        let mut walls = GrayImage::new(9, 9);
        walls.put_pixel(4, 4, Luma([255u8]));

        let dilated = Dilation::default().apply(&walls);
        let count = dilated.pixels().filter(|p| p[0] != 0).count();
        assert_eq!(count, 9);
        assert_ne!(dilated.get_pixel(3, 3)[0], 0);
        assert_eq!(dilated.get_pixel(2, 4)[0], 0);

        let wider = Dilation { kernel_size: 3, iterations: 2 }.apply(&walls);
        assert_eq!(wider.pixels().filter(|p| p[0] != 0).count(), 25);
    }

    #[test]
    fn test_zero_iterations_is_identity() {
        let mut walls = GrayImage::new(5, 5);
        walls.put_pixel(2, 2, Luma([255u8]));
        let same = Dilation { kernel_size: 3, iterations: 0 }.apply(&walls);
        assert_eq!(same, walls);
    }
}
