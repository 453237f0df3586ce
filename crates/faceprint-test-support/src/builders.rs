//! Synthetic image builders for testing.

use faceprint_core::domain::ImageInfo;
use image::{DynamicImage, Rgb, RgbImage};

/// Builder for creating synthetic test images.
///
/// Provides convenience methods for generating face-crop-sized images
/// with known pixel content (solid colors, gradients, patterns).
pub struct SyntheticImageBuilder;

impl SyntheticImageBuilder {
    /// Creates a uniform RGB image.
    #[must_use]
    pub fn rgb_uniform(width: u32, height: u32, r: u8, g: u8, b: u8) -> ImageInfo {
        let img = RgbImage::from_fn(width, height, |_, _| Rgb([r, g, b]));
        ImageInfo::new("synthetic://rgb_uniform", DynamicImage::ImageRgb8(img))
    }

    /// Creates a solid black image (every channel 0).
    #[must_use]
    pub fn solid_black(width: u32, height: u32) -> ImageInfo {
        Self::rgb_uniform(width, height, 0, 0, 0)
    }

    /// Creates a solid white image (every channel 255).
    #[must_use]
    pub fn solid_white(width: u32, height: u32) -> ImageInfo {
        Self::rgb_uniform(width, height, 255, 255, 255)
    }

    /// Creates a mid-gray image.
    #[must_use]
    pub fn mid_gray(width: u32, height: u32) -> ImageInfo {
        Self::rgb_uniform(width, height, 128, 128, 128)
    }

    /// Creates a horizontal luminance gradient.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn horizontal_gradient(width: u32, height: u32) -> ImageInfo {
        let img = RgbImage::from_fn(width, height, |x, _| {
            let val = ((u32::from(u8::MAX) * x) / width.max(1)) as u8;
            Rgb([val, val, val])
        });
        ImageInfo::new(
            "synthetic://horizontal_gradient",
            DynamicImage::ImageRgb8(img),
        )
    }

    /// Creates a high-contrast checkerboard pattern.
    #[must_use]
    pub fn checkerboard(width: u32, height: u32, cell_size: u32) -> ImageInfo {
        let img = RgbImage::from_fn(width, height, |x, y| {
            if (x / cell_size + y / cell_size) % 2 == 0 {
                Rgb([255, 255, 255])
            } else {
                Rgb([0, 0, 0])
            }
        });
        ImageInfo::new("synthetic://checkerboard", DynamicImage::ImageRgb8(img))
    }

    /// Creates a 1x1 pixel image (edge case).
    #[must_use]
    pub fn single_pixel(r: u8, g: u8, b: u8) -> ImageInfo {
        Self::rgb_uniform(1, 1, r, g, b)
    }

    /// Returns a standard face-crop-sized test image (160x160 gradient).
    #[must_use]
    pub fn face_crop() -> ImageInfo {
        Self::horizontal_gradient(160, 160)
    }
}
