//! Extraction result and image carrier types.

use serde::{Deserialize, Serialize};

use super::Embedding;

/// Serializable result of embedding a single image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingRecord {
    /// Path to the source image.
    pub path: String,
    /// Timestamp of extraction (RFC 3339).
    pub timestamp: String,
    /// Source image dimensions before preprocessing.
    pub dimensions: ImageDimensions,
    /// The extracted embedding.
    pub embedding: Embedding,
}

/// Image dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl ImageDimensions {
    /// Creates dimensions from width and height.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// A decoded image plus where it came from.
#[derive(Debug, Clone)]
pub struct ImageInfo {
    /// Path to the image file (or a synthetic identifier in tests).
    pub path: String,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Decoded image data.
    pub image: image::DynamicImage,
}

impl ImageInfo {
    /// Creates an `ImageInfo`, deriving dimensions from the image.
    #[must_use]
    pub fn new(path: impl Into<String>, image: image::DynamicImage) -> Self {
        let width = image.width();
        let height = image.height();
        Self {
            path: path.into(),
            width,
            height,
            image,
        }
    }

    /// Returns the image as RGB8.
    #[must_use]
    pub fn to_rgb8(&self) -> image::RgbImage {
        self.image.to_rgb8()
    }

    /// Returns the image dimensions.
    #[must_use]
    pub const fn dimensions(&self) -> ImageDimensions {
        ImageDimensions::new(self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_info_derives_dimensions() {
        let img = image::DynamicImage::new_rgb8(64, 48);
        let info = ImageInfo::new("test.jpg", img);
        assert_eq!(info.width, 64);
        assert_eq!(info.height, 48);
        assert_eq!(info.dimensions(), ImageDimensions::new(64, 48));
    }
}
