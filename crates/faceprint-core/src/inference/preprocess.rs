//! Pixel normalization for the embedding network.
//!
//! The model's weights assume FaceNet-style preprocessing: a 160x160
//! RGB image with every 8-bit channel mapped linearly into [-1, 1].
//! The transform is deterministic, so the same image always yields a
//! byte-identical buffer.

#![allow(clippy::cast_possible_truncation)]

use anyhow::{Context, Result};
use candle_core::{Device, Tensor};
use image::DynamicImage;

/// Side length of the square model input.
pub const INPUT_SIZE: usize = 160;

/// Size in bytes of one normalized input buffer (f32 RGB).
pub const INPUT_BUFFER_BYTES: usize = 4 * INPUT_SIZE * INPUT_SIZE * 3;

/// Resize filter used when scaling to the model input.
///
/// Triangle (bilinear) matches the smooth scaling of the runtime the
/// weights were trained against.
const RESIZE_FILTER: image::imageops::FilterType = image::imageops::FilterType::Triangle;

/// Resizes an image to [`INPUT_SIZE`] square and normalizes it into an
/// interleaved RGB f32 buffer in row-major order.
///
/// Channel values are mapped via `v / 127.5 - 1.0`, so 0 becomes
/// exactly -1.0 and 255 exactly 1.0. Output length is always
/// `INPUT_SIZE * INPUT_SIZE * 3`.
#[must_use]
pub fn normalize_pixels(image: &DynamicImage) -> Vec<f32> {
    let resized = image.resize_exact(INPUT_SIZE as u32, INPUT_SIZE as u32, RESIZE_FILTER);
    let rgb = resized.to_rgb8();

    rgb.pixels()
        .flat_map(|p| {
            [
                (f32::from(p[0]) / 127.5) - 1.0,
                (f32::from(p[1]) / 127.5) - 1.0,
                (f32::from(p[2]) / 127.5) - 1.0,
            ]
        })
        .collect()
}

/// Packs a normalized pixel buffer into a `(1, 3, 160, 160)` NCHW tensor.
///
/// # Errors
///
/// Returns an error if the buffer has the wrong length or tensor
/// creation fails on the target device.
pub fn input_tensor(pixels: Vec<f32>, device: &Device) -> Result<Tensor> {
    let tensor = Tensor::from_vec(pixels, (1, INPUT_SIZE, INPUT_SIZE, 3), device)
        .context("Failed to create input tensor")?;
    tensor
        .permute((0, 3, 1, 2))
        .context("Failed to transpose input to NCHW")
}
