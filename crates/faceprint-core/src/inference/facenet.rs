//! MobileFaceNet-style face embedding network.
//!
//! A depthwise-separable convolutional network that maps a 160x160 RGB
//! face crop to a 512-dimensional embedding. The pretrained weights are
//! exported with BatchNorm folded into the convolutional biases, so the
//! graph here is convolutions and PReLU activations only.

// Allow common ML code patterns
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]

use anyhow::{Context, Result};
use candle_core::{Device, Module, Tensor};
use candle_nn::{conv2d, prelu, Conv2d, Conv2dConfig, PReLU, VarBuilder};
use image::DynamicImage;

use super::preprocess::{self, INPUT_SIZE};
use crate::domain::Embedding;

/// Width of the stem and the first bottleneck stage.
const STEM_CHANNELS: usize = 64;

/// Channel count entering the embedding head.
const HEAD_CHANNELS: usize = 512;

/// Feature map side length before global pooling (160 / 16).
const FINAL_FEATURE_SIZE: usize = INPUT_SIZE / 16;

/// Bottleneck stages as `(in, out, expansion, stride)` tuples.
const BOTTLENECK_CONFIG: &[(usize, usize, usize, usize)] = &[
    (64, 64, 2, 2), // 80x80 -> 40x40
    (64, 64, 2, 1),
    (64, 64, 2, 1),
    (64, 64, 2, 1),
    (64, 64, 2, 1),
    (64, 128, 4, 2), // 40x40 -> 20x20
    (128, 128, 2, 1),
    (128, 128, 2, 1),
    (128, 128, 2, 1),
    (128, 128, 2, 1),
    (128, 128, 2, 1),
    (128, 128, 2, 1),
    (128, 128, 4, 2), // 20x20 -> 10x10
    (128, 128, 2, 1),
    (128, 128, 2, 1),
];

/// Convolution followed by PReLU, with BatchNorm folded into the bias.
struct ConvBlock {
    conv: Conv2d,
    prelu: PReLU,
}

impl ConvBlock {
    fn new(
        in_channels: usize,
        out_channels: usize,
        kernel_size: usize,
        stride: usize,
        padding: usize,
        groups: usize,
        vb: &VarBuilder,
    ) -> Result<Self> {
        let conv = conv2d(
            in_channels,
            out_channels,
            kernel_size,
            Conv2dConfig {
                stride,
                padding,
                groups,
                ..Conv2dConfig::default()
            },
            vb.pp("conv"),
        )?;
        let prelu = prelu(Some(out_channels), vb.pp("prelu"))?;
        Ok(Self { conv, prelu })
    }
}

impl Module for ConvBlock {
    fn forward(&self, x: &Tensor) -> candle_core::Result<Tensor> {
        self.prelu.forward(&self.conv.forward(x)?)
    }
}

/// Inverted-residual bottleneck: 1x1 expand, 3x3 depthwise, 1x1 linear
/// projection, with a skip connection when the shape is preserved.
struct Bottleneck {
    expand: ConvBlock,
    depthwise: ConvBlock,
    project: Conv2d,
    residual: bool,
}

impl Bottleneck {
    fn new(
        in_channels: usize,
        out_channels: usize,
        expansion: usize,
        stride: usize,
        vb: &VarBuilder,
    ) -> Result<Self> {
        let hidden = in_channels * expansion;

        let expand = ConvBlock::new(in_channels, hidden, 1, 1, 0, 1, &vb.pp("expand"))?;
        let depthwise = ConvBlock::new(hidden, hidden, 3, stride, 1, hidden, &vb.pp("depthwise"))?;

        // Linear projection, no activation
        let project = conv2d(
            hidden,
            out_channels,
            1,
            Conv2dConfig::default(),
            vb.pp("project"),
        )?;

        Ok(Self {
            expand,
            depthwise,
            project,
            residual: stride == 1 && in_channels == out_channels,
        })
    }
}

impl Module for Bottleneck {
    fn forward(&self, x: &Tensor) -> candle_core::Result<Tensor> {
        let h = self.expand.forward(x)?;
        let h = self.depthwise.forward(&h)?;
        let h = self.project.forward(&h)?;

        if self.residual {
            x + h
        } else {
            Ok(h)
        }
    }
}

/// The loaded, runnable embedding network bound to one device.
pub struct MobileFaceNet {
    // Stem: full conv then depthwise refinement
    conv1: ConvBlock,
    dw: ConvBlock,

    bottlenecks: Vec<Bottleneck>,

    // Embedding head: widen, global depthwise conv, linear projection
    conv2: ConvBlock,
    gdconv: Conv2d,
    proj: Conv2d,

    device: Device,
}

impl MobileFaceNet {
    /// Builds the network from loaded weights.
    ///
    /// # Errors
    ///
    /// Returns an error if any expected tensor is missing or has the
    /// wrong shape.
    #[allow(clippy::needless_pass_by_value)]
    pub fn new(vb: VarBuilder) -> Result<Self> {
        let device = vb.device().clone();

        // 3 -> 64, stride 2: 160x160 -> 80x80
        let conv1 = ConvBlock::new(3, STEM_CHANNELS, 3, 2, 1, 1, &vb.pp("conv1"))?;
        let dw = ConvBlock::new(
            STEM_CHANNELS,
            STEM_CHANNELS,
            3,
            1,
            1,
            STEM_CHANNELS,
            &vb.pp("dw"),
        )?;

        let mut bottlenecks = Vec::with_capacity(BOTTLENECK_CONFIG.len());
        for (i, (in_c, out_c, t, s)) in BOTTLENECK_CONFIG.iter().enumerate() {
            let block = Bottleneck::new(*in_c, *out_c, *t, *s, &vb.pp(format!("blocks.{i}")))?;
            bottlenecks.push(block);
        }

        let last_channels = BOTTLENECK_CONFIG
            .last()
            .map_or(STEM_CHANNELS, |(_, out_c, _, _)| *out_c);

        let conv2 = ConvBlock::new(last_channels, HEAD_CHANNELS, 1, 1, 0, 1, &vb.pp("conv2"))?;

        // Global depthwise conv collapses the 10x10 map to 1x1
        let gdconv = conv2d(
            HEAD_CHANNELS,
            HEAD_CHANNELS,
            FINAL_FEATURE_SIZE,
            Conv2dConfig {
                groups: HEAD_CHANNELS,
                ..Conv2dConfig::default()
            },
            vb.pp("gdconv"),
        )?;

        let proj = conv2d(
            HEAD_CHANNELS,
            HEAD_CHANNELS,
            1,
            Conv2dConfig::default(),
            vb.pp("proj"),
        )?;

        Ok(Self {
            conv1,
            dw,
            bottlenecks,
            conv2,
            gdconv,
            proj,
            device,
        })
    }

    /// Runs the network on a preprocessed NCHW input.
    fn forward(&self, x: &Tensor) -> Result<Tensor> {
        let mut h = self.conv1.forward(x)?;
        h = self.dw.forward(&h)?;

        for block in &self.bottlenecks {
            h = block.forward(&h)?;
        }

        let h = self.conv2.forward(&h)?;
        let h = self.gdconv.forward(&h)?;
        let h = self.proj.forward(&h)?;

        // (1, 512, 1, 1) -> (1, 512)
        h.flatten_from(1).context("Failed to flatten embedding")
    }

    /// Embeds a face image: preprocess, run the network, L2-normalize.
    ///
    /// # Errors
    ///
    /// Returns an error if tensor creation or inference fails.
    pub fn embed(&self, image: &DynamicImage) -> Result<Embedding> {
        let pixels = preprocess::normalize_pixels(image);
        let input = preprocess::input_tensor(pixels, &self.device)?;

        let output = self.forward(&input)?;
        let values = output
            .squeeze(0)
            .and_then(|t| t.to_vec1::<f32>())
            .context("Failed to read embedding from device")?;

        Ok(Embedding::from_values(values)?.l2_normalized())
    }
}

fn push_conv(
    shapes: &mut Vec<(String, Vec<usize>)>,
    name: &str,
    in_c: usize,
    out_c: usize,
    kernel: usize,
    groups: usize,
) {
    shapes.push((
        format!("{name}.weight"),
        vec![out_c, in_c / groups, kernel, kernel],
    ));
    shapes.push((format!("{name}.bias"), vec![out_c]));
}

fn push_conv_block(
    shapes: &mut Vec<(String, Vec<usize>)>,
    name: &str,
    in_c: usize,
    out_c: usize,
    kernel: usize,
    groups: usize,
) {
    push_conv(shapes, &format!("{name}.conv"), in_c, out_c, kernel, groups);
    shapes.push((format!("{name}.prelu.weight"), vec![out_c]));
}

/// Manifest of every tensor the network expects, with its shape.
///
/// Useful for validating converted weight files before loading them,
/// and for generating synthetic weights in tests.
#[must_use]
pub fn weight_shapes() -> Vec<(String, Vec<usize>)> {
    let mut shapes = Vec::new();

    push_conv_block(&mut shapes, "conv1", 3, STEM_CHANNELS, 3, 1);
    push_conv_block(
        &mut shapes,
        "dw",
        STEM_CHANNELS,
        STEM_CHANNELS,
        3,
        STEM_CHANNELS,
    );

    for (i, (in_c, out_c, t, _)) in BOTTLENECK_CONFIG.iter().enumerate() {
        let hidden = in_c * t;
        push_conv_block(&mut shapes, &format!("blocks.{i}.expand"), *in_c, hidden, 1, 1);
        push_conv_block(
            &mut shapes,
            &format!("blocks.{i}.depthwise"),
            hidden,
            hidden,
            3,
            hidden,
        );
        push_conv(&mut shapes, &format!("blocks.{i}.project"), hidden, *out_c, 1, 1);
    }

    let last_channels = BOTTLENECK_CONFIG
        .last()
        .map_or(STEM_CHANNELS, |(_, out_c, _, _)| *out_c);
    push_conv_block(&mut shapes, "conv2", last_channels, HEAD_CHANNELS, 1, 1);
    push_conv(
        &mut shapes,
        "gdconv",
        HEAD_CHANNELS,
        HEAD_CHANNELS,
        FINAL_FEATURE_SIZE,
        HEAD_CHANNELS,
    );
    push_conv(&mut shapes, "proj", HEAD_CHANNELS, HEAD_CHANNELS, 1, 1);

    shapes
}

/// Weight fixture for tests: serializes zeroed weights to a safetensors file.
#[cfg(test)]
pub(crate) mod fixture {
    use std::collections::HashMap;
    use std::path::Path;

    /// Writes a valid weight file with all tensors zeroed.
    pub(crate) fn write_zeroed_weights(path: &Path) -> anyhow::Result<()> {
        use safetensors::tensor::TensorView;

        let shapes = super::weight_shapes();
        let buffers: Vec<Vec<u8>> = shapes
            .iter()
            .map(|(_, shape)| vec![0u8; shape.iter().product::<usize>() * 4])
            .collect();

        let mut tensors = HashMap::new();
        for ((name, shape), data) in shapes.iter().zip(&buffers) {
            let view = TensorView::new(safetensors::Dtype::F32, shape.clone(), data)?;
            tensors.insert(name.clone(), view);
        }

        let serialized = safetensors::serialize(tensors, &None)?;
        std::fs::write(path, serialized)?;
        Ok(())
    }
}
