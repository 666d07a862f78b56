//! Image → input tensor conversion

use image::{imageops::FilterType, DynamicImage};
use tract_onnx::prelude::*;

/// ImageNet channel statistics the backbone was trained with
const MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Resize + normalize settings for the model input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preprocess {
    /// Square input edge in pixels
    pub input_size: u32,
}

impl Default for Preprocess {
    fn default() -> Self {
        Self { input_size: 224 }
    }
}

impl Preprocess {
    pub fn new(input_size: u32) -> Self {
        Self { input_size }
    }

    /// Input shape in NCHW order
    pub fn shape(&self) -> [usize; 4] {
        let edge = self.input_size as usize;
        [1, 3, edge, edge]
    }

    /// Resize to the input size, scale to [0, 1], and normalize per channel
    pub fn to_array(&self, image: &DynamicImage) -> tract_ndarray::Array4<f32> {
        let edge = self.input_size;
        let rgb = image
            .resize_exact(edge, edge, FilterType::Triangle)
            .to_rgb8();

        let [batch, channels, height, width] = self.shape();
        tract_ndarray::Array4::from_shape_fn((batch, channels, height, width), |(_, c, y, x)| {
            let value = rgb.get_pixel(x as u32, y as u32)[c] as f32 / 255.0;
            (value - MEAN[c]) / STD[c]
        })
    }

    pub fn to_tensor(&self, image: &DynamicImage) -> Tensor {
        self.to_array(image).into()
    }
}
