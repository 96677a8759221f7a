//! Image preprocessing for training input.
//!
//! Images are resized to the target size, converted to 3-channel RGB and
//! flattened in HWC order (height, width, channels). Pixel values are either
//! kept in [0, 255] or scaled to [0, 1].

use defect_core::ImageSize;
use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::loader::resize_exact;

/// Configuration for image preprocessing
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PreprocessConfig {
    /// Target image dimensions
    pub target_size: ImageSize,
    /// Whether to scale pixel intensities from [0, 255] to [0, 1]
    pub normalize: bool,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            target_size: ImageSize::default(),
            normalize: true,
        }
    }
}

/// Converts decoded images to flat training tensors
#[derive(Debug, Clone)]
pub struct ImagePreprocessor {
    config: PreprocessConfig,
}

impl ImagePreprocessor {
    pub fn new(config: PreprocessConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PreprocessConfig {
        &self.config
    }

    /// Resizes, converts to RGB and flattens an image in HWC order
    pub fn preprocess(&self, image: &DynamicImage) -> Vec<f32> {
        let resized = resize_exact(image, self.config.target_size);
        let rgb = resized.to_rgb8();

        let scale = if self.config.normalize { 1.0 / 255.0 } else { 1.0 };

        rgb.as_raw()
            .iter()
            .map(|&value| value as f32 * scale)
            .collect()
    }

    /// Shape of a single preprocessed image: [height, width, channels]
    pub fn output_shape(&self) -> [usize; 3] {
        [
            self.config.target_size.height as usize,
            self.config.target_size.width as usize,
            3,
        ]
    }
}
