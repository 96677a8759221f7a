//! Training-set formatting: stacked image arrays with integer labels.

use std::collections::HashMap;
use std::path::Path;

use defect_core::{ImageSize, Result};
use ndarray::Array4;
use tracing::{debug, info};

use crate::classify::Classification;
use crate::loader::ImageLoader;
use crate::preprocess::{ImagePreprocessor, PreprocessConfig};
use crate::processor::DatasetProcessor;

/// Images and labels ready for a classifier
#[derive(Debug, Clone)]
pub struct TrainingSet {
    /// Stacked images with shape [N, height, width, 3]
    pub images: Array4<f32>,
    /// Label of each image, parallel to the first axis of `images`
    pub labels: Vec<usize>,
    /// Mapping from label index to class name
    pub class_names: HashMap<usize, String>,
    /// Number of classes
    pub num_classes: usize,
    /// Classified images that failed to decode
    pub skipped: usize,
}

impl TrainingSet {
    /// Number of images
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Class name for a label
    pub fn class_name(&self, label: usize) -> Option<&str> {
        self.class_names.get(&label).map(String::as_str)
    }
}

/// Decodes, resizes and labels every classified image.
///
/// Labels follow class order in the classification, starting at 0. Images are
/// visited class by class, each class in its listed order. Images that fail
/// to decode are skipped without a warning.
pub fn format_classification(
    classification: &Classification,
    loader: &ImageLoader,
    config: PreprocessConfig,
) -> Result<TrainingSet> {
    config.target_size.validate()?;

    let preprocessor = ImagePreprocessor::new(config);
    let [height, width, channels] = preprocessor.output_shape();

    let class_names: HashMap<usize, String> = classification
        .class_names()
        .enumerate()
        .map(|(idx, name)| (idx, name.to_string()))
        .collect();

    let mut data = Vec::with_capacity(classification.classified_len() * config.target_size.rgb_len());
    let mut labels = Vec::new();
    let mut skipped = 0;

    for (label, class) in classification.classes.iter().enumerate() {
        for path in &class.paths {
            let image = match loader.load_image(path) {
                Ok(image) => image,
                Err(e) => {
                    debug!("Skipping {}: {}", path.display(), e);
                    skipped += 1;
                    continue;
                }
            };

            data.extend(preprocessor.preprocess(&image));
            labels.push(label);
        }
    }

    let images = Array4::from_shape_vec((labels.len(), height, width, channels), data)?;

    info!(
        "Formatted {} images ({}x{}) across {} classes",
        labels.len(),
        width,
        height,
        class_names.len()
    );

    Ok(TrainingSet {
        images,
        labels,
        num_classes: class_names.len(),
        class_names,
        skipped,
    })
}

/// Loads a dataset directory with the default keyword map and formats it for
/// training at 224x224 with normalization
pub fn load_kaggle_format(dataset_dir: impl AsRef<Path>) -> Result<TrainingSet> {
    DatasetProcessor::new(dataset_dir.as_ref()).format_for_training(ImageSize::default(), true)
}
