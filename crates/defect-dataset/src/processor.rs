//! Dataset processor: the entry point tying listing, classification,
//! statistics, materialization and training formatting together.
//!
//! The processor holds only immutable configuration. Every operation rescans
//! the directory, so results always reflect the current files on disk.

use std::path::{Path, PathBuf};

use defect_core::{ImageSize, KeywordMap, ProcessorConfig, Result};
use image::DynamicImage;
use tracing::{debug, info};

use crate::classify::{classify_paths, log_unclassified, Classification};
use crate::loader::ImageLoader;
use crate::metadata::write_metadata;
use crate::preprocess::PreprocessConfig;
use crate::statistics::{DatasetStatistics, ImageShape};
use crate::structure::{materialize, StructureReport};
use crate::training::{format_classification, TrainingSet};

/// Prepares a flat directory of images for defect classification
#[derive(Debug, Clone)]
pub struct DatasetProcessor {
    config: ProcessorConfig,
    loader: ImageLoader,
}

impl Default for DatasetProcessor {
    fn default() -> Self {
        Self::from_config(ProcessorConfig::default())
    }
}

impl DatasetProcessor {
    /// Creates a processor with default settings rooted at `base_dir`
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self::from_config(ProcessorConfig::with_base_dir(base_dir))
    }

    pub fn from_config(config: ProcessorConfig) -> Self {
        let loader = ImageLoader::new(&config.extensions);
        Self { config, loader }
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    pub fn base_dir(&self) -> &Path {
        &self.config.base_dir
    }

    /// Lists image files in `dir` (or the base directory), sorted by path
    pub fn list_images(&self, dir: Option<&Path>) -> Result<Vec<PathBuf>> {
        self.loader
            .scan_directory(dir.unwrap_or(self.config.base_dir.as_path()))
    }

    /// Decodes images, skipping (with a warning) any that fail to load.
    ///
    /// Without explicit paths the base directory is listed. Images are resized
    /// to `resize`, or to the configured target size when it is `None`.
    pub fn load_images(
        &self,
        paths: Option<&[PathBuf]>,
        resize: Option<ImageSize>,
    ) -> Result<Vec<DynamicImage>> {
        let size = resize.unwrap_or(self.config.target_size);
        self.load_images_resized(paths, Some(size))
    }

    /// Like [`load_images`](Self::load_images) but keeps original dimensions
    pub fn load_images_original(&self, paths: Option<&[PathBuf]>) -> Result<Vec<DynamicImage>> {
        self.load_images_resized(paths, None)
    }

    fn load_images_resized(
        &self,
        paths: Option<&[PathBuf]>,
        resize: Option<ImageSize>,
    ) -> Result<Vec<DynamicImage>> {
        if let Some(size) = resize {
            size.validate()?;
        }

        let images = match paths {
            Some(paths) => self.loader.load_images(paths, resize),
            None => {
                let listed = self.list_images(None)?;
                self.loader.load_images(&listed, resize)
            }
        };
        Ok(images)
    }

    /// Classifies every listed image by file name keywords.
    ///
    /// Uses the configured keyword map when `keywords` is `None`. Unclassified
    /// images are returned and also reported as a warning listing at most
    /// five names.
    pub fn classify(&self, keywords: Option<&KeywordMap>) -> Result<Classification> {
        let images = self.list_images(None)?;
        Ok(self.classify_listed(&images, keywords))
    }

    fn classify_listed(&self, images: &[PathBuf], keywords: Option<&KeywordMap>) -> Classification {
        let keywords = keywords.unwrap_or(&self.config.classes);
        let classification = classify_paths(images, keywords);
        log_unclassified(&classification.unclassified);
        classification
    }

    /// Copies classified images into `<destination>/<class>/` directories
    pub fn materialize_structured_dataset(&self, destination: &Path) -> Result<StructureReport> {
        let classification = self.classify(None)?;
        materialize(&classification, destination)
    }

    /// Computes counts and dimension statistics.
    ///
    /// Only the first `sample_size` listed images are decoded for dimensions;
    /// sample images that fail to decode are ignored.
    pub fn compute_statistics(&self) -> Result<DatasetStatistics> {
        let images = self.list_images(None)?;
        let classification = self.classify_listed(&images, None);

        let sample: Vec<ImageShape> = images
            .iter()
            .take(self.config.sample_size)
            .filter_map(|path| match self.loader.load_image(path) {
                Ok(image) => Some(ImageShape::of(&image)),
                Err(e) => {
                    debug!("Sample image {} not decodable: {}", path.display(), e);
                    None
                }
            })
            .collect();

        Ok(DatasetStatistics::from_parts(
            images.len(),
            &classification,
            &sample,
        ))
    }

    /// Builds a labeled training set from the classified images
    pub fn format_for_training(&self, target_size: ImageSize, normalize: bool) -> Result<TrainingSet> {
        let classification = self.classify(None)?;
        format_classification(
            &classification,
            &self.loader,
            PreprocessConfig {
                target_size,
                normalize,
            },
        )
    }

    /// Training set using the configured target size and normalization
    pub fn format_for_training_default(&self) -> Result<TrainingSet> {
        self.format_for_training(self.config.target_size, self.config.normalize)
    }

    /// Computes statistics and writes them as JSON to `output`
    pub fn export_metadata(&self, output: &Path) -> Result<DatasetStatistics> {
        let stats = self.compute_statistics()?;
        write_metadata(&stats, output)?;
        info!("Metadata exported to: {}", output.display());
        Ok(stats)
    }
}
