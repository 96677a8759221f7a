//! Configuration structures for dataset preparation.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::types::{ImageSize, KeywordMap};
use crate::{load_toml_config, Error, Result};

/// Directory scanned when no other directory is given
pub const DEFAULT_BASE_DIR: &str = "imagens_para_analisar";

/// Destination of the class-organized copy of the dataset
pub const DEFAULT_STRUCTURED_DIR: &str = "dataset_estruturado";

/// Default metadata output file
pub const DEFAULT_METADATA_FILE: &str = "metadados_dataset.json";

/// Number of images decoded to estimate dataset dimensions
pub const DEFAULT_SAMPLE_SIZE: usize = 10;

/// Recognized image file extensions
pub const DEFAULT_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "bmp", "tiff", "tif"];

/// Configuration for a dataset processor
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    /// Directory containing the images
    pub base_dir: PathBuf,
    /// Recognized file extensions, without the leading dot
    pub extensions: Vec<String>,
    /// Number of listed images decoded for dimension statistics
    pub sample_size: usize,
    /// Target size for loading and training formatting
    pub target_size: ImageSize,
    /// Whether training pixels are scaled to [0, 1]
    pub normalize: bool,
    /// Class keywords in priority order
    pub classes: KeywordMap,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from(DEFAULT_BASE_DIR),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            sample_size: DEFAULT_SAMPLE_SIZE,
            target_size: ImageSize::default(),
            normalize: true,
            classes: KeywordMap::default(),
        }
    }
}

impl ProcessorConfig {
    /// Default configuration rooted at the given directory
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            ..Self::default()
        }
    }

    /// Loads a configuration from a TOML file and validates it
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let config: Self = load_toml_config(path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.extensions.is_empty() {
            return Err(Error::Config(
                "at least one image extension is required".to_string(),
            ));
        }

        if self.sample_size == 0 {
            return Err(Error::Config("sample_size must be at least 1".to_string()));
        }

        self.target_size
            .validate()
            .map_err(|e| Error::Config(e.to_string()))?;

        if self.classes.is_empty() {
            return Err(Error::Config("at least one class is required".to_string()));
        }

        Ok(())
    }
}
