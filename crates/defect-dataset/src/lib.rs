//! Defect dataset preparation library.
//!
//! This crate lists images in a flat directory, classifies them by file name
//! keywords, computes dataset statistics, writes a class-organized copy and
//! formats labeled arrays for training.

pub mod classify;
pub mod loader;
pub mod metadata;
pub mod preprocess;
pub mod processor;
pub mod statistics;
pub mod structure;
pub mod training;

pub use classify::{classify_paths, unclassified_report, ClassImages, Classification};
pub use loader::ImageLoader;
pub use metadata::{read_metadata, write_metadata};
pub use preprocess::{ImagePreprocessor, PreprocessConfig};
pub use processor::DatasetProcessor;
pub use statistics::{DatasetStatistics, ImageShape, MeanDimensions};
pub use structure::StructureReport;
pub use training::{load_kaggle_format, TrainingSet};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::classify::*;
    pub use crate::loader::*;
    pub use crate::metadata::*;
    pub use crate::preprocess::*;
    pub use crate::processor::*;
    pub use crate::statistics::*;
    pub use crate::structure::*;
    pub use crate::training::*;
}
