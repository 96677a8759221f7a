//! Core type definitions for defect dataset preparation.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Name of the defect class in the default keyword map
pub const DEFECT_CLASS: &str = "defeito";

/// Name of the no-defect class in the default keyword map
pub const OK_CLASS: &str = "ok";

const DEFECT_KEYWORDS: [&str; 8] = [
    "damage", "scratch", "dent", "broken", "defeito", "batida", "colisao", "risco",
];

const OK_KEYWORDS: [&str; 9] = [
    "ok",
    "normal",
    "intact",
    "good",
    "fine",
    "bm",
    "bmw",
    "carro-completo",
    "carro-prateado",
];

/// Target image dimensions in pixels
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageSize {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
}

impl ImageSize {
    /// Creates new image dimensions
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Standard ImageNet input size (224x224)
    pub fn imagenet() -> Self {
        Self::new(224, 224)
    }

    /// Number of values in an HWC RGB tensor of this size
    pub fn rgb_len(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidArgument(format!(
                "image size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

impl Default for ImageSize {
    fn default() -> Self {
        Self::imagenet()
    }
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Channel layout inferred from a sample of images
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ChannelFormat {
    #[serde(rename = "RGB")]
    Rgb,
    #[serde(rename = "Grayscale")]
    Grayscale,
}

impl ChannelFormat {
    /// RGB only when a sample exists and its median channel count is exactly 3
    pub fn from_median_channels(median: Option<f64>) -> Self {
        match median {
            Some(channels) if channels == 3.0 => ChannelFormat::Rgb,
            _ => ChannelFormat::Grayscale,
        }
    }
}

impl std::fmt::Display for ChannelFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChannelFormat::Rgb => write!(f, "RGB"),
            ChannelFormat::Grayscale => write!(f, "Grayscale"),
        }
    }
}

/// A class and the filename keywords that select it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassKeywords {
    /// Class name (e.g., "defeito")
    pub name: String,
    /// Lowercase substrings searched for in file names
    pub keywords: Vec<String>,
}

impl ClassKeywords {
    /// Creates a class entry, lowercasing its keywords
    pub fn new<I, S>(name: impl Into<String>, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            name: name.into(),
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// Checks whether any keyword occurs in an already-lowercased file name
    pub fn matches(&self, file_name_lower: &str) -> bool {
        self.keywords
            .iter()
            .any(|keyword| file_name_lower.contains(keyword.as_str()))
    }
}

/// Ordered class → keywords mapping.
///
/// Classification is first-match-wins in this order, so earlier classes take
/// priority when a file name contains keywords from several classes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "Vec<ClassKeywords>", into = "Vec<ClassKeywords>")]
pub struct KeywordMap {
    classes: Vec<ClassKeywords>,
}

impl KeywordMap {
    /// Creates a keyword map, rejecting duplicate class names
    pub fn new(classes: Vec<ClassKeywords>) -> Result<Self> {
        let mut seen = HashSet::new();
        for class in &classes {
            if !seen.insert(class.name.as_str()) {
                return Err(Error::InvalidArgument(format!(
                    "duplicate class name in keyword map: {}",
                    class.name
                )));
            }
        }

        let classes = classes
            .into_iter()
            .map(|class| ClassKeywords::new(class.name, class.keywords))
            .collect();

        Ok(Self { classes })
    }

    /// Classes in priority order
    pub fn classes(&self) -> &[ClassKeywords] {
        &self.classes
    }

    /// Class names in priority order
    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(|class| class.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Returns the index of the first class matching the file name.
    ///
    /// Only the file stem is searched, so ".bmp" never matches the "bm"
    /// keyword. Directory components are ignored.
    pub fn match_index(&self, file_name: &str) -> Option<usize> {
        let lower = match_stem(file_name).to_lowercase();
        self.classes.iter().position(|class| class.matches(&lower))
    }

    /// Returns the name of the first class matching the file name
    pub fn match_class(&self, file_name: &str) -> Option<&str> {
        self.match_index(file_name)
            .map(|idx| self.classes[idx].name.as_str())
    }
}

/// File name without directory and extension
fn match_stem(file_name: &str) -> std::borrow::Cow<'_, str> {
    Path::new(file_name)
        .file_stem()
        .map(|stem| stem.to_string_lossy())
        .unwrap_or_default()
}

impl Default for KeywordMap {
    fn default() -> Self {
        Self {
            classes: vec![
                ClassKeywords::new(DEFECT_CLASS, DEFECT_KEYWORDS),
                ClassKeywords::new(OK_CLASS, OK_KEYWORDS),
            ],
        }
    }
}

impl TryFrom<Vec<ClassKeywords>> for KeywordMap {
    type Error = Error;

    fn try_from(classes: Vec<ClassKeywords>) -> Result<Self> {
        Self::new(classes)
    }
}

impl From<KeywordMap> for Vec<ClassKeywords> {
    fn from(map: KeywordMap) -> Self {
        map.classes
    }
}
