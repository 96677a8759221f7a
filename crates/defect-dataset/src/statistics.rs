//! Dataset statistics computation.

use defect_core::ChannelFormat;
use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::classify::Classification;

/// Channel count reported when no image could be sampled
const DEFAULT_CHANNELS: f64 = 3.0;

/// Dimensions of one decoded image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageShape {
    pub height: u32,
    pub width: u32,
    pub channels: u8,
}

/// Colour images count as 3 channels and gray images as 1, alpha excluded
fn color_channels(image: &DynamicImage) -> u8 {
    if image.color().has_color() {
        3
    } else {
        1
    }
}

impl ImageShape {
    pub fn of(image: &DynamicImage) -> Self {
        Self {
            height: image.height(),
            width: image.width(),
            channels: color_channels(image),
        }
    }
}

/// Mean dimensions over the sampled images
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MeanDimensions {
    #[serde(rename = "altura")]
    pub height: f64,
    #[serde(rename = "largura")]
    pub width: f64,
    /// Median channel count
    #[serde(rename = "canais")]
    pub channels: f64,
}

/// Dataset statistics, serialized with the metadata file's key names
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatasetStatistics {
    #[serde(rename = "total_imagens")]
    pub total_images: usize,
    /// (class, count) in keyword-map order
    #[serde(rename = "por_classe", with = "ordered_counts")]
    pub per_class: Vec<(String, usize)>,
    #[serde(rename = "dimensoes_medias")]
    pub mean_dimensions: MeanDimensions,
    #[serde(rename = "formato_canais")]
    pub channel_format: ChannelFormat,
}

impl DatasetStatistics {
    /// Builds statistics from the listing size, a classification and the
    /// shapes of the sampled images
    pub fn from_parts(
        total_images: usize,
        classification: &Classification,
        sample: &[ImageShape],
    ) -> Self {
        let heights: Vec<f64> = sample.iter().map(|s| s.height as f64).collect();
        let widths: Vec<f64> = sample.iter().map(|s| s.width as f64).collect();
        let channels: Vec<f64> = sample.iter().map(|s| s.channels as f64).collect();

        let median_channels = median(&channels);

        Self {
            total_images,
            per_class: classification.counts(),
            mean_dimensions: MeanDimensions {
                height: mean(&heights).unwrap_or(0.0),
                width: mean(&widths).unwrap_or(0.0),
                channels: median_channels.unwrap_or(DEFAULT_CHANNELS),
            },
            channel_format: ChannelFormat::from_median_channels(median_channels),
        }
    }

    /// Count of a class, if present
    pub fn class_count(&self, class_name: &str) -> Option<usize> {
        self.per_class
            .iter()
            .find(|(name, _)| name == class_name)
            .map(|(_, count)| *count)
    }

    /// Print statistics to console
    pub fn print(&self) {
        println!("\n📊 Dataset Statistics:");
        println!("  Total images: {}", self.total_images);
        println!("\n  Images per class:");

        for (name, count) in &self.per_class {
            let bar_len = if self.total_images > 0 {
                (*count as f32 / self.total_images as f32 * 40.0) as usize
            } else {
                0
            };
            let bar: String = "█".repeat(bar_len);
            println!("    {:20} {:5} {}", name, count, bar);
        }

        println!(
            "\n  Mean dimensions: {:.1} x {:.1} ({} channels, {})",
            self.mean_dimensions.width,
            self.mean_dimensions.height,
            self.mean_dimensions.channels,
            self.channel_format
        );
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Serializes `(name, count)` pairs as a JSON object without reordering keys
mod ordered_counts {
    use std::fmt;

    use serde::de::{MapAccess, Visitor};
    use serde::{Deserializer, Serializer};

    pub fn serialize<S>(counts: &[(String, usize)], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(counts.iter().map(|(name, count)| (name, count)))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<(String, usize)>, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct CountsVisitor;

        impl<'de> Visitor<'de> for CountsVisitor {
            type Value = Vec<(String, usize)>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of class names to image counts")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut counts = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, count)) = map.next_entry::<String, usize>()? {
                    counts.push((name, count));
                }
                Ok(counts)
            }
        }

        deserializer.deserialize_map(CountsVisitor)
    }
}
