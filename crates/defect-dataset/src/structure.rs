//! Class-organized copy of a classified dataset.
//!
//! Produces `<destination>/<class>/<original file name>` for every classified
//! image. Unclassified images are not written.

use std::fs;
use std::path::{Path, PathBuf};

use defect_core::{Error, Result};
use tracing::{info, warn};

use crate::classify::Classification;

/// Outcome of materializing a structured dataset
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructureReport {
    /// Destination root
    pub destination: PathBuf,
    /// Files copied in this run
    pub copied: usize,
    /// Files skipped because a file of that name already existed
    pub already_present: usize,
    /// Files whose copy failed
    pub failed: usize,
    /// (class, classified image count) in keyword-map order
    pub per_class: Vec<(String, usize)>,
}

/// Copies each classified image into its class directory under `destination`.
///
/// Class directories are created even when empty. An existing destination
/// file suppresses the copy; its content is not compared. Copy failures are
/// logged and counted without aborting the batch.
pub fn materialize(classification: &Classification, destination: &Path) -> Result<StructureReport> {
    info!("Organizing dataset by class into {}", destination.display());

    for class in &classification.classes {
        let class_dir = destination.join(&class.name);
        fs::create_dir_all(&class_dir).map_err(|e| {
            Error::Dataset(format!(
                "Failed to create class directory {}: {e}",
                class_dir.display()
            ))
        })?;
    }

    let mut report = StructureReport {
        destination: destination.to_path_buf(),
        per_class: classification.counts(),
        ..StructureReport::default()
    };

    for class in &classification.classes {
        let class_dir = destination.join(&class.name);

        for src_path in &class.paths {
            let Some(file_name) = src_path.file_name() else {
                warn!("Skipping {}: no file name", src_path.display());
                report.failed += 1;
                continue;
            };

            let dst_path = class_dir.join(file_name);
            if dst_path.exists() {
                report.already_present += 1;
                continue;
            }

            match fs::copy(src_path, &dst_path) {
                Ok(_) => report.copied += 1,
                Err(e) => {
                    warn!("Failed to copy {}: {}", src_path.display(), e);
                    report.failed += 1;
                }
            }
        }
    }

    info!("Structured dataset created at: {}", destination.display());
    info!("Total images organized: {}", report.copied);
    for (name, count) in &report.per_class {
        info!("  {}: {} images", name, count);
    }

    Ok(report)
}
