//! JSON metadata export.

use std::fs;
use std::path::Path;

use defect_core::{Error, Result};

use crate::statistics::DatasetStatistics;

/// Writes statistics as indented UTF-8 JSON; non-ASCII text is written as-is
pub fn write_metadata(stats: &DatasetStatistics, output: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(stats)?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    fs::write(output, json)
        .map_err(|e| Error::Dataset(format!("Failed to write {}: {e}", output.display())))
}

/// Reads a metadata file written by [`write_metadata`]
pub fn read_metadata(path: &Path) -> Result<DatasetStatistics> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
