//! Component self-check.
//!
//! Constructs each part of the toolkit in turn and reports `[OK]` or
//! `[ERRO]` per component. Failures are printed and never propagated.

use std::io::Cursor;

use anyhow::{ensure, Context, Result};
use colored::Colorize;
use defect_core::{KeywordMap, ProcessorConfig};
use defect_dataset::{classify_paths, DatasetProcessor, DatasetStatistics};
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};

pub struct Check {
    pub name: &'static str,
    run: fn() -> Result<()>,
}

pub fn checks() -> Vec<Check> {
    vec![
        Check {
            name: "Keyword map",
            run: check_keyword_map,
        },
        Check {
            name: "Image codec",
            run: check_image_codec,
        },
        Check {
            name: "Dataset processor",
            run: check_processor,
        },
        Check {
            name: "Metadata serializer",
            run: check_metadata,
        },
    ]
}

/// Runs every check, printing one status line per component
pub fn run() {
    println!("{}", "=".repeat(60));
    println!("COMPONENT CHECK - Defect Detection Dataset Toolkit");
    println!("{}", "=".repeat(60));

    let mut passed = 0;
    let all = checks();

    for (idx, check) in all.iter().enumerate() {
        println!("\n[{}] Testing {}...", idx + 1, check.name);
        match (check.run)() {
            Ok(()) => {
                passed += 1;
                println!("   {} {} is working", "[OK]".green(), check.name);
            }
            Err(e) => println!("   {} {}: {:#}", "[ERRO]".red(), check.name, e),
        }
    }

    println!("\n{}", "=".repeat(60));
    println!("CHECK COMPLETE: {}/{} components OK", passed, all.len());
    println!("{}", "=".repeat(60));
}

fn check_keyword_map() -> Result<()> {
    let defaults = KeywordMap::default();
    let rebuilt = KeywordMap::new(defaults.classes().to_vec())?;
    ensure!(!rebuilt.is_empty(), "default keyword map has no classes");
    Ok(())
}

fn check_image_codec() -> Result<()> {
    let image = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(4, 3, Rgb([10u8, 20, 30])));

    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, ImageFormat::Png)
        .context("PNG encoding failed")?;

    let decoded = image::load_from_memory(buffer.get_ref()).context("PNG decoding failed")?;
    ensure!(
        decoded.width() == 4 && decoded.height() == 3,
        "decoded image has unexpected size {}x{}",
        decoded.width(),
        decoded.height()
    );
    Ok(())
}

fn check_processor() -> Result<()> {
    let config = ProcessorConfig::default();
    config.validate()?;
    let processor = DatasetProcessor::from_config(config);
    ensure!(
        !processor.base_dir().as_os_str().is_empty(),
        "processor has no base directory"
    );
    Ok(())
}

fn check_metadata() -> Result<()> {
    let classification = classify_paths(&[], &KeywordMap::default());
    let stats = DatasetStatistics::from_parts(0, &classification, &[]);

    let json = serde_json::to_string_pretty(&stats)?;
    let parsed: DatasetStatistics = serde_json::from_str(&json)?;
    ensure!(parsed == stats, "metadata did not survive serialization");
    Ok(())
}
