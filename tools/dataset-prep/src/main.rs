//! Dataset preparation tool for defect detection images.
//!
//! Without a subcommand it prints dataset statistics and exports them to the
//! default metadata file. Subcommands expose classification, the structured
//! copy, training-set formatting and a component self-check.

mod check;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use defect_core::{
    setup_cli_logging, ImageSize, ProcessorConfig, DEFAULT_METADATA_FILE, DEFAULT_STRUCTURED_DIR,
};
use defect_dataset::{Classification, DatasetProcessor, DatasetStatistics};
use tracing::info;

#[derive(Parser)]
#[command(name = "dataset-prep")]
#[command(version)]
#[command(about = "Dataset preparation for defect detection", long_about = None)]
struct Cli {
    /// Directory containing the images
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// TOML configuration file (classes, extensions, sample size)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true, default_value = "false")]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print dataset statistics
    Stats,

    /// Classify images by file name keywords
    Classify,

    /// Copy classified images into one directory per class
    Structure {
        /// Destination directory
        #[arg(short, long, default_value = DEFAULT_STRUCTURED_DIR)]
        output: PathBuf,
    },

    /// Export dataset statistics as JSON
    Export {
        /// Output file
        #[arg(short, long, default_value = DEFAULT_METADATA_FILE)]
        output: PathBuf,
    },

    /// Format the dataset as a labeled training array
    Format {
        /// Target width
        #[arg(long)]
        width: Option<u32>,

        /// Target height
        #[arg(long)]
        height: Option<u32>,

        /// Keep raw [0, 255] pixel values
        #[arg(long, default_value = "false")]
        no_normalize: bool,
    },

    /// Check that every component of the toolkit can be constructed
    Check,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_cli_logging(cli.verbose)?;

    let config = load_config(cli.config.as_deref(), cli.data_dir)?;

    match cli.command {
        None => run_default(config)?,
        Some(Commands::Stats) => {
            print_statistics(&DatasetProcessor::from_config(config))?;
        }
        Some(Commands::Classify) => classify(&DatasetProcessor::from_config(config))?,
        Some(Commands::Structure { output }) => {
            structure(&DatasetProcessor::from_config(config), &output)?
        }
        Some(Commands::Export { output }) => {
            export(&DatasetProcessor::from_config(config), &output)?
        }
        Some(Commands::Format {
            width,
            height,
            no_normalize,
        }) => {
            let size = ImageSize::new(
                width.unwrap_or(config.target_size.width),
                height.unwrap_or(config.target_size.height),
            );
            let normalize = config.normalize && !no_normalize;
            format_training(&DatasetProcessor::from_config(config), size, normalize)?
        }
        Some(Commands::Check) => check::run(),
    }

    Ok(())
}

fn load_config(path: Option<&Path>, data_dir: Option<PathBuf>) -> Result<ProcessorConfig> {
    let mut config = match path {
        Some(path) => ProcessorConfig::from_toml_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => ProcessorConfig::default(),
    };

    if let Some(dir) = data_dir {
        config.base_dir = dir;
    }

    Ok(config)
}

/// Banner, statistics, metadata export to the default file
fn run_default(config: ProcessorConfig) -> Result<()> {
    println!("Dataset Processor for Defect Detection");
    println!("{}", "=".repeat(60));

    let processor = DatasetProcessor::from_config(config);

    let stats = print_statistics(&processor)?;
    processor
        .export_metadata(Path::new(DEFAULT_METADATA_FILE))
        .context("Failed to export metadata")?;

    let per_class: Vec<String> = stats
        .per_class
        .iter()
        .map(|(name, count)| format!("{name}: {count}"))
        .collect();
    println!("By class: {{{}}}", per_class.join(", "));

    println!("\n{}", "Processor initialized successfully!".green());
    Ok(())
}

fn print_statistics(processor: &DatasetProcessor) -> Result<DatasetStatistics> {
    let stats = processor
        .compute_statistics()
        .with_context(|| format!("Failed to read {}", processor.base_dir().display()))?;
    stats.print();
    Ok(stats)
}

fn classify(processor: &DatasetProcessor) -> Result<()> {
    let classification = processor
        .classify(None)
        .with_context(|| format!("Failed to read {}", processor.base_dir().display()))?;

    let lines = classification_table(&classification);
    let last = lines.len().saturating_sub(1);
    for (idx, line) in lines.iter().enumerate() {
        if idx == last && !classification.unclassified.is_empty() {
            println!("{}", line.yellow());
        } else {
            println!("{}", line);
        }
    }

    Ok(())
}

/// Per-class counts; unclassified names are reported by the processor's log
fn classification_table(classification: &Classification) -> Vec<String> {
    let mut lines = vec![
        format!("\n{:<20} {:>10}", "Class", "Images"),
        "=".repeat(31),
    ];
    for class in &classification.classes {
        lines.push(format!("{:<20} {:>10}", class.name, class.paths.len()));
    }
    lines.push(format!(
        "{:<20} {:>10}",
        "(unclassified)",
        classification.unclassified.len()
    ));
    lines
}

fn structure(processor: &DatasetProcessor, output: &Path) -> Result<()> {
    let report = processor
        .materialize_structured_dataset(output)
        .with_context(|| format!("Failed to create structured dataset in {}", output.display()))?;

    println!("\nStructured dataset created at: {}", report.destination.display());
    println!("Total images organized: {}", report.copied);
    if report.already_present > 0 {
        println!("Already present: {}", report.already_present);
    }
    if report.failed > 0 {
        println!("{}", format!("Failed copies: {}", report.failed).red());
    }
    for (name, count) in &report.per_class {
        println!("  {}: {} images", name, count);
    }

    Ok(())
}

fn export(processor: &DatasetProcessor, output: &Path) -> Result<()> {
    let stats = processor
        .export_metadata(output)
        .with_context(|| format!("Failed to export metadata to {}", output.display()))?;

    println!("Metadata exported to: {}", output.display());
    println!("Total images: {}", stats.total_images);
    Ok(())
}

fn format_training(processor: &DatasetProcessor, size: ImageSize, normalize: bool) -> Result<()> {
    info!("Formatting dataset at {} (normalize: {})", size, normalize);

    let set = processor
        .format_for_training(size, normalize)
        .context("Failed to format training set")?;

    println!("\n📦 Training set");
    println!("  Images shape: {:?}", set.images.shape());
    println!("  Labels:       {}", set.labels.len());
    println!("  Classes:      {}", set.num_classes);
    for label in 0..set.num_classes {
        let count = set.labels.iter().filter(|&&l| l == label).count();
        println!(
            "    {}: {} ({} images)",
            label,
            set.class_name(label).unwrap_or("?"),
            count
        );
    }
    if set.skipped > 0 {
        println!("  Skipped (undecodable): {}", set.skipped);
    }

    Ok(())
}
