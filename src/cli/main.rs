//! Flickr30k imagefolder CLI
//!
//! Command-line interface around `DatasetPreparer`.

use super::config::CliConfigBuilder;
use crate::{
    config::DEFAULT_CLONE_URL,
    export::ExportedSample,
    pipeline::{DatasetPreparer, ExportSummary},
    progress::{PipelineStage, ProgressReporter, TracingProgressReporter},
};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info};

/// Prepare local Flickr30k into imagefolder format
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "flickr-imagefolder")]
pub struct Cli {
    /// Folder containing the images zip and the annotations csv
    #[arg(long, alias = "flickr_root", default_value = "flickr30k")]
    pub flickr_root: String,

    /// Dataset git URL used when the local folder is missing
    #[arg(long, alias = "clone_url", default_value = DEFAULT_CLONE_URL)]
    pub clone_url: String,

    /// Disable auto-clone and require existing local files
    #[arg(long, alias = "no_clone")]
    pub no_clone: bool,

    /// Zip file name inside the flickr root
    #[arg(long, alias = "images_zip", default_value = "flickr30k-images.zip")]
    pub images_zip: String,

    /// Annotations csv file name inside the flickr root
    #[arg(long, alias = "annotations_csv", default_value = "flickr_annotations_30k.csv")]
    pub annotations_csv: String,

    /// Split to export
    #[arg(long, value_enum, default_value_t = CliSplit::Train)]
    pub split: CliSplit,

    /// Max samples to export
    #[arg(long, default_value_t = 1000)]
    pub count: usize,

    /// Output imagefolder directory
    #[arg(long, alias = "out_dir", default_value = "data/flickr1k_local")]
    pub out_dir: String,

    /// How images missing at their direct path are searched for
    #[arg(long, value_enum, default_value_t = CliLookup::Indexed)]
    pub lookup: CliLookup,

    /// Enable verbose logging (-v: DEBUG, -vv: TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Show a progress bar while exporting
    #[arg(long)]
    pub progress: bool,

    /// Write logs to this file instead of stderr (needs the tracing-files feature)
    #[arg(long, alias = "log_file")]
    pub log_file: Option<PathBuf>,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum CliSplit {
    Train,
    Val,
    Test,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum CliLookup {
    /// Index the extracted tree once and reuse it
    Indexed,
    /// Walk the extracted tree again for every miss
    Walk,
}

pub fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.log_file.clone()).context("Failed to initialize tracing")?;

    let config = CliConfigBuilder::from_cli(&cli).context("Invalid CLI arguments")?;
    debug!(?config, "Resolved configuration");

    let progress: Box<dyn ProgressReporter> = if cli.progress {
        Box::new(BarProgressReporter::new(config.count))
    } else {
        Box::new(TracingProgressReporter::default())
    };

    let start_time = Instant::now();
    let summary = DatasetPreparer::new(config)
        .context("Failed to create dataset preparer")?
        .with_progress(progress)
        .run()
        .context("Failed to prepare imagefolder dataset")?;

    info!(
        "Prepared {} sample(s) in {:.2}s",
        summary.written,
        start_time.elapsed().as_secs_f64()
    );
    print_summary(&summary);

    Ok(())
}

/// Initialize tracing based on verbosity level
fn init_tracing(verbose_count: u8, log_file: Option<PathBuf>) -> Result<()> {
    crate::tracing_config::init_cli_tracing(verbose_count, log_file)
        .context("Failed to initialize tracing subscriber")?;
    debug!(verbosity = verbose_count, "Tracing initialized");
    Ok(())
}

fn print_summary(summary: &ExportSummary) {
    println!(
        "Saved {} samples to: {}",
        summary.written,
        summary.out_dir.display()
    );
    println!("Created: {}", summary.metadata_path.display());
    println!("Done.");
}

/// Progress bar over the export phase
struct BarProgressReporter {
    bar: ProgressBar,
}

impl BarProgressReporter {
    fn new(target: usize) -> Self {
        let bar = ProgressBar::new(target as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Self { bar }
    }
}

impl ProgressReporter for BarProgressReporter {
    fn report_stage(&self, stage: PipelineStage) {
        self.bar.set_message(stage.description());
    }

    fn report_sample(&self, sample: &ExportedSample, _target: usize) {
        self.bar.set_position((sample.index + 1) as u64);
        self.bar.set_message(sample.file_name.clone());
    }

    fn finish(&self, written: usize) {
        self.bar
            .finish_with_message(format!("Completed! Exported: {written}"));
    }
}
