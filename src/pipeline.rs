//! Dataset preparation pipeline
//!
//! This module provides `DatasetPreparer`, which runs the four phases in
//! order: acquire the source, extract the archive, filter and resolve rows,
//! and export samples. The run is a single forward pass; a failure leaves
//! whatever was already written in place.

use crate::{
    annotations::AnnotationTable,
    config::PrepareConfig,
    error::Result,
    export::ImageFolderWriter,
    extract::{ensure_extracted, ExtractOutcome},
    locate::ImageLocator,
    progress::{NoOpProgressReporter, PipelineStage, ProgressReporter},
    source::{acquire, AcquireOutcome, DatasetFetcher, DatasetSource, GitFetcher},
    tracing_config::spans,
};
use std::path::PathBuf;
use tracing::{debug, info};

/// Result of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    /// Number of samples written
    pub written: usize,
    /// Output imagefolder directory
    pub out_dir: PathBuf,
    /// Path of the written `metadata.jsonl`
    pub metadata_path: PathBuf,
    /// What the acquisition phase did
    pub acquisition: AcquireOutcome,
    /// What the extraction phase did
    pub extraction: ExtractOutcome,
}

/// Runs one preparation pass for a fixed configuration
pub struct DatasetPreparer {
    config: PrepareConfig,
    fetcher: Box<dyn DatasetFetcher>,
    progress: Box<dyn ProgressReporter>,
}

impl DatasetPreparer {
    /// Create a preparer that clones with `git` and reports nothing
    pub fn new(config: PrepareConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            fetcher: Box::new(GitFetcher::new()),
            progress: Box::new(NoOpProgressReporter),
        })
    }

    /// Replace the fetcher used when the source has to be cloned
    #[must_use]
    pub fn with_fetcher(mut self, fetcher: Box<dyn DatasetFetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    #[must_use]
    pub fn with_progress(mut self, progress: Box<dyn ProgressReporter>) -> Self {
        self.progress = progress;
        self
    }

    #[must_use]
    pub fn config(&self) -> &PrepareConfig {
        &self.config
    }

    /// Execute all phases and return what was written
    pub fn run(&self) -> Result<ExportSummary> {
        let config = &self.config;
        let source = DatasetSource::from_config(config)?;
        info!(
            root = %source.root().display(),
            split = %config.split,
            count = config.count,
            "Preparing Flickr30k imagefolder"
        );

        self.progress.report_stage(PipelineStage::Acquisition);
        let acquisition = {
            let _span = spans::stage("acquisition").entered();
            let outcome = acquire(
                &source,
                &config.clone_url,
                config.auto_clone,
                self.fetcher.as_ref(),
            )?;
            source.require_files()?;
            outcome
        };

        self.progress.report_stage(PipelineStage::Extraction);
        let extraction = {
            let _span = spans::stage("extraction").entered();
            ensure_extracted(source.archive_path(), source.extracted_dir())?
        };

        self.progress.report_stage(PipelineStage::Export);
        let _span = spans::export(config.split.as_str(), config.count).entered();
        let mut writer = ImageFolderWriter::create(&config.out_dir)?;
        let mut table = AnnotationTable::open(source.annotations_path())?;
        let mut locator = ImageLocator::new(source.extracted_dir(), config.lookup);

        while writer.written() < config.count {
            let Some(record) = table.next_in_split(config.split)? else {
                break;
            };
            let Some(image) = locator.locate(record.row.image_name())? else {
                continue;
            };
            let caption = record.caption()?;
            let sample = writer.write_sample(&image, caption)?;
            self.progress.report_sample(&sample, config.count);
        }

        let out_dir = writer.out_dir().to_path_buf();
        let metadata_path = writer.metadata_path().to_path_buf();
        let written = writer.finish()?;
        self.progress.finish(written);
        debug!(written, out_dir = %out_dir.display(), "Export finished");

        Ok(ExportSummary {
            written,
            out_dir,
            metadata_path,
            acquisition,
            extraction,
        })
    }
}

/// Run the pipeline with the default git fetcher and no progress output
pub fn prepare(config: PrepareConfig) -> Result<ExportSummary> {
    DatasetPreparer::new(config)?.run()
}
