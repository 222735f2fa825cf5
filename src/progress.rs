//! Progress reporting service
//!
//! Keeps progress display out of the pipeline so the CLI can render a bar
//! while library callers stay silent.

use crate::export::ExportedSample;
use std::time::Instant;

/// Pipeline phases, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Acquisition,
    Extraction,
    Export,
    Completed,
}

impl PipelineStage {
    /// Human-readable description of the stage
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            PipelineStage::Acquisition => "Checking dataset source",
            PipelineStage::Extraction => "Extracting image archive",
            PipelineStage::Export => "Exporting samples",
            PipelineStage::Completed => "Export completed",
        }
    }
}

/// Receives progress events from a preparation run
pub trait ProgressReporter {
    /// A new stage started
    fn report_stage(&self, stage: PipelineStage);

    /// A sample was written; `target` is the configured maximum count
    fn report_sample(&self, sample: &ExportedSample, target: usize);

    /// The run finished with `written` samples
    fn finish(&self, written: usize);
}

/// Reporter that ignores every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpProgressReporter;

impl ProgressReporter for NoOpProgressReporter {
    fn report_stage(&self, _stage: PipelineStage) {}

    fn report_sample(&self, _sample: &ExportedSample, _target: usize) {}

    fn finish(&self, _written: usize) {}
}

/// Reporter that emits stage changes and periodic counts as tracing events
#[derive(Debug)]
pub struct TracingProgressReporter {
    started: Instant,
    every: usize,
}

impl TracingProgressReporter {
    /// Log a count line every `every` samples (at least 1)
    #[must_use]
    pub fn new(every: usize) -> Self {
        Self {
            started: Instant::now(),
            every: every.max(1),
        }
    }

    fn should_log(&self, written: usize) -> bool {
        written % self.every == 0
    }
}

impl Default for TracingProgressReporter {
    fn default() -> Self {
        Self::new(100)
    }
}

impl ProgressReporter for TracingProgressReporter {
    fn report_stage(&self, stage: PipelineStage) {
        tracing::info!(stage = ?stage, "{}", stage.description());
    }

    fn report_sample(&self, sample: &ExportedSample, target: usize) {
        let written = sample.index + 1;
        if self.should_log(written) {
            tracing::info!(written, target, "Exported {}/{} samples", written, target);
        }
    }

    fn finish(&self, written: usize) {
        tracing::info!(
            written,
            elapsed_s = self.started.elapsed().as_secs_f64(),
            "{}",
            PipelineStage::Completed.description()
        );
    }
}
