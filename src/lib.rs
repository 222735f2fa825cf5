#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]

//! # Flickr30k Imagefolder Preparation
//!
//! Converts a locally cloned Flickr30k distribution (a zip of images plus a
//! CSV of captions and splits) into a flat imagefolder dataset: renamed image
//! copies next to a `metadata.jsonl` file pairing every file with one caption.
//!
//! The run is a single synchronous pass:
//!
//! 1. **Acquisition**: make sure the archive and annotations exist, cloning the
//!    dataset repository when the source folder is missing and cloning is allowed
//! 2. **Extraction**: unpack the archive into `<root>/images` unless that folder
//!    already has content
//! 3. **Filtering and resolution**: stream annotation rows of the requested
//!    split and find each referenced image under the extracted tree
//! 4. **Export**: copy images as `img_00000.jpg`, `img_00001.jpg`, ... and append
//!    `{"file_name": ..., "text": ...}` lines until the maximum count is reached
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use flickr_imagefolder::{prepare, PrepareConfig, Split};
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = PrepareConfig::builder()
//!     .flickr_root("flickr30k")
//!     .auto_clone(false)
//!     .split(Split::Val)
//!     .count(100)
//!     .out_dir("data/flickr_val_100")
//!     .build()?;
//!
//! let summary = prepare(config)?;
//! println!("Saved {} samples to {}", summary.written, summary.out_dir.display());
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): command-line interface, progress bar, tracing subscriber
//! - `tracing-json`: JSON log output
//! - `tracing-files`: log to a file instead of stderr

pub mod annotations;
pub mod captions;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod extract;
pub mod locate;
pub mod pipeline;
pub mod progress;
pub mod source;
pub mod tracing_config;

// Public API exports
pub use annotations::{AnnotationRecord, AnnotationRow, AnnotationTable};
pub use captions::{first_caption, parse_caption_list, CaptionListError};
pub use config::{LookupStrategy, PrepareConfig, PrepareConfigBuilder, Split, DEFAULT_CLONE_URL};
pub use error::{PrepareError, Result};
pub use export::{sample_file_name, ExportedSample, ImageFolderWriter, METADATA_FILE_NAME};
pub use extract::{ensure_extracted, ExtractOutcome};
pub use locate::ImageLocator;
pub use pipeline::{prepare, DatasetPreparer, ExportSummary};
pub use progress::{
    NoOpProgressReporter, PipelineStage, ProgressReporter, TracingProgressReporter,
};
pub use source::{acquire, AcquireOutcome, DatasetFetcher, DatasetSource, GitFetcher};

#[cfg(feature = "cli")]
pub use tracing_config::init_cli_tracing;
pub use tracing_config::{TracingConfig, TracingFormat, TracingOutput};
