//! Dataset source acquisition
//!
//! Resolves where the archive and annotations table live and, when allowed,
//! clones the remote dataset repository if they are missing.

use crate::{
    config::PrepareConfig,
    error::{PrepareError, Result},
};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info, instrument, warn};

/// Name of the directory the archive is unpacked into, inside the source root
pub const EXTRACTED_DIR_NAME: &str = "images";

/// Paths making up one local dataset distribution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetSource {
    root: PathBuf,
    archive: PathBuf,
    annotations: PathBuf,
    extracted: PathBuf,
}

impl DatasetSource {
    /// Build the source layout from a root directory and the two file names
    ///
    /// The root is made absolute against the current working directory.
    pub fn new<P: AsRef<Path>>(root: P, images_zip: &str, annotations_csv: &str) -> Result<Self> {
        let root = std::path::absolute(root.as_ref())
            .map_err(|e| PrepareError::file_io_error("resolve", root.as_ref(), &e))?;
        Ok(Self {
            archive: root.join(images_zip),
            annotations: root.join(annotations_csv),
            extracted: root.join(EXTRACTED_DIR_NAME),
            root,
        })
    }

    pub fn from_config(config: &PrepareConfig) -> Result<Self> {
        Self::new(
            &config.flickr_root,
            &config.images_zip,
            &config.annotations_csv,
        )
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn archive_path(&self) -> &Path {
        &self.archive
    }

    #[must_use]
    pub fn annotations_path(&self) -> &Path {
        &self.annotations
    }

    #[must_use]
    pub fn extracted_dir(&self) -> &Path {
        &self.extracted
    }

    /// Both required files are present
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.archive.exists() && self.annotations.exists()
    }

    /// Fail unless both the archive and the annotations table exist
    pub fn require_files(&self) -> Result<()> {
        if !self.archive.exists() {
            return Err(PrepareError::missing_archive(&self.archive));
        }
        if !self.annotations.exists() {
            return Err(PrepareError::missing_annotations(&self.annotations));
        }
        Ok(())
    }
}

/// Fetches a remote dataset repository into a local directory
pub trait DatasetFetcher {
    /// Materialize `remote` at `destination`, which does not exist yet
    ///
    /// # Errors
    ///
    /// Returns `PrepareError::Fetch` when the remote cannot be fetched.
    fn fetch(&self, remote: &str, destination: &Path) -> Result<()>;
}

/// Fetcher that runs `git clone`
#[derive(Debug, Clone)]
pub struct GitFetcher {
    program: String,
}

impl Default for GitFetcher {
    fn default() -> Self {
        Self {
            program: "git".to_string(),
        }
    }
}

impl GitFetcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different git executable
    #[must_use]
    pub fn with_program<S: Into<String>>(program: S) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl DatasetFetcher for GitFetcher {
    fn fetch(&self, remote: &str, destination: &Path) -> Result<()> {
        info!("Cloning Flickr30k repo from {} ...", remote);
        let status = Command::new(&self.program)
            .arg("clone")
            .arg(remote)
            .arg(destination)
            .status()
            .map_err(|e| PrepareError::fetch(remote, format!("failed to run {}: {e}", self.program)))?;

        if !status.success() {
            return Err(PrepareError::fetch(
                remote,
                format!("{} clone exited with {status}", self.program),
            ));
        }
        Ok(())
    }
}

/// What the acquisition phase did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// Archive and annotations were already present
    AlreadyPresent,
    /// The remote was cloned into the source root
    Fetched,
    /// Files were missing but the root exists, so no clone was attempted
    SkippedExistingRoot,
    /// Files were missing and cloning is disabled
    FetchDisabled,
}

/// Ensure the archive and annotations are available, cloning if permitted
///
/// A missing file after this call is reported by
/// [`DatasetSource::require_files`], not here.
#[instrument(skip(source, fetcher), fields(root = %source.root().display()))]
pub fn acquire(
    source: &DatasetSource,
    remote: &str,
    auto_clone: bool,
    fetcher: &dyn DatasetFetcher,
) -> Result<AcquireOutcome> {
    if source.is_complete() {
        debug!("Archive and annotations already present");
        return Ok(AcquireOutcome::AlreadyPresent);
    }

    if !auto_clone {
        debug!("Required files missing and auto-clone is disabled");
        return Ok(AcquireOutcome::FetchDisabled);
    }

    if source.root().exists() {
        warn!(
            root = %source.root().display(),
            "Local flickr_root exists but required files are missing. Skipping auto-clone because target directory already exists."
        );
        return Ok(AcquireOutcome::SkippedExistingRoot);
    }

    if let Some(parent) = source.root().parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| PrepareError::file_io_error("create parent directory", parent, &e))?;
    }

    fetcher.fetch(remote, source.root())?;
    Ok(AcquireOutcome::Fetched)
}
