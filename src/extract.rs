//! Image archive extraction

use crate::error::{PrepareError, Result};
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::Path;
use tracing::{debug, info, instrument};
use zip::ZipArchive;

/// What the extraction phase did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractOutcome {
    /// Target directory already had content
    Skipped,
    /// Archive was unpacked; `entries` counts files and directories written
    Extracted { entries: usize },
}

/// True when `dir` exists and has at least one entry
pub fn has_contents(dir: &Path) -> Result<bool> {
    if !dir.is_dir() {
        return Ok(false);
    }
    let mut entries =
        fs::read_dir(dir).map_err(|e| PrepareError::file_io_error("list directory", dir, &e))?;
    Ok(entries.next().is_some())
}

/// Unpack `archive` into `target` unless `target` is already populated
#[instrument(skip_all, fields(archive = %archive.display(), target = %target.display()))]
pub fn ensure_extracted(archive: &Path, target: &Path) -> Result<ExtractOutcome> {
    if has_contents(target)? {
        debug!("Extracted images directory is non-empty, skipping extraction");
        return Ok(ExtractOutcome::Skipped);
    }

    info!("Extracting images from {} ...", archive.display());
    let entries = extract_archive(archive, target)?;
    debug!(entries, "Extraction complete");
    Ok(ExtractOutcome::Extracted { entries })
}

/// Unpack every entry of `archive` into `target`, preserving its layout
pub fn extract_archive(archive: &Path, target: &Path) -> Result<usize> {
    fs::create_dir_all(target)
        .map_err(|e| PrepareError::file_io_error("create extraction directory", target, &e))?;

    let file = File::open(archive)
        .map_err(|e| PrepareError::file_io_error("open archive", archive, &e))?;
    let mut zip = ZipArchive::new(BufReader::new(file)).map_err(|e| {
        PrepareError::extraction(format!("invalid ZIP archive {}: {e}", archive.display()))
    })?;

    let mut written = 0;
    for index in 0..zip.len() {
        let mut entry = zip.by_index(index)?;
        let Some(relative) = entry.enclosed_name() else {
            return Err(PrepareError::extraction(format!(
                "entry '{}' escapes the extraction directory",
                entry.name()
            )));
        };
        let out_path = target.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path)
                .map_err(|e| PrepareError::file_io_error("create directory", &out_path, &e))?;
        } else {
            if let Some(parent) = out_path.parent() {
                fs::create_dir_all(parent)
                    .map_err(|e| PrepareError::file_io_error("create directory", parent, &e))?;
            }
            let mut out = File::create(&out_path)
                .map_err(|e| PrepareError::file_io_error("create file", &out_path, &e))?;
            io::copy(&mut entry, &mut out)
                .map_err(|e| PrepareError::file_io_error("write extracted file", &out_path, &e))?;
        }
        written += 1;
    }

    Ok(written)
}
