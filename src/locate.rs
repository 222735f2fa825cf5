//! Resolution of annotation file names to extracted image paths

use crate::{config::LookupStrategy, error::Result};
use std::collections::HashMap;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// Finds image files under the extracted archive root
///
/// A name is first tried as a path relative to the root. On a miss the tree
/// is searched for a regular file, or a symlink to one, with exactly that
/// name; the first match in file-name-sorted walk order wins.
#[derive(Debug)]
pub struct ImageLocator {
    root: PathBuf,
    strategy: LookupStrategy,
    index: Option<HashMap<OsString, PathBuf>>,
}

impl ImageLocator {
    pub fn new<P: Into<PathBuf>>(root: P, strategy: LookupStrategy) -> Self {
        Self {
            root: root.into(),
            strategy,
            index: None,
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn strategy(&self) -> LookupStrategy {
        self.strategy
    }

    /// Path of the image called `filename`, or `None` if nothing matches
    pub fn locate(&mut self, filename: &str) -> Result<Option<PathBuf>> {
        let direct = self.root.join(filename);
        if direct.is_file() {
            return Ok(Some(direct));
        }

        let name = OsStr::new(filename);
        match self.strategy {
            LookupStrategy::Walk => walk_for(&self.root, name),
            LookupStrategy::Indexed => {
                if self.index.is_none() {
                    self.index = Some(build_index(&self.root)?);
                }
                Ok(self
                    .index
                    .as_ref()
                    .and_then(|index| index.get(name))
                    .cloned())
            },
        }
    }
}

fn sorted_walk(root: &Path) -> WalkDir {
    WalkDir::new(root).sort_by_file_name()
}

/// Regular files and symlinks to regular files; links are listed, not followed
fn is_file_entry(entry: &DirEntry) -> bool {
    entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file())
}

/// Fresh recursive search for a file called `name`
pub fn walk_for(root: &Path, name: &OsStr) -> Result<Option<PathBuf>> {
    for entry in sorted_walk(root) {
        let entry = entry?;
        if is_file_entry(&entry) && entry.file_name() == name {
            return Ok(Some(entry.into_path()));
        }
    }
    Ok(None)
}

/// Map every file name under `root` to its first occurrence
pub fn build_index(root: &Path) -> Result<HashMap<OsString, PathBuf>> {
    let mut index = HashMap::new();
    for entry in sorted_walk(root) {
        let entry = entry?;
        if is_file_entry(&entry) {
            index
                .entry(entry.file_name().to_os_string())
                .or_insert_with(|| entry.path().to_path_buf());
        }
    }
    debug!(root = %root.display(), files = index.len(), "Built image file index");
    Ok(index)
}
