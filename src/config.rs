//! Configuration types for dataset preparation runs

use crate::error::{PrepareError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default remote used when the source directory has to be cloned
pub const DEFAULT_CLONE_URL: &str = "git@hf.co:datasets/nlphuji/flickr30k";

/// Dataset partition selected for export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    #[default]
    Train,
    Val,
    Test,
}

impl Split {
    /// Value of the `split` column this variant matches
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Train => "train",
            Self::Val => "val",
            Self::Test => "test",
        }
    }
}

impl std::fmt::Display for Split {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How rows that miss the direct path are resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupStrategy {
    /// Build a file-name index on the first miss and reuse it
    #[default]
    Indexed,
    /// Walk the extracted tree again for every miss
    Walk,
}

impl std::fmt::Display for LookupStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Indexed => write!(f, "indexed"),
            Self::Walk => write!(f, "walk"),
        }
    }
}

/// Configuration for one preparation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrepareConfig {
    /// Folder holding the image archive and the annotations table
    pub flickr_root: PathBuf,

    /// Remote cloned when the folder is missing
    pub clone_url: String,

    /// Allow cloning the remote when files are missing
    pub auto_clone: bool,

    /// Archive file name inside `flickr_root`
    pub images_zip: String,

    /// Annotations file name inside `flickr_root`
    pub annotations_csv: String,

    /// Split to export
    pub split: Split,

    /// Maximum number of exported samples
    pub count: usize,

    /// Output imagefolder directory
    pub out_dir: PathBuf,

    /// Fallback image lookup
    pub lookup: LookupStrategy,
}

impl Default for PrepareConfig {
    fn default() -> Self {
        Self {
            flickr_root: PathBuf::from("flickr30k"),
            clone_url: DEFAULT_CLONE_URL.to_string(),
            auto_clone: true,
            images_zip: "flickr30k-images.zip".to_string(),
            annotations_csv: "flickr_annotations_30k.csv".to_string(),
            split: Split::Train,
            count: 1000,
            out_dir: PathBuf::from("data/flickr1k_local"),
            lookup: LookupStrategy::Indexed,
        }
    }
}

impl PrepareConfig {
    /// Create a new configuration builder
    ///
    /// ```rust
    /// use flickr_imagefolder::{PrepareConfig, Split};
    ///
    /// let config = PrepareConfig::builder()
    ///     .split(Split::Val)
    ///     .count(50)
    ///     .auto_clone(false)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(config.count, 50);
    /// ```
    #[must_use]
    pub fn builder() -> PrepareConfigBuilder {
        PrepareConfigBuilder::default()
    }

    /// Validate configuration parameters
    ///
    /// # Errors
    /// - Empty archive or annotations file name
    /// - File names containing path separators
    /// - Auto-clone enabled with an empty remote
    pub fn validate(&self) -> Result<()> {
        Self::validate_file_name("images_zip", &self.images_zip)?;
        Self::validate_file_name("annotations_csv", &self.annotations_csv)?;

        if self.auto_clone && self.clone_url.trim().is_empty() {
            return Err(PrepareError::invalid_config(
                "clone_url must not be empty when auto-clone is enabled",
            ));
        }

        if self.out_dir.as_os_str().is_empty() {
            return Err(PrepareError::invalid_config("out_dir must not be empty"));
        }

        Ok(())
    }

    fn validate_file_name(field: &str, value: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(PrepareError::invalid_config(format!(
                "{field} must not be empty"
            )));
        }
        if value.contains('/') || value.contains('\\') {
            return Err(PrepareError::invalid_config(format!(
                "{field} must be a file name inside flickr_root, got '{value}'"
            )));
        }
        Ok(())
    }
}

/// Builder for `PrepareConfig`
#[derive(Debug, Default)]
pub struct PrepareConfigBuilder {
    config: PrepareConfig,
}

impl PrepareConfigBuilder {
    #[must_use]
    pub fn flickr_root<P: Into<PathBuf>>(mut self, root: P) -> Self {
        self.config.flickr_root = root.into();
        self
    }

    #[must_use]
    pub fn clone_url<S: Into<String>>(mut self, url: S) -> Self {
        self.config.clone_url = url.into();
        self
    }

    #[must_use]
    pub fn auto_clone(mut self, enabled: bool) -> Self {
        self.config.auto_clone = enabled;
        self
    }

    #[must_use]
    pub fn images_zip<S: Into<String>>(mut self, name: S) -> Self {
        self.config.images_zip = name.into();
        self
    }

    #[must_use]
    pub fn annotations_csv<S: Into<String>>(mut self, name: S) -> Self {
        self.config.annotations_csv = name.into();
        self
    }

    #[must_use]
    pub fn split(mut self, split: Split) -> Self {
        self.config.split = split;
        self
    }

    #[must_use]
    pub fn count(mut self, count: usize) -> Self {
        self.config.count = count;
        self
    }

    #[must_use]
    pub fn out_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.config.out_dir = dir.into();
        self
    }

    #[must_use]
    pub fn lookup(mut self, lookup: LookupStrategy) -> Self {
        self.config.lookup = lookup;
        self
    }

    /// Build the configuration, validating all parameters
    pub fn build(self) -> Result<PrepareConfig> {
        let config = self.config;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PrepareConfig::default();
        assert_eq!(config.flickr_root, PathBuf::from("flickr30k"));
        assert_eq!(config.clone_url, DEFAULT_CLONE_URL);
        assert!(config.auto_clone);
        assert_eq!(config.images_zip, "flickr30k-images.zip");
        assert_eq!(config.annotations_csv, "flickr_annotations_30k.csv");
        assert_eq!(config.split, Split::Train);
        assert_eq!(config.count, 1000);
        assert_eq!(config.out_dir, PathBuf::from("data/flickr1k_local"));
        assert_eq!(config.lookup, LookupStrategy::Indexed);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = PrepareConfig::builder()
            .flickr_root("/datasets/flickr")
            .split(Split::Test)
            .count(7)
            .auto_clone(false)
            .lookup(LookupStrategy::Walk)
            .build()
            .unwrap();

        assert_eq!(config.flickr_root, PathBuf::from("/datasets/flickr"));
        assert_eq!(config.split, Split::Test);
        assert_eq!(config.count, 7);
        assert!(!config.auto_clone);
        assert_eq!(config.lookup, LookupStrategy::Walk);
    }

    #[test]
    fn test_config_validation() {
        let mut config = PrepareConfig::default();
        config.images_zip = String::new();
        assert!(config.validate().is_err());

        let mut config = PrepareConfig::default();
        config.annotations_csv = "nested/annotations.csv".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("annotations_csv"));

        let mut config = PrepareConfig::default();
        config.clone_url = "  ".to_string();
        assert!(config.validate().is_err());

        // An empty remote is fine once cloning is disabled
        config.auto_clone = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_split_strings() {
        assert_eq!(Split::Train.as_str(), "train");
        assert_eq!(Split::Val.as_str(), "val");
        assert_eq!(Split::Test.as_str(), "test");
        assert_eq!(format!("{}", Split::Val), "val");
        assert_eq!(serde_json::to_string(&Split::Test).unwrap(), "\"test\"");
    }

    #[test]
    fn test_lookup_display() {
        assert_eq!(LookupStrategy::Indexed.to_string(), "indexed");
        assert_eq!(LookupStrategy::Walk.to_string(), "walk");
        assert_eq!(LookupStrategy::default(), LookupStrategy::Indexed);
    }
}
