//! Configuration conversion utilities for CLI arguments

use crate::cli::main_impl::{Cli, CliLookup, CliSplit};
use crate::config::{LookupStrategy, PrepareConfig, Split};
use anyhow::{Context, Result};

/// Convert CLI arguments to a validated `PrepareConfig`
pub(crate) struct CliConfigBuilder;

impl CliConfigBuilder {
    /// Build `PrepareConfig` from CLI arguments
    pub(crate) fn from_cli(cli: &Cli) -> Result<PrepareConfig> {
        let split = match cli.split {
            CliSplit::Train => Split::Train,
            CliSplit::Val => Split::Val,
            CliSplit::Test => Split::Test,
        };

        let lookup = match cli.lookup {
            CliLookup::Indexed => LookupStrategy::Indexed,
            CliLookup::Walk => LookupStrategy::Walk,
        };

        PrepareConfig::builder()
            .flickr_root(&cli.flickr_root)
            .clone_url(cli.clone_url.as_str())
            .auto_clone(!cli.no_clone)
            .images_zip(cli.images_zip.as_str())
            .annotations_csv(cli.annotations_csv.as_str())
            .split(split)
            .count(cli.count)
            .out_dir(&cli.out_dir)
            .lookup(lookup)
            .build()
            .context("Invalid configuration")
    }
}
