//! Flickr30k imagefolder preparation tool
//!
//! Converts a local Flickr30k distribution (image zip plus annotations CSV)
//! into an imagefolder directory with a `metadata.jsonl` caption file.

#[cfg(feature = "cli")]
use flickr_imagefolder::cli;

#[cfg(feature = "cli")]
fn main() -> anyhow::Result<()> {
    cli::main()
}

#[cfg(not(feature = "cli"))]
fn main() {
    panic!("CLI feature not enabled. Please rebuild with --features cli");
}
