//! Shared fixtures for integration tests
//!
//! Builds a miniature Flickr30k distribution on disk: a zip of fake JPEG files
//! under `flickr30k-images/` and an annotations CSV with the real column layout.

#![allow(dead_code)]

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

pub const ZIP_NAME: &str = "flickr30k-images.zip";
pub const CSV_NAME: &str = "flickr_annotations_30k.csv";

/// One annotations row
#[derive(Debug, Clone)]
pub struct Row {
    pub raw: String,
    pub split: String,
    pub filename: String,
}

impl Row {
    pub fn new(split: &str, filename: &str, raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            split: split.to_string(),
            filename: filename.to_string(),
        }
    }
}

/// Bytes stored for a fake image, unique per name
pub fn image_bytes(name: &str) -> Vec<u8> {
    let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0];
    bytes.extend_from_slice(name.as_bytes());
    bytes
}

/// Temporary workspace holding a dataset root and an output directory
pub struct DatasetFixture {
    pub temp: TempDir,
    pub root: PathBuf,
    pub out_dir: PathBuf,
}

impl DatasetFixture {
    /// Create an empty workspace; nothing exists under `root` yet
    pub fn empty() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let root = temp.path().join("flickr30k");
        let out_dir = temp.path().join("out");
        Self {
            temp,
            root,
            out_dir,
        }
    }

    /// Workspace with a zip of `images` and a CSV of `rows`
    pub fn with_dataset(images: &[&str], rows: &[Row]) -> Self {
        let fixture = Self::empty();
        fs::create_dir_all(&fixture.root).expect("Failed to create dataset root");
        write_zip(&fixture.root.join(ZIP_NAME), images);
        write_csv(&fixture.root.join(CSV_NAME), rows);
        fixture
    }

    pub fn zip_path(&self) -> PathBuf {
        self.root.join(ZIP_NAME)
    }

    pub fn csv_path(&self) -> PathBuf {
        self.root.join(CSV_NAME)
    }

    pub fn extracted_dir(&self) -> PathBuf {
        self.root.join("images")
    }

    /// Metadata lines as (file_name, text) pairs
    pub fn metadata(&self) -> Vec<(String, String)> {
        let content = fs::read_to_string(self.out_dir.join("metadata.jsonl"))
            .expect("Failed to read metadata.jsonl");
        content
            .lines()
            .map(|line| {
                let value: serde_json::Value =
                    serde_json::from_str(line).expect("metadata line is not JSON");
                (
                    value["file_name"].as_str().unwrap().to_string(),
                    value["text"].as_str().unwrap().to_string(),
                )
            })
            .collect()
    }

    /// Exported image file names, sorted
    pub fn exported_images(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(&self.out_dir)
            .expect("Failed to list output directory")
            .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
            .filter(|name| name.ends_with(".jpg"))
            .collect();
        names.sort();
        names
    }

    pub fn exported_bytes(&self, file_name: &str) -> Vec<u8> {
        fs::read(self.out_dir.join(file_name)).expect("Failed to read exported image")
    }
}

/// Write a zip with every image under `flickr30k-images/`
pub fn write_zip(path: &Path, images: &[&str]) {
    let mut zip = ZipWriter::new(File::create(path).expect("Failed to create zip"));
    let options = SimpleFileOptions::default();
    zip.add_directory("flickr30k-images/", options).unwrap();
    for name in images {
        zip.start_file(format!("flickr30k-images/{name}"), options)
            .unwrap();
        zip.write_all(&image_bytes(name)).unwrap();
    }
    zip.finish().unwrap();
}

/// Write the annotations CSV with the column order of the real table
pub fn write_csv(path: &Path, rows: &[Row]) {
    let mut writer = csv::Writer::from_path(path).expect("Failed to create csv");
    writer
        .write_record(["raw", "sentids", "split", "filename", "img_id"])
        .unwrap();
    for (i, row) in rows.iter().enumerate() {
        writer
            .write_record([
                row.raw.as_str(),
                "[0, 1, 2, 3, 4]",
                row.split.as_str(),
                row.filename.as_str(),
                i.to_string().as_str(),
            ])
            .unwrap();
    }
    writer.flush().unwrap();
}
