//! Imagefolder output: renamed image copies plus `metadata.jsonl`

use crate::error::{PrepareError, Result};
use serde::{Deserialize, Serialize};
use serde_json::ser::{Formatter, Serializer};
use std::fs::{self, File, FileTimes};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Name of the metadata file inside the output directory
pub const METADATA_FILE_NAME: &str = "metadata.jsonl";

/// Destination name for the sample at `index`
#[must_use]
pub fn sample_file_name(index: usize) -> String {
    format!("img_{index:05}.jpg")
}

/// One exported image and its caption, as written to `metadata.jsonl`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedSample {
    #[serde(skip)]
    pub index: usize,
    pub file_name: String,
    pub text: String,
}

/// JSON formatter with `": "` and `", "` separators and no other whitespace
///
/// Lines look like `{"file_name": "img_00000.jpg", "text": "A dog runs ."}`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W: ?Sized + Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W: ?Sized + Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }
}

/// Write `sample` as one `metadata.jsonl` line, newline included
pub fn write_metadata_line<W: Write>(writer: &mut W, sample: &ExportedSample) -> io::Result<()> {
    let mut serializer = Serializer::with_formatter(&mut *writer, SpacedFormatter);
    sample.serialize(&mut serializer).map_err(io::Error::from)?;
    writer.write_all(b"\n")
}

/// Copy `src` to `dst` together with its permissions and timestamps
pub fn copy_with_metadata(src: &Path, dst: &Path) -> Result<()> {
    fs::copy(src, dst).map_err(|e| PrepareError::file_io_error("copy image", src, &e))?;

    let meta =
        fs::metadata(src).map_err(|e| PrepareError::file_io_error("read metadata", src, &e))?;
    let mut times = FileTimes::new();
    if let Ok(accessed) = meta.accessed() {
        times = times.set_accessed(accessed);
    }
    if let Ok(modified) = meta.modified() {
        times = times.set_modified(modified);
    }
    // Read-only sources produce read-only copies; timestamps are then left as is
    if let Err(e) = File::options()
        .write(true)
        .open(dst)
        .and_then(|dest| dest.set_times(times))
    {
        debug!(dst = %dst.display(), error = %e, "Could not copy file times");
    }
    Ok(())
}

/// Writes samples into an imagefolder directory
///
/// Opening the writer creates the directory and truncates any previous
/// `metadata.jsonl`. Sample indices start at zero and only advance when a
/// sample is actually written.
pub struct ImageFolderWriter {
    out_dir: PathBuf,
    metadata_path: PathBuf,
    metadata: BufWriter<File>,
    written: usize,
}

impl ImageFolderWriter {
    pub fn create<P: AsRef<Path>>(out_dir: P) -> Result<Self> {
        let out_dir = out_dir.as_ref().to_path_buf();
        fs::create_dir_all(&out_dir)
            .map_err(|e| PrepareError::file_io_error("create output directory", &out_dir, &e))?;

        let metadata_path = out_dir.join(METADATA_FILE_NAME);
        let file = File::create(&metadata_path)
            .map_err(|e| PrepareError::file_io_error("create metadata file", &metadata_path, &e))?;

        Ok(Self {
            out_dir,
            metadata_path,
            metadata: BufWriter::new(file),
            written: 0,
        })
    }

    #[must_use]
    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    #[must_use]
    pub fn metadata_path(&self) -> &Path {
        &self.metadata_path
    }

    /// Samples written so far
    #[must_use]
    pub fn written(&self) -> usize {
        self.written
    }

    /// Copy `source_image` in as the next sample and record its caption
    pub fn write_sample(&mut self, source_image: &Path, caption: String) -> Result<ExportedSample> {
        let sample = ExportedSample {
            index: self.written,
            file_name: sample_file_name(self.written),
            text: caption,
        };
        let dst = self.out_dir.join(&sample.file_name);
        copy_with_metadata(source_image, &dst)?;

        write_metadata_line(&mut self.metadata, &sample)
            .map_err(|e| PrepareError::file_io_error("write metadata", &self.metadata_path, &e))?;

        trace!(src = %source_image.display(), dst = %dst.display(), "Exported sample");
        self.written += 1;
        Ok(sample)
    }

    /// Flush the metadata file and return the number of samples written
    pub fn finish(mut self) -> Result<usize> {
        self.metadata
            .flush()
            .map_err(|e| PrepareError::file_io_error("flush metadata", &self.metadata_path, &e))?;
        Ok(self.written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    #[test]
    fn test_sample_file_names() {
        assert_eq!(sample_file_name(0), "img_00000.jpg");
        assert_eq!(sample_file_name(42), "img_00042.jpg");
        assert_eq!(sample_file_name(99_999), "img_99999.jpg");
        assert_eq!(sample_file_name(123_456), "img_123456.jpg");
    }

    #[test]
    fn test_metadata_line_format() {
        let sample = ExportedSample {
            index: 3,
            file_name: "img_00003.jpg".to_string(),
            text: "Un garçon \"joue\" à Zürich".to_string(),
        };
        let mut line = Vec::new();
        write_metadata_line(&mut line, &sample).unwrap();
        assert_eq!(
            String::from_utf8(line).unwrap(),
            "{\"file_name\": \"img_00003.jpg\", \"text\": \"Un garçon \\\"joue\\\" à Zürich\"}\n"
        );
    }

    #[test]
    fn test_metadata_line_escapes_control_characters() {
        let sample = ExportedSample {
            index: 0,
            file_name: "img_00000.jpg".to_string(),
            text: "tab\there\nnew \\ \u{1}".to_string(),
        };
        let mut line = Vec::new();
        write_metadata_line(&mut line, &sample).unwrap();
        assert_eq!(
            String::from_utf8(line).unwrap(),
            r#"{"file_name": "img_00000.jpg", "text": "tab\there\nnew \\ \u0001"}"#.to_string() + "\n"
        );
    }

    #[test]
    fn test_spaced_formatter_arrays() {
        let mut out = Vec::new();
        let mut serializer = Serializer::with_formatter(&mut out, SpacedFormatter);
        ["a", "b"].serialize(&mut serializer).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), r#"["a", "b"]"#);
    }

    #[test]
    fn test_writer_copies_and_records() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src.jpg");
        fs::write(&src, b"jpeg bytes").unwrap();
        let out = temp.path().join("out/nested");

        let mut writer = ImageFolderWriter::create(&out).unwrap();
        let first = writer.write_sample(&src, "a cat".to_string()).unwrap();
        let second = writer.write_sample(&src, String::new()).unwrap();
        assert_eq!(first.index, 0);
        assert_eq!(second.file_name, "img_00001.jpg");
        assert_eq!(writer.finish().unwrap(), 2);

        assert_eq!(fs::read(out.join("img_00000.jpg")).unwrap(), b"jpeg bytes");
        assert_eq!(fs::read(out.join("img_00001.jpg")).unwrap(), b"jpeg bytes");
        let metadata = fs::read_to_string(out.join(METADATA_FILE_NAME)).unwrap();
        assert_eq!(
            metadata,
            "{\"file_name\": \"img_00000.jpg\", \"text\": \"a cat\"}\n\
             {\"file_name\": \"img_00001.jpg\", \"text\": \"\"}\n"
        );
    }

    #[test]
    fn test_create_truncates_previous_metadata() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(METADATA_FILE_NAME), "stale\n").unwrap();

        let writer = ImageFolderWriter::create(temp.path()).unwrap();
        assert_eq!(writer.finish().unwrap(), 0);
        assert_eq!(
            fs::read_to_string(temp.path().join(METADATA_FILE_NAME)).unwrap(),
            ""
        );
    }

    #[test]
    fn test_copy_preserves_modified_time() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src.jpg");
        fs::write(&src, b"x").unwrap();
        let past = SystemTime::UNIX_EPOCH + Duration::from_secs(1_500_000_000);
        File::options()
            .write(true)
            .open(&src)
            .unwrap()
            .set_modified(past)
            .unwrap();

        let dst = temp.path().join("dst.jpg");
        copy_with_metadata(&src, &dst).unwrap();
        assert_eq!(fs::metadata(&dst).unwrap().modified().unwrap(), past);
    }

    #[test]
    fn test_missing_source_fails() {
        let temp = TempDir::new().unwrap();
        let mut writer = ImageFolderWriter::create(temp.path()).unwrap();
        let err = writer
            .write_sample(&temp.path().join("absent.jpg"), "x".to_string())
            .unwrap_err();
        assert!(matches!(err, PrepareError::Io(_)));
        assert_eq!(writer.written(), 0);
    }
}
