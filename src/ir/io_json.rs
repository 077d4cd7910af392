//! JSON reading and writing of label files.
//!
//! The label store is a single JSON document. Writes replace the whole file;
//! there is no partial update.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use super::label::LabelFile;
use crate::error::ReviewError;

/// Reads a label file from disk.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub fn read_label_json(path: &Path) -> Result<LabelFile, ReviewError> {
    let file = File::open(path).map_err(ReviewError::Io)?;
    let reader = BufReader::new(file);

    serde_json::from_reader(reader).map_err(|source| ReviewError::LabelJsonParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes a label file to disk, replacing any existing content.
///
/// The new content goes to a temporary file next to `path`, which is then
/// renamed over it; a failed write leaves the previous file untouched.
///
/// # Errors
/// Returns an error if the file cannot be created or serialized.
pub fn write_label_json(path: &Path, labels: &LabelFile) -> Result<(), ReviewError> {
    replace_file(path, |writer| {
        serde_json::to_writer_pretty(writer, labels).map_err(|source| {
            ReviewError::LabelJsonWrite {
                path: path.to_path_buf(),
                source,
            }
        })
    })
}

fn replace_file<F>(path: &Path, write: F) -> Result<(), ReviewError>
where
    F: FnOnce(&mut BufWriter<&mut File>) -> Result<(), ReviewError>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(dir).map_err(ReviewError::Io)?;

    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        write(&mut writer)?;
        writer.flush().map_err(ReviewError::Io)?;
    }
    temp.as_file().sync_all().map_err(ReviewError::Io)?;
    temp.persist(path).map_err(|err| ReviewError::Io(err.error))?;
    Ok(())
}

/// Reads a label file from a JSON string.
///
/// Useful for testing without file I/O.
pub fn from_json_str(json: &str) -> Result<LabelFile, serde_json::Error> {
    serde_json::from_str(json)
}

/// Reads a label file from raw bytes.
pub fn from_json_slice(bytes: &[u8]) -> Result<LabelFile, serde_json::Error> {
    serde_json::from_slice(bytes)
}

/// Writes a label file to a JSON string.
pub fn to_json_string(labels: &LabelFile) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(labels)
}

impl LabelFile {
    /// Loads a label file from `path`.
    pub fn load(path: &Path) -> Result<Self, ReviewError> {
        read_label_json(path)
    }

    /// Saves the label file to `path`.
    pub fn save(&self, path: &Path) -> Result<(), ReviewError> {
        write_label_json(path, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{ImageRecord, LabelObject};
    use serde_json::json;

    fn sample_labels() -> LabelFile {
        LabelFile {
            images: vec![ImageRecord {
                objects: vec![LabelObject {
                    object_type: "polygon".into(),
                    label: "arrow".into(),
                    points: json!([[1.0, 2.0], [3.0, 4.0], [5.0, 1.0]]),
                    ..Default::default()
                }],
                ..ImageRecord::new("000001.jpg").with_dimensions(640, 480)
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_json_roundtrip() {
        let original = sample_labels();

        let json = to_json_string(&original).expect("serialization failed");
        let restored = from_json_str(&json).expect("deserialization failed");

        assert_eq!(original, restored);
        assert!(json.contains("\"type\": \"polygon\""));
    }

    #[test]
    fn test_file_save_and_load() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("labels.json");

        let original = sample_labels();
        original.save(&path).expect("save label file");
        let restored = LabelFile::load(&path).expect("load label file");

        assert_eq!(original, restored);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = LabelFile::load(Path::new("does/not/exist.json")).expect_err("missing file");
        assert!(matches!(err, ReviewError::Io(_)));
    }

    #[test]
    fn test_garbage_is_parse_error() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").expect("write broken file");

        let err = read_label_json(&path).expect_err("broken file");
        assert!(matches!(err, ReviewError::LabelJsonParse { .. }));
    }

    #[test]
    fn test_failed_write_keeps_previous_file() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("labels.json");
        sample_labels().save(&path).expect("save label file");
        let before = std::fs::read_to_string(&path).expect("read label file");

        let err = replace_file(&path, |writer| {
            writer.write_all(b"{\"images\": [").map_err(ReviewError::Io)?;
            Err(ReviewError::Io(std::io::Error::other("disk full")))
        })
        .expect_err("write aborted");
        assert!(matches!(err, ReviewError::Io(_)));

        assert_eq!(std::fs::read_to_string(&path).expect("read label file"), before);
        let entries = std::fs::read_dir(dir.path()).expect("list dir").count();
        assert_eq!(entries, 1, "temporary file left behind");
    }

    #[test]
    fn test_save_replaces_existing_content() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("labels.json");
        std::fs::write(&path, "x".repeat(10_000)).expect("write filler");

        sample_labels().save(&path).expect("save label file");
        assert_eq!(LabelFile::load(&path).expect("load label file"), sample_labels());
    }
}
