//! Document store - whole-file JSON persistence
//!
//! Every document is read in full and rewritten in full. Writes land in a
//! hidden sibling file first and are renamed over the target once synced.

use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

/// Load a document, or return `default` untouched if the file is absent
pub fn load<T: DeserializeOwned>(path: &Path, default: T) -> Result<T> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(default),
        Err(source) => {
            return Err(Error::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    serde_json::from_str(&text).map_err(|source| Error::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Serialize `document` as pretty JSON and replace the file at `path`
pub fn save<T: Serialize>(path: &Path, document: &T) -> Result<()> {
    let json = serde_json::to_vec_pretty(document).map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source: source.into(),
    })?;
    write_atomic(path, &mut json.as_slice())?;
    Ok(())
}

/// Copy `reader` into `path` through a temporary sibling.
///
/// On failure the temporary file is removed and `path` is left as it was.
pub fn write_atomic(path: &Path, reader: &mut impl Read) -> Result<u64> {
    let to_write_err = |source: io::Error| Error::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(to_write_err)?;
    }

    let tmp = temp_path(path);
    let result = copy_and_sync(&tmp, reader).and_then(|written| {
        fs::rename(&tmp, path)?;
        Ok(written)
    });

    match result {
        Ok(written) => Ok(written),
        Err(source) => {
            let _ = fs::remove_file(&tmp);
            Err(to_write_err(source))
        }
    }
}

/// Create a directory and its parents if missing
pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn copy_and_sync(tmp: &Path, reader: &mut impl Read) -> io::Result<u64> {
    let file = File::create(tmp)?;
    let mut writer = BufWriter::new(file);
    let written = io::copy(reader, &mut writer)?;
    let file = writer.into_inner().map_err(|err| err.into_error())?;
    file.sync_all()?;
    Ok(written)
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.tmp"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[test]
    fn test_load_missing_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let default = json!({"monday": []});
        let loaded = load(&dir.path().join("absent.json"), default.clone()).unwrap();
        assert_eq!(loaded, default);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        let doc = json!([{"data": "2024-05-01", "peso_usado": "60kg"}]);

        save(&path, &doc).unwrap();
        let loaded: Value = load(&path, Value::Null).unwrap();
        assert_eq!(loaded, doc);
    }

    #[test]
    fn test_save_is_pretty_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        save(&path, &json!({"a": [1, 2]})).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains('\n'));
        assert!(!dir.path().join(".doc.json.tmp").exists());
    }

    #[test]
    fn test_save_overwrites_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        save(&path, &json!([1, 2, 3])).unwrap();
        save(&path, &json!([])).unwrap();

        let loaded: Value = load(&path, Value::Null).unwrap();
        assert_eq!(loaded, json!([]));
    }

    #[test]
    fn test_load_invalid_json_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        let err = load(&path, Value::Null).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn test_save_into_missing_parent_creates_it() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("doc.json");
        save(&path, &json!({})).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_write_atomic_failure_keeps_target() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        fs::write(&path, b"old").unwrap();

        struct Failing;
        impl Read for Failing {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::other("stream dropped"))
            }
        }

        let err = write_atomic(&path, &mut Failing).unwrap_err();
        assert!(matches!(err, Error::Write { .. }));
        assert_eq!(fs::read(&path).unwrap(), b"old");
        assert!(!dir.path().join(".clip.mp4.tmp").exists());
    }

    #[test]
    fn test_ensure_dir_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let videos = dir.path().join("videos");
        ensure_dir(&videos).unwrap();
        ensure_dir(&videos).unwrap();
        assert!(videos.is_dir());
    }
}
