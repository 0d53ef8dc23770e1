//! Video intake - uploaded demonstration clips and their catalog

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};
use crate::store;

/// Accepted upload extensions
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VideoEntry {
    #[serde(rename = "arquivo")]
    pub stored_filename: String,
    #[serde(rename = "descricao")]
    pub description: String,
    #[serde(rename = "data")]
    pub date: NaiveDate,
}

/// Catalog entry resolved against the video directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoListing<'a> {
    pub entry: &'a VideoEntry,
    pub path: PathBuf,
    pub present: bool,
}

/// VideoCatalog document, stored oldest first
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct VideoCatalog(Vec<VideoEntry>);

impl VideoCatalog {
    /// Copy `stream` into `video_dir` and append a catalog entry.
    ///
    /// The stored name is `{YYYYMMDD_HHMMSS}_{original}` at second precision,
    /// so two uploads of the same name within one second overwrite each other.
    /// Nothing is appended unless the file was fully written.
    pub fn store_video(
        &mut self,
        video_dir: &Path,
        stream: &mut impl Read,
        original_filename: &str,
        description: &str,
        now: NaiveDateTime,
    ) -> Result<&VideoEntry> {
        let description = description.trim();
        if description.is_empty() {
            return Err(Error::Validation { field: "description" });
        }
        let original = sanitize_filename(original_filename)?;
        check_extension(&original)?;

        let stored_filename = stored_filename(now, &original);
        let target = video_dir.join(&stored_filename);

        let mut head = [0u8; 8192];
        let n = read_head(stream, &mut head).map_err(|source| Error::Write {
            path: target.clone(),
            source,
        })?;
        if n == 0 {
            return Err(Error::Validation { field: "video" });
        }

        let mut full = (&head[..n]).chain(stream);
        let written = store::write_atomic(&target, &mut full)?;
        info!("Stored video {} ({} bytes)", stored_filename, written);

        self.0.push(VideoEntry {
            stored_filename,
            description: description.to_string(),
            date: now.date(),
        });
        Ok(&self.0[self.0.len() - 1])
    }

    /// Entries newest first, each with its on-disk path
    pub fn list_videos(&self, video_dir: &Path) -> Vec<VideoListing<'_>> {
        self.0
            .iter()
            .rev()
            .map(|entry| {
                let path = video_dir.join(&entry.stored_filename);
                let present = path.is_file();
                VideoListing { entry, path, present }
            })
            .collect()
    }

    pub fn find(&self, stored_filename: &str) -> Option<&VideoEntry> {
        self.0.iter().find(|e| e.stored_filename == stored_filename)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

pub fn stored_filename(now: NaiveDateTime, original_filename: &str) -> String {
    format!("{}_{}", now.format("%Y%m%d_%H%M%S"), original_filename)
}

/// Last path component of an uploaded name (browsers may send full paths)
pub fn sanitize_filename(original: &str) -> Result<String> {
    let name = original.rsplit(['/', '\\']).next().unwrap_or("").trim();
    if name.is_empty() || name == "." || name == ".." {
        return Err(Error::Validation { field: "filename" });
    }
    Ok(name.to_string())
}

pub fn check_extension(filename: &str) -> Result<()> {
    let ext = Path::new(filename)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase());
    match ext {
        Some(ext) if VIDEO_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
        _ => Err(Error::UnsupportedVideo {
            filename: filename.to_string(),
        }),
    }
}

pub fn content_type(filename: &str) -> String {
    mime_guess::from_path(filename)
        .first_or_octet_stream()
        .to_string()
}

fn read_head(stream: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        match stream.read(buf) {
            Ok(n) => return Ok(n),
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
}
