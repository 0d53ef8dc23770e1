//! Error types shared by the document store, the managers and the surfaces

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Document exists but is not valid JSON for its shape
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Required form field left empty
    #[error("missing required field: {field}")]
    Validation { field: &'static str },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("video file not found: {path}")]
    MissingFile { path: PathBuf },

    #[error("unsupported video type: {filename} (expected mp4, mov or avi)")]
    UnsupportedVideo { filename: String },

    #[error("failed to render page: {0}")]
    Render(#[from] askama::Error),
}

impl Error {
    /// Errors the user can fix by resubmitting the form
    pub fn is_user_error(&self) -> bool {
        matches!(self, Error::Validation { .. } | Error::UnsupportedVideo { .. })
    }
}
