//! Config module - where the documents and uploaded videos live

use std::path::{Path, PathBuf};

pub const PLAN_FILE: &str = "treinos.json";
pub const LOG_FILE: &str = "registro_treinos.json";
pub const VIDEOS_FILE: &str = "videos.json";
pub const VIDEO_DIR: &str = "videos";

/// Resolved storage paths
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub plan_path: PathBuf,
    pub log_path: PathBuf,
    pub catalog_path: PathBuf,
    pub video_dir: PathBuf,
}

impl Config {
    /// Default file names inside `data_dir`
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self::with_names(data_dir, PLAN_FILE, LOG_FILE, VIDEOS_FILE, VIDEO_DIR)
    }

    pub fn with_names(
        data_dir: impl AsRef<Path>,
        plan_file: &str,
        log_file: &str,
        videos_file: &str,
        video_dir: &str,
    ) -> Self {
        let root = data_dir.as_ref();
        Self {
            plan_path: root.join(plan_file),
            log_path: root.join(log_file),
            catalog_path: root.join(videos_file),
            video_dir: root.join(video_dir),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(".")
    }
}
