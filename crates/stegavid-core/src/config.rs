use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::error::StegError;
use crate::media::payload::DEFAULT_SEARCH_WINDOW;
use crate::result::Result;

/// Settings passed into every engine call, nothing is kept process wide
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// where scratch files go, the system temp dir when `None`
    pub temp_dir: Option<PathBuf>,
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
    /// bytes from the start of a recovered stream the start marker has to appear in
    pub search_window: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            temp_dir: None,
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
            search_window: DEFAULT_SEARCH_WINDOW,
        }
    }
}

impl EngineConfig {
    pub fn with_temp_dir<P: AsRef<Path>>(mut self, temp_dir: P) -> Self {
        self.temp_dir = Some(temp_dir.as_ref().to_path_buf());
        self
    }

    pub fn with_ffmpeg<P: AsRef<Path>>(mut self, ffmpeg: P) -> Self {
        self.ffmpeg = ffmpeg.as_ref().to_path_buf();
        self
    }

    pub fn with_ffprobe<P: AsRef<Path>>(mut self, ffprobe: P) -> Self {
        self.ffprobe = ffprobe.as_ref().to_path_buf();
        self
    }

    pub fn with_search_window(mut self, search_window: usize) -> Self {
        self.search_window = search_window;
        self
    }

    /// a fresh scratch directory, removed when the guard is dropped
    pub fn scratch_dir(&self) -> Result<TempDir> {
        let base = self.temp_dir.clone().unwrap_or_else(std::env::temp_dir);

        tempfile::Builder::new()
            .prefix("stegavid-")
            .tempdir_in(base)
            .map_err(|source| StegError::WriteError { source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scratch_dir_is_removed_on_drop() {
        let base = tempfile::tempdir().unwrap();
        let config = EngineConfig::default().with_temp_dir(base.path());

        let scratch = config.scratch_dir().unwrap();
        let path = scratch.path().to_path_buf();
        assert!(path.starts_with(base.path()));
        assert!(path.is_dir());

        drop(scratch);
        assert!(!path.exists());
    }
}
