use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::StegError;
use crate::result::Result;

/// Description of a hidden file, stored as JSON inside the envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub filename: String,
    #[serde(rename = "filesize", alias = "size")]
    pub size: u64,
    /// including the leading dot, empty when the file has none
    #[serde(default)]
    pub extension: String,
}

impl Metadata {
    pub fn for_file(path: &Path, size: u64) -> Result<Self> {
        let Some(filename) = path.file_name().and_then(|f| f.to_str()) else {
            return Err(StegError::InvalidFileName);
        };
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{e}"))
            .unwrap_or_default();

        Ok(Self {
            filename: filename.to_string(),
            size,
            extension,
        })
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_json(raw: &[u8]) -> Result<Self> {
        serde_json::from_slice(raw)
            .map_err(|e| StegError::CorruptMetadata(format!("metadata is not valid: {e}")))
    }

    /// the stored file name stripped from any directory part
    pub fn safe_file_name(&self) -> Result<&str> {
        Path::new(&self.filename)
            .file_name()
            .and_then(|f| f.to_str())
            .filter(|f| !f.is_empty())
            .ok_or(StegError::InvalidFileName)
    }

    /// a path inside `folder` that does not exist yet, `name.ext` then `name_1.ext` and so on
    pub fn unique_target(&self, folder: &Path) -> Result<PathBuf> {
        let file_name = self.safe_file_name()?;
        let candidate = folder.join(file_name);
        if !candidate.exists() {
            return Ok(candidate);
        }

        let name = Path::new(file_name);
        let stem = name
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(file_name);
        let extension = name
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{e}"))
            .unwrap_or_default();

        let mut counter = 1usize;
        loop {
            let candidate = folder.join(format!("{stem}_{counter}{extension}"));
            if !candidate.exists() {
                return Ok(candidate);
            }
            counter += 1;
        }
    }
}
