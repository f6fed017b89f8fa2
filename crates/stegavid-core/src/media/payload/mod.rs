//! Self describing envelope around a hidden payload.
//!
//! Every method frames its payload between fixed ASCII markers, the exact
//! field set depends on the [`EnvelopeFormat`]. Building is done in one go,
//! parsing is incremental because bytes trickle in as they are recovered
//! from the carrier.

mod crypted;
mod framer;
mod markers;
mod metadata;
mod parser;

pub use crypted::*;
pub use framer::*;
pub use markers::*;
pub use metadata::*;
pub use parser::*;

/// The data to hide plus, for files, a description of it
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Payload {
    pub data: Vec<u8>,
    pub metadata: Option<Metadata>,
}

impl Payload {
    pub fn from_text(text: &str) -> Self {
        Self {
            data: text.as_bytes().to_vec(),
            metadata: None,
        }
    }

    pub fn from_file_data(data: Vec<u8>, metadata: Metadata) -> Self {
        Self {
            data,
            metadata: Some(metadata),
        }
    }

    /// reads a file and describes it by its file name
    pub fn from_file(path: &std::path::Path) -> crate::Result<Self> {
        let data = std::fs::read(path).map_err(|source| {
            log::error!("Error reading payload file {path:?}: {source}");
            crate::StegError::ReadError { source }
        })?;
        let metadata = Metadata::for_file(path, data.len() as u64)?;

        Ok(Self::from_file_data(data, metadata))
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
