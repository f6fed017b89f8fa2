use byteorder::{BigEndian, ByteOrder};

use super::{EnvelopeFormat, Metadata, Payload, LENGTH_PREFIX_LEN, TEXT_LENGTH_DIGITS};
use crate::error::StegError;
use crate::result::Result;

/// bytes from the stream start within which the start marker has to be complete
pub const DEFAULT_SEARCH_WINDOW: usize = 1024;

const MAX_METADATA_LEN: usize = 64 * 1024;
const PREALLOCATION_LIMIT: usize = 1 << 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStatus {
    NeedMore,
    Complete,
}

#[derive(Debug, Clone, Copy)]
enum Stage {
    SeekStart,
    MetadataLength,
    Metadata(usize),
    DataLength,
    TextLength,
    Data(usize),
    EndMarker,
    Terminated,
    Complete,
}

/// Incremental envelope parser.
///
/// Bytes are pushed one by one as the embedder recovers them. Stated lengths
/// decide when the payload is complete, the end marker is only verified
/// afterwards. [`EnvelopeFormat::TerminatedText`] carries no length and
/// completes with its end marker.
///
/// [`EnvelopeFormat::ContainerTrailer`] is read backwards from the end of a
/// file by [`crate::media::container`] and is rejected here.
#[derive(Debug)]
pub struct EnvelopeParser {
    format: EnvelopeFormat,
    search_window: usize,
    stage: Stage,
    scratch: Vec<u8>,
    consumed: usize,
    metadata: Option<Metadata>,
    data: Vec<u8>,
}

impl EnvelopeParser {
    pub fn new(format: EnvelopeFormat) -> Self {
        Self {
            format,
            search_window: DEFAULT_SEARCH_WINDOW,
            stage: Stage::SeekStart,
            scratch: Vec::new(),
            consumed: 0,
            metadata: None,
            data: Vec::new(),
        }
    }

    pub fn with_search_window(mut self, search_window: usize) -> Self {
        self.search_window = search_window.max(self.format.start_marker().len());
        self
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.stage, Stage::Complete)
    }

    /// number of bytes pushed so far
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    pub fn push(&mut self, byte: u8) -> Result<ParseStatus> {
        if self.is_complete() {
            return Ok(ParseStatus::Complete);
        }
        self.consumed += 1;

        match self.stage {
            Stage::SeekStart => {
                let marker = self.format.start_marker();
                self.scratch.push(byte);
                if self.scratch.len() > marker.len() {
                    self.scratch.remove(0);
                }
                if self.scratch == marker {
                    self.scratch.clear();
                    self.stage = self.after_start_marker()?;
                } else if self.consumed >= self.search_window {
                    return Err(StegError::MarkerNotFound);
                }
            }
            Stage::MetadataLength => {
                if let Some(len) = self.take_length_prefix(byte) {
                    if len == 0 || len > MAX_METADATA_LEN {
                        return Err(StegError::CorruptMetadata(format!(
                            "metadata length {len} is out of range"
                        )));
                    }
                    self.stage = Stage::Metadata(len);
                }
            }
            Stage::Metadata(len) => {
                self.scratch.push(byte);
                if self.scratch.len() == len {
                    self.metadata = Some(Metadata::from_json(&self.scratch)?);
                    self.scratch.clear();
                    self.stage = Stage::DataLength;
                }
            }
            Stage::DataLength => {
                if let Some(len) = self.take_length_prefix(byte) {
                    let declared = self.metadata.as_ref().map(|m| m.size).unwrap_or_default();
                    if declared != len as u64 {
                        return Err(StegError::CorruptMetadata(format!(
                            "metadata states {declared} bytes, length prefix states {len}"
                        )));
                    }
                    self.begin_data(len);
                }
            }
            Stage::TextLength => {
                self.scratch.push(byte);
                if self.scratch.len() == TEXT_LENGTH_DIGITS {
                    let len = parse_decimal_length(&self.scratch)?;
                    self.scratch.clear();
                    self.begin_data(len);
                }
            }
            Stage::Data(len) => {
                self.data.push(byte);
                if self.data.len() == len {
                    self.stage = Stage::EndMarker;
                }
            }
            Stage::EndMarker => {
                let marker = self.format.end_marker();
                self.scratch.push(byte);
                if self.scratch.len() == marker.len() {
                    if self.scratch != marker {
                        return Err(StegError::CorruptMetadata(
                            "end marker does not follow the stated data".to_string(),
                        ));
                    }
                    self.scratch.clear();
                    self.stage = Stage::Complete;
                }
            }
            Stage::Terminated => {
                let marker = self.format.end_marker();
                self.data.push(byte);
                if self.data.ends_with(marker) {
                    self.data.truncate(self.data.len() - marker.len());
                    self.stage = Stage::Complete;
                }
            }
            Stage::Complete => {}
        }

        Ok(if self.is_complete() {
            ParseStatus::Complete
        } else {
            ParseStatus::NeedMore
        })
    }

    /// pushes bytes until the envelope is complete, remaining bytes are ignored
    pub fn push_all(&mut self, bytes: &[u8]) -> Result<ParseStatus> {
        for byte in bytes {
            if self.push(*byte)? == ParseStatus::Complete {
                return Ok(ParseStatus::Complete);
            }
        }

        Ok(if self.is_complete() {
            ParseStatus::Complete
        } else {
            ParseStatus::NeedMore
        })
    }

    /// the recovered payload, or why the stream did not contain one
    pub fn finish(self) -> Result<Payload> {
        match self.stage {
            Stage::Complete => Ok(Payload {
                data: self.data,
                metadata: self.metadata,
            }),
            Stage::SeekStart => Err(StegError::MarkerNotFound),
            _ => Err(StegError::TruncatedPayload),
        }
    }

    fn after_start_marker(&self) -> Result<Stage> {
        match self.format {
            EnvelopeFormat::FileInFrames => Ok(Stage::MetadataLength),
            EnvelopeFormat::EncryptedText => Ok(Stage::TextLength),
            EnvelopeFormat::TerminatedText => Ok(Stage::Terminated),
            EnvelopeFormat::ContainerTrailer => Err(StegError::CorruptMetadata(
                "a container trailer cannot be parsed as a stream".to_string(),
            )),
        }
    }

    fn take_length_prefix(&mut self, byte: u8) -> Option<usize> {
        self.scratch.push(byte);
        if self.scratch.len() < LENGTH_PREFIX_LEN {
            return None;
        }
        let len = BigEndian::read_u32(&self.scratch) as usize;
        self.scratch.clear();

        Some(len)
    }

    fn begin_data(&mut self, len: usize) {
        self.data = Vec::with_capacity(len.min(PREALLOCATION_LIMIT));
        self.stage = if len == 0 {
            Stage::EndMarker
        } else {
            Stage::Data(len)
        };
    }
}

fn parse_decimal_length(digits: &[u8]) -> Result<usize> {
    if !digits.iter().all(u8::is_ascii_digit) {
        return Err(StegError::CorruptMetadata(
            "length field is not a decimal number".to_string(),
        ));
    }
    std::str::from_utf8(digits)
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .ok_or_else(|| StegError::CorruptMetadata("length field is out of range".to_string()))
}
