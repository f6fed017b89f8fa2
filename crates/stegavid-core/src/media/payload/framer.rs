use byteorder::{BigEndian, WriteBytesExt};

use super::{EnvelopeFormat, EnvelopeParser, Payload, TEXT_LENGTH_DIGITS};
use crate::error::StegError;
use crate::result::Result;

impl EnvelopeFormat {
    /// serializes the payload into the envelope bytes of this format
    pub fn encode(&self, payload: &Payload) -> Result<Vec<u8>> {
        let data = payload.data.as_slice();
        let mut buffer = Vec::with_capacity(self.framing_len() + data.len() + 128);

        match self {
            EnvelopeFormat::FileInFrames => {
                let metadata = payload.metadata.as_ref().ok_or(StegError::MissingFiles)?;
                let metadata = metadata.to_json()?;

                buffer.extend_from_slice(self.start_marker());
                buffer.write_u32::<BigEndian>(length_prefix(metadata.len())?)?;
                buffer.extend_from_slice(&metadata);
                buffer.write_u32::<BigEndian>(length_prefix(data.len())?)?;
                buffer.extend_from_slice(data);
                buffer.extend_from_slice(self.end_marker());
            }
            EnvelopeFormat::EncryptedText => {
                buffer.extend_from_slice(self.start_marker());
                buffer.extend_from_slice(
                    format!("{:0width$}", data.len(), width = TEXT_LENGTH_DIGITS).as_bytes(),
                );
                buffer.extend_from_slice(data);
                buffer.extend_from_slice(self.end_marker());
            }
            EnvelopeFormat::TerminatedText => {
                let end = self.end_marker();
                if data.windows(end.len()).any(|w| w == end) {
                    return Err(StegError::PayloadContainsMarker);
                }
                buffer.extend_from_slice(self.start_marker());
                buffer.extend_from_slice(data);
                buffer.extend_from_slice(end);
            }
            EnvelopeFormat::ContainerTrailer => {
                let metadata = payload.metadata.as_ref().ok_or(StegError::MissingFiles)?;
                let metadata = metadata.to_json()?;
                let metadata_len = length_prefix(metadata.len())?;

                buffer.extend_from_slice(data);
                buffer.extend_from_slice(&metadata);
                buffer.write_u32::<BigEndian>(metadata_len)?;
                buffer.extend_from_slice(self.start_marker());
            }
        }

        Ok(buffer)
    }

    /// incremental parser for the streaming formats of this envelope
    pub fn parser(&self) -> EnvelopeParser {
        EnvelopeParser::new(*self)
    }
}

fn length_prefix(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| StegError::CapacityExceeded {
        needed: len as u64,
        available: u64::from(u32::MAX),
    })
}
