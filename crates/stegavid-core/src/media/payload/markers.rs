pub const FILE_START_MARKER: &[u8] = b"STEG_FILE_START";
pub const FILE_END_MARKER: &[u8] = b"STEG_FILE_END";
pub const TEXT_START_MARKER: &[u8] = b"STEG_START";
pub const TEXT_END_MARKER: &[u8] = b"STEG_END";
pub const EOF_MARKER: &[u8] = b"STEG_EOF_PAYLOAD";

/// width of the decimal length field of [`EnvelopeFormat::EncryptedText`]
pub const TEXT_LENGTH_DIGITS: usize = 16;
/// size of a big endian length prefix
pub const LENGTH_PREFIX_LEN: usize = 4;
/// room accounted for the JSON metadata when computing file capacity
pub const METADATA_RESERVE: usize = 1024;

/// Field layout of an envelope, one per hiding method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeFormat {
    /// `STEG_FILE_START ∥ len(meta) ∥ meta ∥ len(data) ∥ data ∥ STEG_FILE_END`
    FileInFrames,
    /// `STEG_START ∥ 16 digit length ∥ token ∥ STEG_END`
    EncryptedText,
    /// `STEG_START ∥ text ∥ STEG_END`, the end marker terminates the text
    TerminatedText,
    /// `data ∥ meta ∥ len(meta) ∥ STEG_EOF_PAYLOAD`, read backwards from the end
    ContainerTrailer,
}

impl EnvelopeFormat {
    pub fn start_marker(&self) -> &'static [u8] {
        match self {
            EnvelopeFormat::FileInFrames => FILE_START_MARKER,
            EnvelopeFormat::EncryptedText | EnvelopeFormat::TerminatedText => TEXT_START_MARKER,
            EnvelopeFormat::ContainerTrailer => EOF_MARKER,
        }
    }

    /// the trailer carries a single marker only, its end marker is empty
    pub fn end_marker(&self) -> &'static [u8] {
        match self {
            EnvelopeFormat::FileInFrames => FILE_END_MARKER,
            EnvelopeFormat::EncryptedText | EnvelopeFormat::TerminatedText => TEXT_END_MARKER,
            EnvelopeFormat::ContainerTrailer => &[],
        }
    }

    /// bytes an envelope adds on top of data and metadata
    pub fn framing_len(&self) -> usize {
        let markers = self.start_marker().len() + self.end_marker().len();
        match self {
            EnvelopeFormat::FileInFrames => markers + 2 * LENGTH_PREFIX_LEN,
            EnvelopeFormat::EncryptedText => markers + TEXT_LENGTH_DIGITS,
            EnvelopeFormat::TerminatedText => markers,
            EnvelopeFormat::ContainerTrailer => markers + LENGTH_PREFIX_LEN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_framing_len() {
        assert_eq!(EnvelopeFormat::FileInFrames.framing_len(), 36);
        assert_eq!(EnvelopeFormat::EncryptedText.framing_len(), 34);
        assert_eq!(EnvelopeFormat::TerminatedText.framing_len(), 18);
        assert_eq!(EnvelopeFormat::ContainerTrailer.framing_len(), 20);
    }
}
