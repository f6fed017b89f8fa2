use std::string::FromUtf8Error;
use thiserror::Error;

pub use stegavid_cipher::CipherError;

#[derive(Error, Debug)]
pub enum StegError {
    /// Represents a carrier that cannot be opened or whose geometry cannot be determined
    #[error("Carrier could not be read: {0}")]
    CarrierUnreadable(String),

    /// Represents a carrier type the chosen method cannot work with, for example a WAV file for frame hiding
    #[error("Carrier format is not supported by this method")]
    UnsupportedCarrier,

    /// Represents a payload bigger than the computed capacity, nothing was written
    #[error("Capacity exceeded: {needed} needed, but only {available} available")]
    CapacityExceeded { needed: u64, available: u64 },

    /// Represents an unveil of a carrier without hidden data
    #[error("No hidden payload found")]
    MarkerNotFound,

    /// Represents length fields or metadata that are inconsistent with the recovered stream
    #[error("Hidden payload is corrupt: {0}")]
    CorruptMetadata(String),

    /// Represents a carrier that ended before the declared payload length was satisfied
    #[error("Carrier ended before the hidden payload was complete")]
    TruncatedPayload,

    /// Represents a wrong password or a tampered ciphertext, both on purpose indistinguishable
    #[error("Decryption failed, wrong password or corrupted message")]
    DecryptionFailed,

    /// Represents key material that could not be turned into a cipher
    #[error("Encryption failed")]
    EncryptionFailed,

    /// Represents a missing external transcoder binary
    #[error("External tool `{tool}` is not available")]
    ExternalToolUnavailable { tool: String },

    /// Represents a transcoder run that exited unsuccessfully
    #[error("External tool `{tool}` failed (exit status {status:?}): {stderr}")]
    ExternalToolFailed {
        tool: String,
        status: Option<i32>,
        stderr: String,
    },

    /// Represents the error of invalid UTF-8 text data found inside of a text only message
    #[error("Invalid text data found inside a message")]
    InvalidTextData(#[from] FromUtf8Error),

    /// Represents an error caused by an invalid filename, for example not unsupported charset or empty filename
    #[error("A file with an invalid file name was provided")]
    InvalidFileName,

    /// Represents codec options that cannot work, like a coefficient outside of the block
    #[error("Invalid codec options: {0}")]
    InvalidCodecOptions(String),

    /// Represents a terminated text that contains its own end marker
    #[error("Payload contains the end marker and cannot be framed")]
    PayloadContainsMarker,

    /// Represents an audio block that flips its bit no matter how it is scaled
    #[error("An audio block cannot carry a bit, the carrier clips")]
    UnembeddableBlock,

    /// Represents a caller requested stop between two carrier units
    #[error("Operation was interrupted")]
    Interrupted,

    /// Represents a failure to read from input.
    #[error("Read error")]
    ReadError { source: std::io::Error },

    /// Represents a failure to write target file.
    #[error("Write error")]
    WriteError { source: std::io::Error },

    /// Represents all other cases of `std::io::Error`.
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error("No carrier media set")]
    CarrierNotSet,

    #[error("No target set")]
    TargetNotSet,

    #[error("API Error: Missing message")]
    MissingMessage,

    #[error("API Error: Missing files")]
    MissingFiles,

    #[error("API Error: Missing password")]
    MissingPassword,

    #[error("API Error: The chosen method does not support a password")]
    PasswordNotSupported,
}

impl From<CipherError> for StegError {
    fn from(e: CipherError) -> Self {
        match e {
            CipherError::InvalidKey => StegError::EncryptionFailed,
            CipherError::DecryptionFailed => StegError::DecryptionFailed,
        }
    }
}

impl From<serde_json::Error> for StegError {
    fn from(e: serde_json::Error) -> Self {
        StegError::CorruptMetadata(e.to_string())
    }
}
