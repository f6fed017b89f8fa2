use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CipherError {
    /// The key is not 32 url-safe base64 encoded bytes
    #[error("Invalid key material")]
    InvalidKey,

    /// Wrong password, tampered token or garbage, all reported the same way
    #[error("Decryption failed, wrong password or corrupted data")]
    DecryptionFailed,
}
