use stegavid_cipher::{decrypt_data, encrypt_data, token_len};

use super::Payload;
use crate::result::Result;

/// Encrypts a text message with a password, the payload carries the Fernet token
pub fn seal_text(text: &str, password: &str) -> Payload {
    Payload {
        data: encrypt_data(password, text.as_bytes()),
        metadata: None,
    }
}

/// Decrypts a recovered token back into the text message
pub fn open_text(token: &Payload, password: &str) -> Result<String> {
    let plain = decrypt_data(password, &token.data)?;

    Ok(String::from_utf8(plain)?)
}

/// length of the token [`seal_text`] produces for a text of `text_len` bytes
pub fn sealed_len(text_len: usize) -> usize {
    token_len(text_len)
}
