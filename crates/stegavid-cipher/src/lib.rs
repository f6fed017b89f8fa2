//! # Password based payload encryption
//!
//! Keys are derived with PBKDF2-HMAC-SHA256 from a password and a fixed salt,
//! tokens follow the [Fernet](https://github.com/fernet/spec) format:
//!
//! ```text
//! 0x80 ∥ timestamp (8B BE) ∥ IV (16B) ∥ AES-128-CBC(PKCS#7) ∥ HMAC-SHA256 (32B)
//! ```
//!
//! all of it url-safe base64 encoded.
//!
//! The salt is a constant, so equal passwords always derive equal keys. Changing
//! it would make every token produced so far unreadable.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};
use zeroize::Zeroize;

pub mod error;

pub use crate::error::CipherError;

pub const KDF_SALT: &[u8] = b"steg_salt_2024";
pub const KDF_ITERATIONS: u32 = 100_000;

const KEY_LEN: usize = 32;
const VERSION: u8 = 0x80;
const TIMESTAMP_LEN: usize = 8;
const IV_LEN: usize = 16;
const BLOCK_LEN: usize = 16;
const HMAC_LEN: usize = 32;
const HEADER_LEN: usize = 1 + TIMESTAMP_LEN + IV_LEN;

pub type Result<T> = std::result::Result<T, CipherError>;

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;
type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;
type HmacSha256 = Hmac<Sha256>;

/// Fernet key material, split into the signing and the encryption half.
///
/// Lives only for one encrypt or decrypt call, wiped on drop.
pub struct FernetKey {
    signing: [u8; 16],
    encryption: [u8; 16],
}

impl FernetKey {
    /// derives the key from a password, see [`derive_key`]
    pub fn from_password(password: &str) -> Self {
        let mut raw = derive_raw_key(password);
        let key = Self::from_raw(&raw);
        raw.zeroize();

        key
    }

    /// parses a url-safe base64 encoded 32 byte key
    pub fn from_base64(key: &str) -> Result<Self> {
        let mut raw = URL_SAFE
            .decode(key.as_bytes())
            .map_err(|_| CipherError::InvalidKey)?;
        if raw.len() != KEY_LEN {
            raw.zeroize();
            return Err(CipherError::InvalidKey);
        }
        let key = Self::from_raw(&raw);
        raw.zeroize();

        Ok(key)
    }

    fn from_raw(raw: &[u8]) -> Self {
        let mut signing = [0u8; 16];
        let mut encryption = [0u8; 16];
        signing.copy_from_slice(&raw[..16]);
        encryption.copy_from_slice(&raw[16..KEY_LEN]);

        Self {
            signing,
            encryption,
        }
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.signing).expect("HMAC accepts any key length")
    }
}

impl Drop for FernetKey {
    fn drop(&mut self) {
        self.signing.zeroize();
        self.encryption.zeroize();
    }
}

fn derive_raw_key(password: &str) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), KDF_SALT, KDF_ITERATIONS, &mut key);

    key
}

/// PBKDF2-HMAC-SHA256 over the password, returned as url-safe base64 key string
pub fn derive_key(password: &str) -> String {
    let mut raw = derive_raw_key(password);
    let encoded = URL_SAFE.encode(raw);
    raw.zeroize();

    encoded
}

/// encrypts `message` into a Fernet token (ASCII bytes)
pub fn encrypt(message: &[u8], key: &FernetKey) -> Vec<u8> {
    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();

    let token = encrypt_with_parts(message, key, now, &iv);
    iv.zeroize();

    token
}

fn encrypt_with_parts(message: &[u8], key: &FernetKey, timestamp: u64, iv: &[u8; IV_LEN]) -> Vec<u8> {
    let ciphertext = Aes128CbcEnc::new_from_slices(&key.encryption, iv)
        .expect("key and IV have the AES-128 block length")
        .encrypt_padded_vec_mut::<Pkcs7>(message);

    let mut raw = Vec::with_capacity(HEADER_LEN + ciphertext.len() + HMAC_LEN);
    raw.push(VERSION);
    raw.extend_from_slice(&timestamp.to_be_bytes());
    raw.extend_from_slice(iv);
    raw.extend_from_slice(&ciphertext);

    let mut mac = key.mac();
    mac.update(&raw);
    raw.extend_from_slice(&mac.finalize().into_bytes());

    URL_SAFE.encode(raw).into_bytes()
}

/// decrypts a Fernet token, every kind of failure ends up as [`CipherError::DecryptionFailed`]
pub fn decrypt(token: &[u8], key: &FernetKey) -> Result<Vec<u8>> {
    let raw = URL_SAFE
        .decode(token)
        .map_err(|_| CipherError::DecryptionFailed)?;
    if raw.len() < HEADER_LEN + BLOCK_LEN + HMAC_LEN || raw[0] != VERSION {
        return Err(CipherError::DecryptionFailed);
    }
    let (signed, tag) = raw.split_at(raw.len() - HMAC_LEN);
    let ciphertext = &signed[HEADER_LEN..];
    if ciphertext.len() % BLOCK_LEN != 0 {
        return Err(CipherError::DecryptionFailed);
    }

    let mut mac = key.mac();
    mac.update(signed);
    mac.verify_slice(tag)
        .map_err(|_| CipherError::DecryptionFailed)?;

    let iv = &signed[1 + TIMESTAMP_LEN..HEADER_LEN];
    Aes128CbcDec::new_from_slices(&key.encryption, iv)
        .map_err(|_| CipherError::DecryptionFailed)?
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| CipherError::DecryptionFailed)
}

/// exact token length produced by [`encrypt`] for a plaintext of `plaintext_len` bytes
pub fn token_len(plaintext_len: usize) -> usize {
    let padded = (plaintext_len / BLOCK_LEN + 1) * BLOCK_LEN;
    let raw = HEADER_LEN + padded + HMAC_LEN;

    raw.div_ceil(3) * 4
}

/// largest plaintext length whose token still fits into `budget` bytes,
/// `None` when not even the token of an empty plaintext fits
pub fn max_plaintext_len(budget: usize) -> Option<usize> {
    let raw_budget = (budget / 4) * 3;
    let padded = raw_budget.checked_sub(HEADER_LEN + HMAC_LEN)? / BLOCK_LEN * BLOCK_LEN;
    if padded == 0 {
        return None;
    }

    Some(padded - 1)
}

/// encrypt data with a password, PBKDF2 for the key and Fernet for the token
pub fn encrypt_data(password: &str, data: &[u8]) -> Vec<u8> {
    let key = FernetKey::from_password(password);
    encrypt(data, &key)
}

/// decrypt a Fernet token with a password
pub fn decrypt_data(password: &str, token: &[u8]) -> Result<Vec<u8>> {
    let key = FernetKey::from_password(password);
    decrypt(token, &key)
}

#[cfg(test)]
mod tests {
    use super::*;

    // reference vector of the Fernet spec, `generate.json`
    const SPEC_KEY: &str = "cw_0x689RpI-jtRR7oE8h_eQsKImvJapLeSbXpwF4e4=";
    const SPEC_TOKEN: &str = "gAAAAAAdwJ6wAAECAwQFBgcICQoLDA0ODy021cpGVWKZ_eEwCGM4BLLF_5CV9dOPmrhuVUPgJobwOz7JcbmrR64jVmpU4IwqDA==";
    const SPEC_TIMESTAMP: u64 = 499_162_800;

    fn spec_iv() -> [u8; IV_LEN] {
        let mut iv = [0u8; IV_LEN];
        iv.iter_mut().enumerate().for_each(|(i, b)| *b = i as u8);
        iv
    }

    #[test]
    fn test_key_derivation_matches_pbkdf2_reference() {
        assert_eq!(
            derive_key("Secret42"),
            "qquWhY4F3-Rt8IZ5x-IoiIlRdIfLG9UqcQU9S7i8ex4="
        );
    }

    #[test]
    fn test_derived_key_is_accepted_as_fernet_key() {
        let encoded = derive_key("hunter42");
        assert!(FernetKey::from_base64(&encoded).is_ok());
    }

    #[test]
    fn test_spec_vector_encrypts() {
        let key = FernetKey::from_base64(SPEC_KEY).unwrap();
        let token = encrypt_with_parts(b"hello", &key, SPEC_TIMESTAMP, &spec_iv());

        assert_eq!(String::from_utf8(token).unwrap(), SPEC_TOKEN);
    }

    #[test]
    fn test_spec_vector_decrypts() {
        let key = FernetKey::from_base64(SPEC_KEY).unwrap();

        assert_eq!(decrypt(SPEC_TOKEN.as_bytes(), &key).unwrap(), b"hello");
    }

    #[test]
    fn test_encryption_round_trip() {
        let password = "resistance is futile";
        let data = b"lorem ipsum dolor sit amet, consectetur adipiscing elit. Sed do eiusmod tempor incididunt ut labore et dolore magna aliqua.";

        let token = encrypt_data(password, data);
        let plain = decrypt_data(password, &token).unwrap();

        assert_ne!(data.as_slice(), token.as_slice());
        assert_eq!(data.as_slice(), plain.as_slice());
    }

    #[test]
    fn test_wrong_password_and_tampering_look_the_same() {
        let token = encrypt_data("right", b"attack at dawn");

        let wrong = decrypt_data("wrong", &token).unwrap_err();

        let mut tampered = token.clone();
        let mid = tampered.len() / 2;
        tampered[mid] = if tampered[mid] == b'A' { b'B' } else { b'A' };
        let corrupted = decrypt_data("right", &tampered).unwrap_err();

        assert_eq!(wrong, CipherError::DecryptionFailed);
        assert_eq!(wrong, corrupted);
        assert_eq!(wrong.to_string(), corrupted.to_string());
    }

    #[test]
    fn test_garbage_is_rejected() {
        let key = FernetKey::from_password("x");
        assert_eq!(decrypt(b"", &key), Err(CipherError::DecryptionFailed));
        assert_eq!(decrypt(b"not base64 !!", &key), Err(CipherError::DecryptionFailed));
        assert_eq!(decrypt(b"gAAAAA==", &key), Err(CipherError::DecryptionFailed));
    }

    #[test]
    fn test_token_len_is_exact() {
        let key = FernetKey::from_password("len");
        for n in [0, 1, 5, 15, 16, 17, 31, 32, 100, 255] {
            let token = encrypt(&vec![b'x'; n], &key);
            assert_eq!(token.len(), token_len(n), "token length for {n} bytes");
        }
    }

    #[test]
    fn test_max_plaintext_len_inverts_token_len() {
        for budget in 0..600 {
            match max_plaintext_len(budget) {
                Some(n) => {
                    assert!(token_len(n) <= budget, "budget {budget}");
                    assert!(token_len(n + 1) > budget, "budget {budget}");
                }
                None => assert!(token_len(0) > budget, "budget {budget}"),
            }
        }
        assert_eq!(max_plaintext_len(100), Some(15));
        assert_eq!(max_plaintext_len(99), None);
    }
}
