//! Sealed-envelope encryption for persisted slice values.
//!
//! # Responsibility
//! - Seal JSON-serialized slice values into an opaque storage string.
//! - Open stored envelopes back into plaintext.
//!
//! # Invariants
//! - The envelope format is `{v, iv, tag, data}` with base64 fields.
//! - A fresh random nonce is drawn per seal; envelopes are never reused.
//!
//! The crate ships a build-embedded default key. That obfuscates stored
//! rows from casual inspection of the backing store; anyone holding the
//! distributed binary can recover it, so it is not confidentiality. A
//! per-deployment key supplied through configuration takes precedence.

use aes_gcm::aead::{rand_core::RngCore, Aead, OsRng};
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;
const KEY_LEN: usize = 32;

// Rotating this constant orphans every envelope sealed under the old key;
// the load fallback chain then treats those rows as raw strings.
const EMBEDDED_SLICE_KEY: [u8; KEY_LEN] = [
    0x4b, 0x1e, 0x82, 0xc7, 0x09, 0x53, 0xaf, 0x6d, 0x21, 0xd8, 0x77, 0x3a, 0x9e, 0x40, 0xb5,
    0x12, 0x68, 0xf3, 0x0c, 0x91, 0x5a, 0xe7, 0x2f, 0xc4, 0x8b, 0x36, 0xd1, 0x74, 0x1f, 0xa9,
    0x60, 0xe5,
];

pub type EnvelopeResult<T> = Result<T, EnvelopeError>;

/// Envelope sealing/opening errors.
#[derive(Debug)]
pub enum EnvelopeError {
    /// Configured key material is not 32 bytes after decoding.
    InvalidKey(String),
    /// AEAD rejected the operation (wrong key, corrupted ciphertext).
    Cipher,
    /// Envelope fields are not decodable base64 or have impossible sizes.
    Malformed(String),
}

impl Display for EnvelopeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidKey(message) => write!(f, "invalid envelope key: {message}"),
            Self::Cipher => write!(f, "envelope cipher rejected the payload"),
            Self::Malformed(message) => write!(f, "malformed envelope: {message}"),
        }
    }
}

impl Error for EnvelopeError {}

/// Wire/storage representation of one sealed slice value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedEnvelope {
    pub v: u8,
    pub iv: String,
    pub tag: String,
    pub data: String,
}

/// AES-256-GCM cipher bound to one symmetric key.
#[derive(Clone, Debug)]
pub struct EnvelopeCipher {
    key: [u8; KEY_LEN],
}

impl EnvelopeCipher {
    /// Cipher using the build-embedded default key.
    pub fn embedded() -> Self {
        Self {
            key: EMBEDDED_SLICE_KEY,
        }
    }

    /// Cipher using a per-deployment key (base64 of 32 raw bytes).
    pub fn from_key_b64(encoded: &str) -> EnvelopeResult<Self> {
        let raw = B64
            .decode(encoded.trim())
            .map_err(|err| EnvelopeError::InvalidKey(err.to_string()))?;
        let key: [u8; KEY_LEN] = raw
            .try_into()
            .map_err(|raw: Vec<u8>| {
                EnvelopeError::InvalidKey(format!("expected {KEY_LEN} bytes, got {}", raw.len()))
            })?;
        Ok(Self { key })
    }

    /// Seals plaintext into an envelope with a fresh random nonce.
    pub fn seal(&self, plaintext: &str) -> EnvelopeResult<SealedEnvelope> {
        let mut iv = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut iv);

        let cipher = Aes256Gcm::new_from_slice(self.key.as_slice())
            .map_err(|err| EnvelopeError::InvalidKey(err.to_string()))?;
        let nonce = Nonce::from_slice(&iv);
        let sealed = cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|_| EnvelopeError::Cipher)?;

        if sealed.len() < TAG_LEN {
            return Err(EnvelopeError::Malformed(
                "cipher output shorter than tag".to_string(),
            ));
        }
        let (data, tag) = sealed.split_at(sealed.len() - TAG_LEN);

        Ok(SealedEnvelope {
            v: 1,
            iv: B64.encode(iv),
            tag: B64.encode(tag),
            data: B64.encode(data),
        })
    }

    /// Opens an envelope back into plaintext.
    pub fn open(&self, envelope: &SealedEnvelope) -> EnvelopeResult<String> {
        let iv = decode_field(&envelope.iv, "iv")?;
        let tag = decode_field(&envelope.tag, "tag")?;
        let data = decode_field(&envelope.data, "data")?;
        if iv.len() != NONCE_LEN || tag.len() != TAG_LEN {
            return Err(EnvelopeError::Malformed(
                "unexpected nonce or tag length".to_string(),
            ));
        }

        let cipher = Aes256Gcm::new_from_slice(self.key.as_slice())
            .map_err(|err| EnvelopeError::InvalidKey(err.to_string()))?;
        let nonce = Nonce::from_slice(iv.as_slice());
        let mut combined = Vec::with_capacity(data.len() + tag.len());
        combined.extend_from_slice(data.as_slice());
        combined.extend_from_slice(tag.as_slice());

        let opened = cipher
            .decrypt(nonce, combined.as_slice())
            .map_err(|_| EnvelopeError::Cipher)?;
        String::from_utf8(opened)
            .map_err(|err| EnvelopeError::Malformed(format!("plaintext not UTF-8: {err}")))
    }
}

fn decode_field(value: &str, field: &str) -> EnvelopeResult<Vec<u8>> {
    B64.decode(value)
        .map_err(|err| EnvelopeError::Malformed(format!("{field} is not base64: {err}")))
}

#[cfg(test)]
mod tests {
    use super::{EnvelopeCipher, EnvelopeError, SealedEnvelope};
    use base64::engine::general_purpose::STANDARD as B64;
    use base64::Engine;

    #[test]
    fn seal_open_roundtrip() {
        let cipher = EnvelopeCipher::embedded();
        let sealed = cipher.seal(r#"{"members":[]}"#).unwrap();
        assert_eq!(sealed.v, 1);
        let opened = cipher.open(&sealed).unwrap();
        assert_eq!(opened, r#"{"members":[]}"#);
    }

    #[test]
    fn sealing_twice_uses_fresh_nonces() {
        let cipher = EnvelopeCipher::embedded();
        let first = cipher.seal("same input").unwrap();
        let second = cipher.seal("same input").unwrap();
        assert_ne!(first.iv, second.iv);
    }

    #[test]
    fn open_with_wrong_key_fails() {
        let sealed = EnvelopeCipher::embedded().seal("secret").unwrap();
        let other = EnvelopeCipher::from_key_b64(&B64.encode([7u8; 32])).unwrap();
        assert!(matches!(other.open(&sealed), Err(EnvelopeError::Cipher)));
    }

    #[test]
    fn open_rejects_garbage_fields() {
        let cipher = EnvelopeCipher::embedded();
        let garbage = SealedEnvelope {
            v: 1,
            iv: "not base64!".to_string(),
            tag: String::new(),
            data: String::new(),
        };
        assert!(matches!(
            cipher.open(&garbage),
            Err(EnvelopeError::Malformed(_))
        ));
    }

    #[test]
    fn from_key_b64_rejects_short_keys() {
        let err = EnvelopeCipher::from_key_b64(&B64.encode([1u8; 16])).unwrap_err();
        assert!(matches!(err, EnvelopeError::InvalidKey(_)));
    }
}
