use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes256Gcm, Key, Nonce,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::Rng;
use sha2::{Digest, Sha256};
use std::fmt;
use tracing::debug;

use crate::core::error::ReferenceError;

const NONCE_SIZE: usize = 12;
const TAG_SIZE: usize = 16;
const TOKEN_VERSION: u8 = 1;

/// Opaque, URL-safe token that seals a message identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecureReference(String);

impl SecureReference {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SecureReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Seals identifiers into [`SecureReference`] tokens with AES-256-GCM.
///
/// The token is `version || nonce || ciphertext+tag`, base64url without padding. The
/// version byte is authenticated as associated data, so a future layout (for example one
/// carrying an expiry timestamp) can be introduced under a new version number.
#[derive(Clone)]
pub struct ReferenceCodec {
    cipher: Aes256Gcm,
}

impl fmt::Debug for ReferenceCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceCodec").finish_non_exhaustive()
    }
}

impl ReferenceCodec {
    /// Derives the 256-bit key from an arbitrary-length process secret.
    pub fn new(secret: &str) -> Self {
        let digest = Sha256::digest(secret.as_bytes());
        let key = Key::<Aes256Gcm>::from_slice(&digest);
        Self {
            cipher: Aes256Gcm::new(key),
        }
    }

    pub fn encode(&self, plaintext: &str) -> Result<SecureReference, ReferenceError> {
        let mut rng = rand::rng();
        let nonce_bytes: [u8; NONCE_SIZE] = std::array::from_fn(|_| rng.random());
        let nonce = Nonce::from_slice(&nonce_bytes);

        let aad = [TOKEN_VERSION];
        let ciphertext = self
            .cipher
            .encrypt(
                nonce,
                Payload {
                    msg: plaintext.as_bytes(),
                    aad: &aad,
                },
            )
            .map_err(|_| ReferenceError::Seal)?;

        let mut raw = Vec::with_capacity(1 + NONCE_SIZE + ciphertext.len());
        raw.push(TOKEN_VERSION);
        raw.extend_from_slice(&nonce_bytes);
        raw.extend_from_slice(&ciphertext);

        Ok(SecureReference(URL_SAFE_NO_PAD.encode(raw)))
    }

    pub fn decode(&self, reference: &str) -> Result<String, ReferenceError> {
        let raw = URL_SAFE_NO_PAD
            .decode(reference)
            .map_err(|_| ReferenceError::TamperedOrInvalid)?;

        if raw.len() < 1 + NONCE_SIZE + TAG_SIZE {
            return Err(ReferenceError::TamperedOrInvalid);
        }

        let (version, rest) = raw.split_at(1);
        if version[0] != TOKEN_VERSION {
            debug!("Rejecting reference with unknown version {}", version[0]);
            return Err(ReferenceError::TamperedOrInvalid);
        }

        let (nonce_bytes, ciphertext) = rest.split_at(NONCE_SIZE);
        let plaintext = self
            .cipher
            .decrypt(
                Nonce::from_slice(nonce_bytes),
                Payload {
                    msg: ciphertext,
                    aad: version,
                },
            )
            .map_err(|_| ReferenceError::TamperedOrInvalid)?;

        String::from_utf8(plaintext).map_err(|_| ReferenceError::TamperedOrInvalid)
    }
}
