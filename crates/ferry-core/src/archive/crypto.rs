//! Password protection for archive payloads
//!
//! The key is derived with Argon2id from the password and a per-archive
//! salt; every entry is sealed with AES-256-GCM under its own nonce, with
//! its archive entry name as associated data so sealed entries cannot be
//! moved to another path. A sealed marker in the manifest lets readers
//! reject a wrong password up front.

use super::ArchiveError;
use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Nonce};
use argon2::Argon2;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};

const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;
const VERIFIER_PLAINTEXT: &[u8] = b"ferry-archive-key-check";

/// Encryption parameters stored in the manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptionParams {
    /// Key derivation function; always `argon2id`
    pub kdf: String,
    /// Hex salt for key derivation
    pub salt: String,
    /// Hex nonce of the key check
    pub verifier_nonce: String,
    /// Hex ciphertext of a fixed marker, sealed with the derived key
    pub verifier: String,
}

pub(crate) struct PayloadCipher {
    cipher: Aes256Gcm,
}

impl PayloadCipher {
    /// Derive a fresh key for a new archive
    pub(crate) fn create(password: &str) -> Result<(Self, EncryptionParams), ArchiveError> {
        let mut salt = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);

        let cipher = Self::derive(password, &salt)?;
        let (verifier, verifier_nonce) = cipher.seal(VERIFIER_PLAINTEXT, b"")?;

        let params = EncryptionParams {
            kdf: "argon2id".to_string(),
            salt: hex::encode(salt),
            verifier_nonce: hex::encode(verifier_nonce),
            verifier: hex::encode(verifier),
        };
        Ok((cipher, params))
    }

    /// Re-derive the key of an existing archive and check it
    pub(crate) fn open_existing(
        password: &str,
        params: &EncryptionParams,
    ) -> Result<Self, ArchiveError> {
        if params.kdf != "argon2id" {
            return Err(ArchiveError::Corrupt(format!(
                "Unknown key derivation function: {}",
                params.kdf
            )));
        }
        let salt = decode_hex(&params.salt)?;
        let cipher = Self::derive(password, &salt)?;

        let verifier = decode_hex(&params.verifier)?;
        let plaintext = cipher.open(&params.verifier_nonce, &verifier, b"")?;
        if plaintext != VERIFIER_PLAINTEXT {
            return Err(ArchiveError::Decryption);
        }
        Ok(cipher)
    }

    fn derive(password: &str, salt: &[u8]) -> Result<Self, ArchiveError> {
        let mut key = [0u8; 32];
        Argon2::default()
            .hash_password_into(password.as_bytes(), salt, &mut key)
            .map_err(|e| ArchiveError::Encoding(format!("Key derivation failed: {e}")))?;
        let cipher = Aes256Gcm::new_from_slice(&key)
            .map_err(|e| ArchiveError::Encoding(format!("Invalid key length: {e}")))?;
        Ok(Self { cipher })
    }

    /// Encrypt with a random nonce, returning ciphertext and nonce
    ///
    /// `aad` is authenticated but not encrypted; `open` must be given the
    /// same bytes.
    pub(crate) fn seal(
        &self,
        plaintext: &[u8],
        aad: &[u8],
    ) -> Result<(Vec<u8>, [u8; NONCE_LEN]), ArchiveError> {
        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);
        let ciphertext = self
            .cipher
            .encrypt(
                Nonce::from_slice(&nonce),
                Payload {
                    msg: plaintext,
                    aad,
                },
            )
            .map_err(|_| ArchiveError::Encoding("Encryption failed".to_string()))?;
        Ok((ciphertext, nonce))
    }

    /// Decrypt an entry given its hex nonce
    pub(crate) fn open(
        &self,
        nonce_hex: &str,
        ciphertext: &[u8],
        aad: &[u8],
    ) -> Result<Vec<u8>, ArchiveError> {
        let nonce = decode_hex(nonce_hex)?;
        if nonce.len() != NONCE_LEN {
            return Err(ArchiveError::Corrupt(format!(
                "Nonce has {} bytes, expected {NONCE_LEN}",
                nonce.len()
            )));
        }
        self.cipher
            .decrypt(
                Nonce::from_slice(&nonce),
                Payload {
                    msg: ciphertext,
                    aad,
                },
            )
            .map_err(|_| ArchiveError::Decryption)
    }
}

fn decode_hex(value: &str) -> Result<Vec<u8>, ArchiveError> {
    hex::decode(value).map_err(|e| ArchiveError::Corrupt(format!("Invalid hex field: {e}")))
}
