//! AES-256-GCM authenticated encryption with a detached tag.
//!
//! Wallet records keep the IV and the authentication tag in their own
//! fields, so unlike a combined `nonce || ciphertext || tag` blob the
//! three parts are returned separately in a [`Sealed`].

use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce, Tag};
use rand::RngCore;

use crate::errors::{Result, WalletError};

/// Size of the AES-256-GCM nonce (IV) in bytes.
pub const IV_LEN: usize = 12;

/// Size of the GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// Name recorded in wallet files for this construction.
pub const ALGORITHM: &str = "aes-256-gcm";

/// Output of a single encryption.
#[derive(Debug, Clone)]
pub struct Sealed {
    pub ciphertext: Vec<u8>,
    pub iv: [u8; IV_LEN],
    pub auth_tag: [u8; TAG_LEN],
}

/// Generate a fresh random IV.
pub fn generate_iv() -> [u8; IV_LEN] {
    let mut iv = [0u8; IV_LEN];
    rand::rng().fill_bytes(&mut iv);
    iv
}

/// Encrypt `plaintext` under a 32-byte `key` with a freshly generated IV.
pub fn encrypt(key: &[u8], plaintext: &[u8]) -> Result<Sealed> {
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| WalletError::Encryption(format!("invalid key length: {e}")))?;

    let iv = generate_iv();
    let mut buffer = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(Nonce::from_slice(&iv), b"", &mut buffer)
        .map_err(|e| WalletError::Encryption(format!("encryption error: {e}")))?;

    let mut auth_tag = [0u8; TAG_LEN];
    auth_tag.copy_from_slice(tag.as_slice());

    Ok(Sealed {
        ciphertext: buffer,
        iv,
        auth_tag,
    })
}

/// Decrypt and authenticate.
///
/// Any failure, including a tag mismatch, maps to
/// `WalletError::InvalidPassword`; the plaintext buffer is wiped before
/// returning so no partially decrypted bytes escape.
pub fn decrypt(key: &[u8], iv: &[u8], ciphertext: &[u8], auth_tag: &[u8]) -> Result<Vec<u8>> {
    if iv.len() != IV_LEN || auth_tag.len() != TAG_LEN {
        return Err(WalletError::InvalidPassword);
    }

    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| WalletError::InvalidPassword)?;

    let mut buffer = ciphertext.to_vec();
    match cipher.decrypt_in_place_detached(
        Nonce::from_slice(iv),
        b"",
        &mut buffer,
        Tag::from_slice(auth_tag),
    ) {
        Ok(()) => Ok(buffer),
        Err(_) => {
            zeroize::Zeroize::zeroize(&mut buffer);
            Err(WalletError::InvalidPassword)
        }
    }
}
