//! On-disk wallet record format.
//!
//! A wallet file is a single pretty-printed JSON object:
//!
//! ```text
//! {
//!   "version": "3.0",
//!   "algorithm": "aes-256-gcm",
//!   "kdf": { "memoryKib": 65536, "iterations": 3, "parallelism": 4 },
//!   "encrypted": "<hex ciphertext>",
//!   "salt": "<hex, 32 bytes>",
//!   "iv": "<hex, 12 bytes>",
//!   "authTag": "<hex, 16 bytes>"
//! }
//! ```
//!
//! The key is Argon2id(password, salt) with the stored `kdf` params.
//! Records are written with mode 0600 inside a 0700 directory.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::crypto::encryption::{self, ALGORITHM, IV_LEN, TAG_LEN};
use crate::crypto::kdf::{self, KdfParams, SALT_LEN};
use crate::errors::{Result, WalletError};
use crate::storage;

/// Current record format version.
pub const CURRENT_VERSION: &str = "3.0";

/// The persisted, encrypted form of a wallet secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedSecretRecord {
    /// Format tag.
    pub version: String,

    /// Authenticated cipher used for `encrypted`.
    pub algorithm: String,

    /// Argon2id parameters used to derive the key from the password.
    /// Older records without this field use the defaults.
    #[serde(default)]
    pub kdf: KdfParams,

    /// Ciphertext (hex in JSON).
    #[serde(serialize_with = "hex_encode", deserialize_with = "hex_decode")]
    pub encrypted: Vec<u8>,

    /// Per-record KDF salt (hex in JSON).
    #[serde(serialize_with = "hex_encode", deserialize_with = "hex_decode")]
    pub salt: Vec<u8>,

    /// Per-encryption nonce (hex in JSON).
    #[serde(serialize_with = "hex_encode", deserialize_with = "hex_decode")]
    pub iv: Vec<u8>,

    /// GCM authentication tag (hex in JSON).
    #[serde(serialize_with = "hex_encode", deserialize_with = "hex_decode")]
    pub auth_tag: Vec<u8>,
}

impl EncryptedSecretRecord {
    /// Encrypt `plaintext` under `password` with a fresh salt and IV.
    pub fn seal(password: &[u8], plaintext: &[u8], params: &KdfParams) -> Result<Self> {
        let salt = kdf::generate_salt();
        let key = kdf::derive_key(password, &salt, params)?;
        let sealed = encryption::encrypt(&key[..], plaintext)?;

        Ok(Self {
            version: CURRENT_VERSION.to_string(),
            algorithm: ALGORITHM.to_string(),
            kdf: *params,
            encrypted: sealed.ciphertext,
            salt: salt.to_vec(),
            iv: sealed.iv.to_vec(),
            auth_tag: sealed.auth_tag.to_vec(),
        })
    }

    /// Decrypt the record.
    ///
    /// A failed tag check is `InvalidPassword`; a structurally broken
    /// record (unknown version, wrong field lengths, out-of-range KDF
    /// cost) is a storage error.
    pub fn open(&self, password: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        self.validate()?;
        let key = kdf::derive_key(password, &self.salt, &self.kdf)?;
        encryption::decrypt(&key[..], &self.iv, &self.encrypted, &self.auth_tag)
            .map(Zeroizing::new)
    }

    fn validate(&self) -> Result<()> {
        if self.version != CURRENT_VERSION {
            return Err(malformed(format!(
                "unsupported version '{}', expected '{CURRENT_VERSION}'",
                self.version
            )));
        }
        if self.algorithm != ALGORITHM {
            return Err(malformed(format!(
                "unsupported algorithm '{}', expected '{ALGORITHM}'",
                self.algorithm
            )));
        }
        if self.salt.len() != SALT_LEN {
            return Err(malformed(format!(
                "salt must be {SALT_LEN} bytes, got {}",
                self.salt.len()
            )));
        }
        if self.iv.len() != IV_LEN {
            return Err(malformed(format!(
                "iv must be {IV_LEN} bytes, got {}",
                self.iv.len()
            )));
        }
        if self.auth_tag.len() != TAG_LEN {
            return Err(malformed(format!(
                "authTag must be {TAG_LEN} bytes, got {}",
                self.auth_tag.len()
            )));
        }
        self.kdf
            .validate()
            .map_err(|e| malformed(format!("kdf: {e}")))?;
        Ok(())
    }
}

/// Read and parse a wallet record.
pub fn read_record(path: &Path) -> Result<EncryptedSecretRecord> {
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(WalletError::NotFound(path.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };

    serde_json::from_slice(&data).map_err(|e| malformed(format!("{}: {e}", path.display())))
}

/// Write a wallet record atomically with owner-only permissions.
pub fn write_record(path: &Path, record: &EncryptedSecretRecord) -> Result<()> {
    let json = serde_json::to_vec_pretty(record)
        .map_err(|e| WalletError::Serialization(format!("wallet record: {e}")))?;
    storage::write_private(path, &json)?;
    tracing::debug!(path = %path.display(), "wallet record written");
    Ok(())
}

fn malformed(msg: String) -> WalletError {
    WalletError::Storage(io::Error::new(
        io::ErrorKind::InvalidData,
        format!("malformed wallet record: {msg}"),
    ))
}

// ---------------------------------------------------------------------------
// Serde helpers for hex-encoded Vec<u8> fields
// ---------------------------------------------------------------------------

fn hex_encode<S>(data: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&hex::encode(data))
}

fn hex_decode<'de, D>(deserializer: D) -> std::result::Result<Vec<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    hex::decode(&s).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fast() -> KdfParams {
        KdfParams {
            memory_kib: kdf::MIN_MEMORY_KIB,
            iterations: 1,
            parallelism: 1,
        }
    }

    #[test]
    fn seal_and_open() {
        let record = EncryptedSecretRecord::seal(b"pw", b"plaintext", &fast()).unwrap();
        assert_eq!(&*record.open(b"pw").unwrap(), b"plaintext");
    }

    #[test]
    fn wrong_password_is_invalid_password() {
        let record = EncryptedSecretRecord::seal(b"pw", b"plaintext", &fast()).unwrap();
        assert!(matches!(
            record.open(b"other"),
            Err(WalletError::InvalidPassword)
        ));
    }

    #[test]
    fn json_uses_hex_and_camel_case() {
        let record = EncryptedSecretRecord::seal(b"pw", b"x", &fast()).unwrap();
        let json: serde_json::Value = serde_json::to_value(&record).unwrap();

        assert_eq!(json["version"], CURRENT_VERSION);
        assert_eq!(json["algorithm"], "aes-256-gcm");
        assert_eq!(json["iv"].as_str().unwrap().len(), IV_LEN * 2);
        assert_eq!(json["authTag"].as_str().unwrap().len(), TAG_LEN * 2);
        assert_eq!(json["salt"].as_str().unwrap().len(), SALT_LEN * 2);
        assert_eq!(json["kdf"]["memoryKib"], kdf::MIN_MEMORY_KIB);
    }

    #[test]
    fn read_missing_record_is_not_found() {
        let dir = TempDir::new().unwrap();
        let result = read_record(&dir.path().join("nope.enc"));
        assert!(matches!(result, Err(WalletError::NotFound(_))));
    }

    #[test]
    fn read_garbage_is_storage_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.enc");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(read_record(&path), Err(WalletError::Storage(_))));
    }

    #[test]
    fn truncated_iv_is_storage_error() {
        let mut record = EncryptedSecretRecord::seal(b"pw", b"x", &fast()).unwrap();
        record.iv.truncate(4);
        assert!(matches!(record.open(b"pw"), Err(WalletError::Storage(_))));
    }

    #[test]
    fn out_of_range_kdf_is_storage_error() {
        let mut record = EncryptedSecretRecord::seal(b"pw", b"x", &fast()).unwrap();
        record.kdf.memory_kib = u32::MAX;
        assert!(matches!(record.open(b"pw"), Err(WalletError::Storage(_))));

        record.kdf = fast();
        record.kdf.iterations = u32::MAX;
        assert!(matches!(record.open(b"pw"), Err(WalletError::Storage(_))));
    }
}
