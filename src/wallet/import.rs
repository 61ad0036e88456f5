//! Decoders for the portable key formats accepted by `import`.
//!
//! - **base58**: a base58 string of a 64-byte keypair or 32-byte seed.
//! - **JSON array**: `[12, 34, ...]` with 64 or 32 entries.
//! - **keypair file**: a file containing such a JSON array, as written
//!   by the common chain CLI tooling.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use zeroize::Zeroizing;

use crate::errors::{Result, WalletError};

/// How a raw secret key is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawKeyFormat {
    Base58,
    JsonArray,
    KeypairFile,
}

impl FromStr for RawKeyFormat {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "base58" | "private-key" | "privatekey" => Ok(Self::Base58),
            "json" | "secret-key-array" | "secretkeyarray" => Ok(Self::JsonArray),
            "keypair-file" | "keypairfile" | "file" => Ok(Self::KeypairFile),
            other => Err(WalletError::InvalidParameter(format!(
                "unsupported import type '{other}'; supported: base58, json, keypair-file"
            ))),
        }
    }
}

impl RawKeyFormat {
    /// Decode `input` into raw key bytes.  For `KeypairFile`, `input` is a path.
    pub fn decode(self, input: &str) -> Result<Zeroizing<Vec<u8>>> {
        match self {
            Self::Base58 => decode_base58(input),
            Self::JsonArray => decode_json_array(input),
            Self::KeypairFile => read_keypair_file(Path::new(input.trim())),
        }
    }
}

/// Decode a base58 private key.
pub fn decode_base58(input: &str) -> Result<Zeroizing<Vec<u8>>> {
    bs58::decode(input.trim())
        .into_vec()
        .map(Zeroizing::new)
        .map_err(|e| WalletError::InvalidParameter(format!("invalid base58 private key: {e}")))
}

/// Decode a JSON array of byte values.
pub fn decode_json_array(input: &str) -> Result<Zeroizing<Vec<u8>>> {
    serde_json::from_str::<Vec<u8>>(input.trim())
        .map(Zeroizing::new)
        .map_err(|e| WalletError::InvalidParameter(format!("invalid secret key array: {e}")))
}

/// Read a keypair file containing a JSON byte array.
pub fn read_keypair_file(path: &Path) -> Result<Zeroizing<Vec<u8>>> {
    if !path.exists() {
        return Err(WalletError::NotFound(path.to_path_buf()));
    }
    let contents = Zeroizing::new(fs::read_to_string(path)?);
    decode_json_array(&contents)
}
