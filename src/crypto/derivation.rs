//! SLIP-0010 hierarchical derivation for ed25519.
//!
//! ed25519 only supports hardened children, so every path segment must
//! carry the `'` marker.  The wallet derivation path is
//! `m/44'/501'/0'/0'`.
//!
//! ```text
//! I = HMAC-SHA512(key = "ed25519 seed", data = seed)
//! child: I = HMAC-SHA512(key = chain_code, data = 0x00 || k || ser32(i | 2^31))
//! k = I[0..32], chain_code = I[32..64]
//! ```

use hmac::{Hmac, Mac};
use sha2::Sha512;
use zeroize::Zeroizing;

use crate::errors::{Result, WalletError};

/// Standard derivation path for wallets in this ecosystem.
pub const DEFAULT_DERIVATION_PATH: &str = "m/44'/501'/0'/0'";

const HARDENED_OFFSET: u32 = 0x8000_0000;
const CURVE_KEY: &[u8] = b"ed25519 seed";

/// Parse a path such as `m/44'/501'/0'/0'` into hardened indices.
pub fn parse_path(path: &str) -> Result<Vec<u32>> {
    let mut segments = path.split('/');
    if segments.next() != Some("m") {
        return Err(WalletError::InvalidParameter(format!(
            "derivation path '{path}' must start with 'm'"
        )));
    }

    segments
        .map(|segment| {
            let index = segment.strip_suffix('\'').ok_or_else(|| {
                WalletError::InvalidParameter(format!(
                    "segment '{segment}' in '{path}' is not hardened; ed25519 requires hardened derivation"
                ))
            })?;
            let index: u32 = index.parse().map_err(|_| {
                WalletError::InvalidParameter(format!("invalid segment '{segment}' in '{path}'"))
            })?;
            if index >= HARDENED_OFFSET {
                return Err(WalletError::InvalidParameter(format!(
                    "segment '{segment}' in '{path}' is out of range"
                )));
            }
            Ok(index | HARDENED_OFFSET)
        })
        .collect()
}

/// Derive the 32-byte ed25519 seed at `path` from a BIP-39 seed.
pub fn derive_ed25519_seed(seed: &[u8], path: &str) -> Result<Zeroizing<[u8; 32]>> {
    let indices = parse_path(path)?;

    let (mut key, mut chain_code) = split(hmac_sha512(CURVE_KEY, &[seed])?);

    for index in indices {
        let (child_key, child_chain) = split(hmac_sha512(
            &chain_code[..],
            &[&[0u8][..], &key[..], &index.to_be_bytes()[..]],
        )?);
        key = child_key;
        chain_code = child_chain;
    }

    Ok(key)
}

fn hmac_sha512(key: &[u8], parts: &[&[u8]]) -> Result<Zeroizing<[u8; 64]>> {
    let mut mac = Hmac::<Sha512>::new_from_slice(key)
        .map_err(|e| WalletError::KeyDerivation(format!("HMAC init failed: {e}")))?;
    for part in parts {
        mac.update(part);
    }
    let mut out = Zeroizing::new([0u8; 64]);
    out.copy_from_slice(&mac.finalize().into_bytes());
    Ok(out)
}

fn split(i: Zeroizing<[u8; 64]>) -> (Zeroizing<[u8; 32]>, Zeroizing<[u8; 32]>) {
    let mut left = Zeroizing::new([0u8; 32]);
    let mut right = Zeroizing::new([0u8; 32]);
    left.copy_from_slice(&i[..32]);
    right.copy_from_slice(&i[32..]);
    (left, right)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_default_path() {
        let indices = parse_path(DEFAULT_DERIVATION_PATH).unwrap();
        assert_eq!(
            indices,
            vec![
                44 | HARDENED_OFFSET,
                501 | HARDENED_OFFSET,
                HARDENED_OFFSET,
                HARDENED_OFFSET
            ]
        );
    }

    #[test]
    fn rejects_unhardened_segments() {
        assert!(parse_path("m/44'/501'/0/0").is_err());
        assert!(parse_path("44'/501'").is_err());
        assert!(parse_path("m/abc'").is_err());
    }

    // SLIP-0010 test vector 1 for ed25519.
    #[test]
    fn slip10_master_key_vector() {
        let seed = hex::decode("000102030405060708090a0b0c0d0e0f").unwrap();
        let key = derive_ed25519_seed(&seed, "m").unwrap();
        assert_eq!(
            hex::encode(*key),
            "2b4be7f19ee27bbf30c667b642d5f4aa69fd169872f8fc3059c08ebae2eb19e7"
        );
    }

    #[test]
    fn slip10_hardened_child_vector() {
        let seed = hex::decode("000102030405060708090a0b0c0d0e0f").unwrap();
        let key = derive_ed25519_seed(&seed, "m/0'").unwrap();
        assert_eq!(
            hex::encode(*key),
            "68e0fe46dfb67e368c75379acec591dad19df3cde26e63b93a8e704f1dade7a3"
        );
    }

    #[test]
    fn derivation_is_deterministic() {
        let seed = [9u8; 64];
        let a = derive_ed25519_seed(&seed, DEFAULT_DERIVATION_PATH).unwrap();
        let b = derive_ed25519_seed(&seed, DEFAULT_DERIVATION_PATH).unwrap();
        assert_eq!(*a, *b);
    }
}
