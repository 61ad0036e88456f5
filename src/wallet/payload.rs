//! The decrypted wallet secret and the signing operations over it.
//!
//! A `SecretPayload` only ever exists in memory.  It is serialized to
//! JSON solely as the plaintext input of the record cipher, and its
//! `Debug` output never includes key material or the recovery phrase.

use std::fmt;

use chrono::{DateTime, Utc};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::errors::{Result, WalletError};

/// Length of an ed25519 keypair (32-byte seed followed by 32-byte public key).
pub const KEYPAIR_LEN: usize = 64;

/// Length of an ed25519 seed.
pub const SEED_LEN: usize = 32;

/// Length of an ed25519 signature.
pub const SIGNATURE_LEN: usize = 64;

/// The unlocked wallet: signing key, optional recovery phrase, derived
/// address and creation timestamp.
pub struct SecretPayload {
    signing_key: SigningKey,
    mnemonic: Option<Zeroizing<String>>,
    address: String,
    created_at: DateTime<Utc>,
}

/// On-the-wire shape of the plaintext that gets encrypted.
#[derive(Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
struct PayloadJson {
    secret_key: Vec<u8>,
    mnemonic: Option<String>,
    address: String,
    #[zeroize(skip)]
    created_at: DateTime<Utc>,
}

impl SecretPayload {
    /// Wrap a signing key, stamping the creation time as now.
    pub fn new(signing_key: SigningKey, mnemonic: Option<String>) -> Self {
        let address = address_of(&signing_key.verifying_key());
        Self {
            signing_key,
            mnemonic: mnemonic.map(Zeroizing::new),
            address,
            created_at: Utc::now(),
        }
    }

    /// Build a payload from raw key bytes: a 64-byte keypair or a 32-byte seed.
    pub fn from_raw_key(raw: &[u8]) -> Result<Self> {
        Ok(Self::new(signing_key_from_bytes(raw)?, None))
    }

    /// Base58-encoded public key.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// The recovery phrase, if the wallet was created from one.
    pub fn mnemonic(&self) -> Option<&str> {
        self.mnemonic.as_deref().map(String::as_str)
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn public_key(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// The 64-byte keypair (seed || public key).
    pub fn keypair_bytes(&self) -> Zeroizing<[u8; KEYPAIR_LEN]> {
        Zeroizing::new(self.signing_key.to_keypair_bytes())
    }

    /// Serialize for encryption.  The returned buffer is wiped on drop.
    pub(crate) fn to_plaintext(&self) -> Result<Zeroizing<Vec<u8>>> {
        let json = PayloadJson {
            secret_key: self.signing_key.to_keypair_bytes().to_vec(),
            mnemonic: self.mnemonic().map(str::to_string),
            address: self.address.clone(),
            created_at: self.created_at,
        };
        serde_json::to_vec(&json)
            .map(Zeroizing::new)
            .map_err(|e| WalletError::Serialization(format!("wallet payload: {e}")))
    }

    /// Parse a decrypted plaintext and check its internal consistency.
    pub(crate) fn from_plaintext(bytes: &[u8]) -> Result<Self> {
        let json: PayloadJson = serde_json::from_slice(bytes)
            .map_err(|e| WalletError::Serialization(format!("wallet payload: {e}")))?;

        let signing_key = signing_key_from_bytes(&json.secret_key)?;
        let address = address_of(&signing_key.verifying_key());
        if address != json.address {
            return Err(WalletError::Serialization(
                "wallet payload address does not match its key".into(),
            ));
        }

        Ok(Self {
            signing_key,
            mnemonic: json.mnemonic.clone().map(Zeroizing::new),
            address,
            created_at: json.created_at,
        })
    }
}

impl fmt::Debug for SecretPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretPayload")
            .field("address", &self.address)
            .field("has_mnemonic", &self.mnemonic.is_some())
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

/// Decode a signing key from a 64-byte keypair or a 32-byte seed.
///
/// A keypair whose public half does not belong to its secret half is
/// rejected.
pub fn signing_key_from_bytes(raw: &[u8]) -> Result<SigningKey> {
    match raw.len() {
        KEYPAIR_LEN => {
            let mut bytes = Zeroizing::new([0u8; KEYPAIR_LEN]);
            bytes.copy_from_slice(raw);
            SigningKey::from_keypair_bytes(&bytes).map_err(|_| {
                WalletError::InvalidParameter(
                    "keypair public key does not match its secret key".into(),
                )
            })
        }
        SEED_LEN => {
            let mut bytes = Zeroizing::new([0u8; SEED_LEN]);
            bytes.copy_from_slice(raw);
            Ok(SigningKey::from_bytes(&bytes))
        }
        n => Err(WalletError::InvalidParameter(format!(
            "secret key must be {KEYPAIR_LEN} or {SEED_LEN} bytes, got {n}"
        ))),
    }
}

/// Base58 address of a public key.
pub fn address_of(key: &VerifyingKey) -> String {
    bs58::encode(key.as_bytes()).into_string()
}

/// Sign an arbitrary message with the unlocked wallet.
pub fn sign_message(payload: &SecretPayload, message: &[u8]) -> [u8; SIGNATURE_LEN] {
    payload.signing_key.sign(message).to_bytes()
}

/// Sign serialized transaction message bytes with the unlocked wallet.
pub fn sign_transaction(payload: &SecretPayload, tx_bytes: &[u8]) -> Result<[u8; SIGNATURE_LEN]> {
    if tx_bytes.is_empty() {
        return Err(WalletError::InvalidParameter(
            "transaction bytes cannot be empty".into(),
        ));
    }
    Ok(payload.signing_key.sign(tx_bytes).to_bytes())
}

/// Check `signature` over `message` against a base58 address.
pub fn verify_signature(address: &str, message: &[u8], signature: &[u8]) -> Result<bool> {
    let decoded = bs58::decode(address)
        .into_vec()
        .map_err(|e| WalletError::InvalidParameter(format!("invalid address '{address}': {e}")))?;
    let key_bytes: [u8; 32] = decoded.as_slice().try_into().map_err(|_| {
        WalletError::InvalidParameter(format!("address '{address}' is not a 32-byte public key"))
    })?;
    let key = VerifyingKey::from_bytes(&key_bytes).map_err(|e| {
        WalletError::InvalidParameter(format!("address '{address}' is not a valid key: {e}"))
    })?;

    let Ok(signature) = Signature::from_slice(signature) else {
        return Ok(false);
    };
    Ok(key.verify(message, &signature).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> SecretPayload {
        SecretPayload::from_raw_key(&[7u8; SEED_LEN]).unwrap()
    }

    #[test]
    fn plaintext_roundtrip_preserves_everything() {
        let original = SecretPayload::new(
            SigningKey::from_bytes(&[3u8; SEED_LEN]),
            Some("abandon ability".into()),
        );
        let bytes = original.to_plaintext().unwrap();
        let restored = SecretPayload::from_plaintext(&bytes).unwrap();

        assert_eq!(restored.address(), original.address());
        assert_eq!(restored.mnemonic(), Some("abandon ability"));
        assert_eq!(restored.created_at(), original.created_at());
        assert_eq!(*restored.keypair_bytes(), *original.keypair_bytes());
    }

    #[test]
    fn keypair_and_seed_give_same_address() {
        let from_seed = payload();
        let from_keypair = SecretPayload::from_raw_key(&*from_seed.keypair_bytes()).unwrap();
        assert_eq!(from_seed.address(), from_keypair.address());
    }

    #[test]
    fn mismatched_keypair_is_rejected() {
        let mut bytes = *payload().keypair_bytes();
        bytes[40] ^= 0xFF;
        assert!(matches!(
            signing_key_from_bytes(&bytes),
            Err(WalletError::InvalidParameter(_))
        ));
    }

    #[test]
    fn wrong_length_is_rejected() {
        assert!(signing_key_from_bytes(&[0u8; 16]).is_err());
    }

    #[test]
    fn signatures_verify_against_address() {
        let p = payload();
        let sig = sign_message(&p, b"hello launchpad");
        assert!(verify_signature(p.address(), b"hello launchpad", &sig).unwrap());
        assert!(!verify_signature(p.address(), b"tampered", &sig).unwrap());
    }

    #[test]
    fn empty_transaction_is_rejected() {
        assert!(sign_transaction(&payload(), &[]).is_err());
        assert!(sign_transaction(&payload(), &[1, 2, 3]).is_ok());
    }

    #[test]
    fn debug_output_is_redacted() {
        let p = SecretPayload::new(
            SigningKey::from_bytes(&[3u8; SEED_LEN]),
            Some("hidden-phrase-words".into()),
        );
        let rendered = format!("{p:?}");
        assert!(!rendered.contains("hidden-phrase"));
        assert!(rendered.contains(p.address()));
    }
}
