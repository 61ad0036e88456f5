//! BIP-39 recovery phrases and the keys derived from them.

use bip39::{Language, Mnemonic};
use ed25519_dalek::SigningKey;
use rand::RngCore;
use zeroize::Zeroizing;

use crate::crypto::derivation::{derive_ed25519_seed, DEFAULT_DERIVATION_PATH};
use crate::errors::{Result, WalletError};

/// Supported phrase lengths and their entropy in bytes.
const WORD_COUNTS: [(usize, usize); 2] = [(12, 16), (24, 32)];

/// Generate a new random recovery phrase of 12 or 24 words.
pub fn generate(word_count: usize) -> Result<Mnemonic> {
    let entropy_len = WORD_COUNTS
        .iter()
        .find(|(words, _)| *words == word_count)
        .map(|(_, len)| *len)
        .ok_or_else(|| {
            WalletError::InvalidParameter(format!(
                "word count must be 12 or 24 (got {word_count})"
            ))
        })?;

    let mut entropy = Zeroizing::new([0u8; 32]);
    rand::rng().fill_bytes(&mut entropy[..entropy_len]);

    Mnemonic::from_entropy_in(Language::English, &entropy[..entropy_len])
        .map_err(|e| WalletError::InvalidMnemonic(e.to_string()))
}

/// Validate a user-supplied phrase against the English wordlist and checksum.
///
/// Case and surrounding/duplicate whitespace are normalized first.
/// Only 12- and 24-word phrases are accepted, even though BIP-39 also
/// defines 15, 18 and 21 words.
pub fn parse(phrase: &str) -> Result<Mnemonic> {
    let normalized = Zeroizing::new(
        phrase
            .split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join(" "),
    );

    if normalized.is_empty() {
        return Err(WalletError::InvalidMnemonic("phrase is empty".into()));
    }

    let word_count = normalized.split(' ').count();
    if !WORD_COUNTS.iter().any(|(words, _)| *words == word_count) {
        return Err(WalletError::InvalidMnemonic(format!(
            "recovery phrase must have 12 or 24 words (got {word_count})"
        )));
    }

    Mnemonic::parse_in_normalized(Language::English, &normalized)
        .map_err(|e| WalletError::InvalidMnemonic(e.to_string()))
}

/// Derive the wallet signing key from a phrase along the standard path.
pub fn signing_key(mnemonic: &Mnemonic) -> Result<SigningKey> {
    signing_key_at(mnemonic, DEFAULT_DERIVATION_PATH)
}

/// Derive the signing key along an explicit hardened path.
pub fn signing_key_at(mnemonic: &Mnemonic, path: &str) -> Result<SigningKey> {
    let seed = Zeroizing::new(mnemonic.to_seed_normalized(""));
    let derived = derive_ed25519_seed(&seed[..], path)?;
    Ok(SigningKey::from_bytes(&derived))
}
