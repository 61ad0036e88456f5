//! Cryptographic primitives for LaunchKey.
//!
//! This module provides:
//! - AES-256-GCM encryption with a detached tag (`encryption`)
//! - Argon2id password-based key derivation (`kdf`)
//! - SLIP-0010 ed25519 key derivation from a BIP-39 seed (`derivation`)

pub mod derivation;
pub mod encryption;
pub mod kdf;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{encrypt, decrypt, derive_key, ...};
pub use derivation::{derive_ed25519_seed, DEFAULT_DERIVATION_PATH};
pub use encryption::{decrypt, encrypt, Sealed};
pub use kdf::{derive_key, generate_salt, KdfParams};
