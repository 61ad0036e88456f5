//! Encrypted local wallet.
//!
//! - `record`: the on-disk JSON record and its seal/open operations
//! - `payload`: the decrypted secret and signing over it
//! - `mnemonic`: BIP-39 phrases and key derivation from them
//! - `import`: decoders for raw key formats
//! - `store`: `SecretStore`, the create/import/load/change-password API

pub mod import;
pub mod mnemonic;
pub mod payload;
pub mod record;
pub mod store;

pub use import::RawKeyFormat;
pub use payload::{sign_message, sign_transaction, verify_signature, SecretPayload};
pub use record::EncryptedSecretRecord;
pub use store::{CreatedWallet, SecretStore};
