//! High-level wallet operations used by CLI commands and providers.
//!
//! `SecretStore` ties the record format, the recovery-phrase layer and
//! the payload together so callers only deal with a path, a password and
//! an address.  The store never prompts and never reads the environment:
//! passwords always come in as parameters.

use std::path::{Path, PathBuf};

use zeroize::Zeroizing;

use crate::config::Settings;
use crate::crypto::kdf::KdfParams;
use crate::errors::{Result, WalletError};

use super::mnemonic;
use super::payload::SecretPayload;
use super::record::{read_record, write_record, EncryptedSecretRecord};

/// Result of `SecretStore::create`.
///
/// The recovery phrase is handed back exactly once so the caller can
/// show it to the user; it is wiped when this value is dropped.
pub struct CreatedWallet {
    pub address: String,
    pub mnemonic: Zeroizing<String>,
}

/// Handle to a single encrypted wallet file.
#[derive(Debug, Clone)]
pub struct SecretStore {
    /// Path to the wallet record on disk.
    path: PathBuf,

    /// Argon2id parameters used for new records.
    kdf: KdfParams,

    /// Whether create/import may replace an existing record.
    allow_overwrite: bool,
}

impl SecretStore {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    pub fn new(path: impl Into<PathBuf>, kdf: KdfParams) -> Self {
        Self {
            path: path.into(),
            kdf,
            allow_overwrite: false,
        }
    }

    /// Build a store for the configured wallet file under `home`.
    pub fn from_settings(settings: &Settings, home: &Path) -> Self {
        Self::new(settings.wallet_path(home), settings.kdf_params())
    }

    /// Allow `create` and the imports to replace an existing wallet.
    pub fn allow_overwrite(mut self, allow: bool) -> Self {
        self.allow_overwrite = allow;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    // ------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------

    /// Generate a new wallet from a fresh 12- or 24-word recovery phrase.
    pub fn create(&self, password: &str, word_count: usize) -> Result<CreatedWallet> {
        check_password(password)?;
        self.check_writable()?;

        let phrase = mnemonic::generate(word_count)?;
        let signing_key = mnemonic::signing_key(&phrase)?;
        let words = Zeroizing::new(phrase.to_string());

        let payload = SecretPayload::new(signing_key, Some(words.as_str().to_string()));
        self.persist(&payload, password)?;

        tracing::info!(address = payload.address(), word_count, "wallet created");
        Ok(CreatedWallet {
            address: payload.address().to_string(),
            mnemonic: words,
        })
    }

    /// Restore a wallet from an existing recovery phrase.
    ///
    /// Derives exactly the key `create` would have derived for the
    /// same phrase.
    pub fn import_from_mnemonic(&self, phrase: &str, password: &str) -> Result<String> {
        check_password(password)?;
        let parsed = mnemonic::parse(phrase)?;
        self.check_writable()?;

        let signing_key = mnemonic::signing_key(&parsed)?;
        let payload = SecretPayload::new(signing_key, Some(parsed.to_string()));
        self.persist(&payload, password)?;

        tracing::info!(address = payload.address(), "wallet imported from recovery phrase");
        Ok(payload.address().to_string())
    }

    /// Import raw key bytes (64-byte keypair or 32-byte seed).
    pub fn import_from_raw_key(&self, raw_key: &[u8], password: &str) -> Result<String> {
        check_password(password)?;
        let payload = SecretPayload::from_raw_key(raw_key)?;
        self.check_writable()?;

        self.persist(&payload, password)?;

        tracing::info!(address = payload.address(), "wallet imported from raw key");
        Ok(payload.address().to_string())
    }

    /// Decrypt the wallet.
    ///
    /// `InvalidPassword` covers both a wrong password and a tampered
    /// ciphertext; the two are indistinguishable.
    pub fn load(&self, password: &str) -> Result<SecretPayload> {
        check_password(password)?;
        let record = read_record(&self.path)?;
        let plaintext = record.open(password.as_bytes())?;
        let payload = SecretPayload::from_plaintext(&plaintext)?;

        tracing::debug!(address = payload.address(), "wallet unlocked");
        Ok(payload)
    }

    /// Re-encrypt the wallet under `new_password` with a fresh salt and IV.
    ///
    /// The payload (including the recovery phrase and creation time) is
    /// carried over unchanged, and the old file is replaced atomically.
    pub fn change_password(&self, old_password: &str, new_password: &str) -> Result<()> {
        check_password(new_password)?;
        let payload = self.load(old_password)?;
        self.persist(&payload, new_password)?;

        tracing::info!(address = payload.address(), "wallet password changed");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Internal helpers
    // ------------------------------------------------------------------

    fn check_writable(&self) -> Result<()> {
        if self.exists() && !self.allow_overwrite {
            return Err(WalletError::AlreadyExists(self.path.clone()));
        }
        Ok(())
    }

    fn persist(&self, payload: &SecretPayload, password: &str) -> Result<()> {
        let plaintext = payload.to_plaintext()?;
        let record = EncryptedSecretRecord::seal(password.as_bytes(), &plaintext, &self.kdf)?;
        write_record(&self.path, &record)
    }
}

fn check_password(password: &str) -> Result<()> {
    if password.is_empty() {
        return Err(WalletError::InvalidParameter(
            "password cannot be empty".into(),
        ));
    }
    Ok(())
}
