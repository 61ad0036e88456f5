//! Local provider: a wallet file unlocked with a password.

use std::path::{Path, PathBuf};

use crate::errors::{Result, WalletError};
use crate::wallet::payload::{self, SIGNATURE_LEN};
use crate::wallet::{SecretPayload, SecretStore};

/// An unlocked local wallet.  Signing never touches the disk.
pub struct LocalWallet {
    path: PathBuf,
    payload: SecretPayload,
}

impl LocalWallet {
    /// Decrypt the store's record.
    pub fn unlock(store: &SecretStore, password: &str) -> Result<Self> {
        let payload = store.load(password)?;
        Ok(Self {
            path: store.path().to_path_buf(),
            payload,
        })
    }

    /// Decrypt on the blocking pool so Argon2 does not stall the runtime.
    pub async fn unlock_async(store: SecretStore, password: String) -> Result<Self> {
        let password = zeroize::Zeroizing::new(password);
        tokio::task::spawn_blocking(move || Self::unlock(&store, &password))
            .await
            .map_err(|e| WalletError::CommandFailed(format!("wallet unlock task failed: {e}")))?
    }

    pub fn address(&self) -> &str {
        self.payload.address()
    }

    /// Path of the encrypted record this wallet was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn payload(&self) -> &SecretPayload {
        &self.payload
    }

    pub fn sign_message(&self, message: &[u8]) -> [u8; SIGNATURE_LEN] {
        payload::sign_message(&self.payload, message)
    }

    pub fn sign_transaction(&self, tx_bytes: &[u8]) -> Result<[u8; SIGNATURE_LEN]> {
        payload::sign_transaction(&self.payload, tx_bytes)
    }
}
