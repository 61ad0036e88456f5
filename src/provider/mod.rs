//! Wallet providers behind one capability set.
//!
//! `open_wallet` picks the backend from `Settings::provider`; callers
//! only ever see a `Wallet`.

pub mod custodial;
pub mod local;

use std::path::Path;

use zeroize::Zeroizing;

use crate::config::{ProviderKind, Settings};
use crate::errors::{Result, WalletError};
use crate::wallet::payload::SIGNATURE_LEN;
use crate::wallet::SecretStore;

pub use custodial::{CustodialConfig, CustodialWallet, WalletMetadata};
pub use local::LocalWallet;

/// Secrets needed to open a wallet.  Which one is required depends on
/// the provider; the other is ignored.
#[derive(Default)]
pub struct WalletAccess {
    /// Local wallet password.
    pub password: Option<Zeroizing<String>>,
    /// Custody API app secret.
    pub app_secret: Option<Zeroizing<String>>,
}

impl WalletAccess {
    pub fn with_password(password: impl Into<String>) -> Self {
        Self {
            password: Some(Zeroizing::new(password.into())),
            app_secret: None,
        }
    }

    pub fn with_app_secret(secret: impl Into<String>) -> Self {
        Self {
            password: None,
            app_secret: Some(Zeroizing::new(secret.into())),
        }
    }
}

/// Summary shown by `info`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletInfo {
    pub provider: ProviderKind,
    pub address: String,
    /// Record path for local wallets, remote wallet id for custodial ones.
    pub location: String,
}

/// An opened wallet of either kind.
pub enum Wallet {
    Local(LocalWallet),
    Custodial(CustodialWallet),
}

impl Wallet {
    pub fn kind(&self) -> ProviderKind {
        match self {
            Wallet::Local(_) => ProviderKind::Local,
            Wallet::Custodial(_) => ProviderKind::Custodial,
        }
    }

    pub fn address(&self) -> &str {
        match self {
            Wallet::Local(w) => w.address(),
            Wallet::Custodial(w) => w.address(),
        }
    }

    pub async fn sign_message(&self, message: &[u8]) -> Result<[u8; SIGNATURE_LEN]> {
        match self {
            Wallet::Local(w) => Ok(w.sign_message(message)),
            Wallet::Custodial(w) => w.sign_message(message).await,
        }
    }

    pub async fn sign_transaction(&self, tx_bytes: &[u8]) -> Result<[u8; SIGNATURE_LEN]> {
        match self {
            Wallet::Local(w) => w.sign_transaction(tx_bytes),
            Wallet::Custodial(w) => w.sign_transaction(tx_bytes).await,
        }
    }

    pub fn info(&self) -> WalletInfo {
        let location = match self {
            Wallet::Local(w) => w.path().display().to_string(),
            Wallet::Custodial(w) => w.wallet_id().to_string(),
        };
        WalletInfo {
            provider: self.kind(),
            address: self.address().to_string(),
            location,
        }
    }
}

/// Open the configured wallet.
pub async fn open_wallet(settings: &Settings, home: &Path, access: &WalletAccess) -> Result<Wallet> {
    tracing::debug!(provider = %settings.provider, "opening wallet");

    match settings.provider {
        ProviderKind::Local => {
            let password = access.password.as_ref().ok_or_else(|| {
                WalletError::InvalidParameter("a wallet password is required".into())
            })?;
            let store = SecretStore::from_settings(settings, home);
            let wallet = LocalWallet::unlock_async(store, password.as_str().to_string()).await?;
            Ok(Wallet::Local(wallet))
        }
        ProviderKind::Custodial => {
            let secret = access.app_secret.as_ref().ok_or_else(|| {
                WalletError::Config("custodial provider requires an app secret".into())
            })?;
            let config = CustodialConfig::from_settings(settings, home, secret)?;
            let wallet = CustodialWallet::initialize(config).await?;
            Ok(Wallet::Custodial(wallet))
        }
    }
}
