//! Custodial provider: a wallet held by a remote custody API.
//!
//! The agent's wallet id and address are cached in
//! `<home>/wallets/custodial/<agent_id>-wallet.json` so later runs reuse
//! the same remote wallet.  All HTTP calls go through the retry
//! executor; network failures, 429 and 5xx responses are retried, any
//! other status fails immediately.
//!
//! Endpoints (relative to the configured API URL):
//!
//! | Call                       | Purpose                         |
//! |----------------------------|---------------------------------|
//! | `GET  /wallets/{id}`       | confirm a cached wallet exists  |
//! | `POST /wallets`            | create the agent's wallet       |
//! | `POST /wallets/{id}/rpc`   | `signMessage` / `signTransaction` |

use std::path::{Path, PathBuf};
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::errors::{Result, WalletError};
use crate::retry::{retry_with_backoff, RetryPolicy};
use crate::storage;
use crate::wallet::payload::SIGNATURE_LEN;

/// Header carrying the application id on every request.
pub const APP_ID_HEADER: &str = "privy-app-id";

/// Chain type requested when creating wallets.
const CHAIN_TYPE: &str = "solana";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for the custody API.
#[derive(Clone)]
pub struct CustodialConfig {
    pub api_url: String,
    pub app_id: String,
    pub app_secret: Zeroizing<String>,
    pub agent_id: String,
    pub metadata_dir: PathBuf,
    pub retry_max_attempts: u32,
    pub retry_base_delay: Duration,
}

impl CustodialConfig {
    /// Build from settings plus the app secret supplied by the caller.
    pub fn from_settings(settings: &Settings, home: &Path, app_secret: &str) -> Result<Self> {
        let app_id = settings
            .custodial_app_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                WalletError::Config("custodial provider requires custodial_app_id".into())
            })?;
        if app_secret.is_empty() {
            return Err(WalletError::Config(
                "custodial provider requires an app secret".into(),
            ));
        }

        Ok(Self {
            api_url: settings.custodial_api_url.trim_end_matches('/').to_string(),
            app_id: app_id.to_string(),
            app_secret: Zeroizing::new(app_secret.to_string()),
            agent_id: settings.agent_id.clone(),
            metadata_dir: settings.custodial_dir(home),
            retry_max_attempts: settings.retry_max_attempts,
            retry_base_delay: Duration::from_millis(settings.retry_base_delay_ms),
        })
    }

    /// Where the cached wallet metadata for this agent lives.
    pub fn metadata_path(&self) -> PathBuf {
        self.metadata_dir
            .join(format!("{}-wallet.json", self.agent_id))
    }
}

impl std::fmt::Debug for CustodialConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustodialConfig")
            .field("api_url", &self.api_url)
            .field("app_id", &self.app_id)
            .field("agent_id", &self.agent_id)
            .field("metadata_dir", &self.metadata_dir)
            .finish_non_exhaustive()
    }
}

/// Locally cached description of the agent's remote wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletMetadata {
    pub wallet_id: String,
    pub address: String,
    pub agent_id: String,
    pub created_at: DateTime<Utc>,
}

/// Wallet object as returned by the custody API.
#[derive(Debug, Deserialize)]
struct RemoteWallet {
    id: String,
    address: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    data: RpcData,
}

#[derive(Debug, Deserialize)]
struct RpcData {
    signature: String,
}

/// A custodial wallet ready to sign.
#[derive(Debug)]
pub struct CustodialWallet {
    config: CustodialConfig,
    client: Client,
    metadata: WalletMetadata,
}

impl CustodialWallet {
    /// Reuse the agent's cached wallet if the API still knows it,
    /// otherwise create a new one and cache it.
    pub async fn initialize(config: CustodialConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| WalletError::Custodial {
                status: None,
                message: format!("failed to build HTTP client: {e}"),
            })?;

        let mut wallet = Self {
            config,
            client,
            metadata: WalletMetadata {
                wallet_id: String::new(),
                address: String::new(),
                agent_id: String::new(),
                created_at: Utc::now(),
            },
        };

        wallet.metadata = match wallet.find_existing().await? {
            Some(metadata) => {
                tracing::info!(wallet_id = %metadata.wallet_id, "using existing custodial wallet");
                metadata
            }
            None => wallet.create_remote().await?,
        };

        Ok(wallet)
    }

    pub fn address(&self) -> &str {
        &self.metadata.address
    }

    pub fn wallet_id(&self) -> &str {
        &self.metadata.wallet_id
    }

    pub fn metadata(&self) -> &WalletMetadata {
        &self.metadata
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.config.metadata_path()
    }

    pub async fn sign_message(&self, message: &[u8]) -> Result<[u8; SIGNATURE_LEN]> {
        let params = json!({
            "message": BASE64.encode(message),
            "encoding": "base64",
        });
        self.sign("signMessage", params).await
    }

    pub async fn sign_transaction(&self, tx_bytes: &[u8]) -> Result<[u8; SIGNATURE_LEN]> {
        if tx_bytes.is_empty() {
            return Err(WalletError::InvalidParameter(
                "transaction bytes cannot be empty".into(),
            ));
        }
        let params = json!({
            "transaction": BASE64.encode(tx_bytes),
            "encoding": "base64",
        });
        self.sign("signTransaction", params).await
    }

    // ------------------------------------------------------------------
    // Internal helpers
    // ------------------------------------------------------------------

    async fn find_existing(&self) -> Result<Option<WalletMetadata>> {
        let path = self.config.metadata_path();
        if !path.exists() {
            return Ok(None);
        }

        let cached: WalletMetadata = serde_json::from_slice(&std::fs::read(&path)?)
            .map_err(|e| WalletError::Serialization(format!("{}: {e}", path.display())))?;

        let endpoint = format!("/wallets/{}", cached.wallet_id);
        match self
            .call::<RemoteWallet>(Method::GET, &endpoint, None, "custodial-get-wallet")
            .await
        {
            Ok(remote) => Ok(Some(WalletMetadata {
                wallet_id: remote.id,
                address: remote.address,
                ..cached
            })),
            Err(WalletError::Custodial {
                status: Some(404), ..
            }) => {
                tracing::warn!(
                    wallet_id = %cached.wallet_id,
                    "cached custodial wallet no longer exists, creating a new one"
                );
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn create_remote(&self) -> Result<WalletMetadata> {
        let body = json!({
            "chain_type": CHAIN_TYPE,
            "metadata": {
                "agent_id": self.config.agent_id,
                "created_by": "launchkey",
            },
        });
        let remote: RemoteWallet = self
            .call(Method::POST, "/wallets", Some(&body), "custodial-create-wallet")
            .await?;

        let metadata = WalletMetadata {
            wallet_id: remote.id,
            address: remote.address,
            agent_id: self.config.agent_id.clone(),
            created_at: Utc::now(),
        };

        let json = serde_json::to_vec_pretty(&metadata)
            .map_err(|e| WalletError::Serialization(format!("wallet metadata: {e}")))?;
        storage::write_private(&self.config.metadata_path(), &json)?;

        tracing::info!(wallet_id = %metadata.wallet_id, "created custodial wallet");
        Ok(metadata)
    }

    async fn sign(&self, method: &str, params: serde_json::Value) -> Result<[u8; SIGNATURE_LEN]> {
        let body = json!({ "method": method, "params": params });
        let endpoint = format!("/wallets/{}/rpc", self.metadata.wallet_id);
        let response: RpcResponse = self
            .call(Method::POST, &endpoint, Some(&body), method)
            .await?;

        let bytes = BASE64
            .decode(response.data.signature.trim())
            .map_err(|e| WalletError::Serialization(format!("custody API signature: {e}")))?;
        bytes.as_slice().try_into().map_err(|_| {
            WalletError::Serialization(format!(
                "custody API returned a {}-byte signature, expected {SIGNATURE_LEN}",
                bytes.len()
            ))
        })
    }

    /// One logical API call, retried on transient failures.
    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&serde_json::Value>,
        operation: &str,
    ) -> Result<T> {
        let policy = RetryPolicy::new(operation)
            .max_attempts(self.config.retry_max_attempts)
            .base_delay(self.config.retry_base_delay)
            .should_retry(|e: &WalletError, _| e.is_transient());

        retry_with_backoff(|| self.send(method.clone(), endpoint, body), &policy)
            .await
            .map_err(WalletError::from)
    }

    /// A single HTTP round trip.
    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<T> {
        let url = format!("{}{endpoint}", self.config.api_url);
        let mut request = self
            .client
            .request(method, &url)
            .basic_auth(&self.config.app_id, Some(self.config.app_secret.as_str()))
            .header(APP_ID_HEADER, &self.config.app_id);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| WalletError::Custodial {
            status: None,
            message: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(WalletError::Custodial {
                status: Some(status.as_u16()),
                message: error_message(status, &text),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| WalletError::Serialization(format!("custody API response: {e}")))
    }
}

fn error_message(status: StatusCode, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        body.to_string()
    }
}
