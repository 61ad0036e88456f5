use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::crypto::kdf::{KdfParams, MIN_MEMORY_KIB};
use crate::errors::{Result, WalletError};

/// Which wallet backend signs for the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Password-encrypted wallet file on this machine.
    #[default]
    #[serde(alias = "local-encrypted")]
    Local,

    /// Wallet held by a remote custody API.
    #[serde(alias = "privy")]
    Custodial,
}

impl FromStr for ProviderKind {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "local" | "local-encrypted" => Ok(Self::Local),
            "custodial" | "privy" => Ok(Self::Custodial),
            other => Err(WalletError::Config(format!(
                "unknown wallet provider '{other}', expected 'local' or 'custodial'"
            ))),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => f.write_str("local"),
            Self::Custodial => f.write_str("custodial"),
        }
    }
}

/// LaunchKey configuration, loaded from `<home>/config.toml`.
///
/// Every field has a sensible default so LaunchKey works out-of-the-box
/// without any config file at all.  Secrets never live here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Wallet backend.
    #[serde(default)]
    pub provider: ProviderKind,

    /// Identifier of the agent this wallet signs for.
    #[serde(default = "default_agent_id")]
    pub agent_id: String,

    /// Wallet record path, relative to the home directory.
    #[serde(default = "default_wallet_file")]
    pub wallet_file: String,

    /// Argon2 memory cost in KiB (default: 64 MB).
    #[serde(default = "default_argon2_memory_kib")]
    pub argon2_memory_kib: u32,

    /// Argon2 iteration count (default: 3).
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,

    /// Argon2 parallelism degree (default: 4).
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,

    /// Total attempts for retried network calls (default: 4).
    #[serde(default = "default_retry_max_attempts")]
    pub retry_max_attempts: u32,

    /// Delay before the first retry; doubles each time (default: 1000 ms).
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,

    /// Base URL of the custody API.
    #[serde(default = "default_custodial_api_url")]
    pub custodial_api_url: String,

    /// Custody API application id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custodial_app_id: Option<String>,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_agent_id() -> String {
    "launchpad-trader".to_string()
}

fn default_wallet_file() -> String {
    "wallets/launchpad-trader.enc".to_string()
}

fn default_argon2_memory_kib() -> u32 {
    65_536 // 64 MB
}

fn default_argon2_iterations() -> u32 {
    3
}

fn default_argon2_parallelism() -> u32 {
    4
}

fn default_retry_max_attempts() -> u32 {
    4
}

fn default_retry_base_delay_ms() -> u64 {
    1_000
}

fn default_custodial_api_url() -> String {
    "https://auth.privy.io/api/v1".to_string()
}

// ── Validation report ────────────────────────────────────────────────

/// Outcome of `Settings::validate`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Validation {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            agent_id: default_agent_id(),
            wallet_file: default_wallet_file(),
            argon2_memory_kib: default_argon2_memory_kib(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
            retry_max_attempts: default_retry_max_attempts(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            custodial_api_url: default_custodial_api_url(),
            custodial_app_id: None,
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the home directory.
    pub const FILE_NAME: &'static str = "config.toml";

    /// Load settings from `<home>/config.toml`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(home: &Path) -> Result<Self> {
        let config_path = home.join(Self::FILE_NAME);

        if !config_path.exists() {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            WalletError::Config(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        Ok(settings)
    }

    /// Render as TOML (used by `config show`).
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| WalletError::Serialization(format!("settings: {e}")))
    }

    /// Full path to the local wallet record.
    ///
    /// Example: `~/.launchkey/wallets/launchpad-trader.enc`
    pub fn wallet_path(&self, home: &Path) -> PathBuf {
        home.join(&self.wallet_file)
    }

    /// Directory holding custodial wallet metadata.
    pub fn custodial_dir(&self, home: &Path) -> PathBuf {
        home.join("wallets").join("custodial")
    }

    /// Convert the Argon2 settings into crypto-layer params.
    pub fn kdf_params(&self) -> KdfParams {
        KdfParams {
            memory_kib: self.argon2_memory_kib,
            iterations: self.argon2_iterations,
            parallelism: self.argon2_parallelism,
        }
    }

    /// Check the settings for values that would fail at use time.
    pub fn validate(&self) -> Validation {
        let mut report = Validation::default();

        if self.agent_id.trim().is_empty() {
            report.errors.push("agent_id cannot be empty".into());
        }
        if self.wallet_file.trim().is_empty() {
            report.errors.push("wallet_file cannot be empty".into());
        }

        if let Err(e) = self.kdf_params().validate() {
            report.errors.push(e.to_string());
        } else if self.argon2_memory_kib < default_argon2_memory_kib() {
            report.warnings.push(format!(
                "argon2_memory_kib {} is below the recommended {} (minimum {MIN_MEMORY_KIB})",
                self.argon2_memory_kib,
                default_argon2_memory_kib()
            ));
        }

        if self.retry_max_attempts == 0 {
            report.errors.push("retry_max_attempts must be at least 1".into());
        }
        if self.retry_base_delay_ms == 0 {
            report.errors.push("retry_base_delay_ms must be positive".into());
        }

        let url = self.custodial_api_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            report
                .errors
                .push(format!("custodial_api_url '{url}' must start with http:// or https://"));
        } else if url.starts_with("http://") {
            report
                .warnings
                .push("custodial_api_url uses plain HTTP; credentials are sent unencrypted".into());
        }

        if self.provider == ProviderKind::Custodial
            && self
                .custodial_app_id
                .as_deref()
                .map_or(true, |id| id.trim().is_empty())
        {
            report
                .errors
                .push("custodial provider requires custodial_app_id".into());
        }

        report
    }
}

/// Default home directory: `~/.launchkey`.
pub fn default_home() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(".launchkey"))
        .ok_or_else(|| WalletError::Config("cannot determine home directory".into()))
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_settings_are_sensible() {
        let s = Settings::default();
        assert_eq!(s.provider, ProviderKind::Local);
        assert_eq!(s.wallet_file, "wallets/launchpad-trader.enc");
        assert_eq!(s.argon2_memory_kib, 65_536);
        assert_eq!(s.argon2_iterations, 3);
        assert_eq!(s.argon2_parallelism, 4);
        assert_eq!(s.retry_max_attempts, 4);
        assert_eq!(s.retry_base_delay_ms, 1_000);
        assert!(s.validate().is_valid());
    }

    #[test]
    fn load_returns_defaults_when_no_config_file() {
        let tmp = TempDir::new().unwrap();
        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn load_parses_toml_file() {
        let tmp = TempDir::new().unwrap();
        let config = r#"
provider = "privy"
agent_id = "sniper"
wallet_file = "keys/sniper.enc"
argon2_memory_kib = 131072
argon2_iterations = 5
argon2_parallelism = 8
retry_max_attempts = 6
retry_base_delay_ms = 250
custodial_app_id = "app-123"
"#;
        fs::write(tmp.path().join("config.toml"), config).unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.provider, ProviderKind::Custodial);
        assert_eq!(settings.agent_id, "sniper");
        assert_eq!(settings.argon2_memory_kib, 131_072);
        assert_eq!(settings.retry_max_attempts, 6);
        assert_eq!(settings.retry_base_delay_ms, 250);
        assert_eq!(settings.custodial_app_id.as_deref(), Some("app-123"));
        assert_eq!(
            settings.wallet_path(tmp.path()),
            tmp.path().join("keys/sniper.enc")
        );
    }

    #[test]
    fn load_uses_defaults_for_missing_fields() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "agent_id = \"bot\"\n").unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.agent_id, "bot");
        assert_eq!(settings.argon2_iterations, 3);
        assert_eq!(settings.provider, ProviderKind::Local);
    }

    #[test]
    fn load_errors_on_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "not valid {{toml").unwrap();
        assert!(matches!(
            Settings::load(tmp.path()),
            Err(WalletError::Config(_))
        ));
    }

    #[test]
    fn load_rejects_unknown_provider() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "provider = \"hsm\"\n").unwrap();
        assert!(Settings::load(tmp.path()).is_err());
    }

    #[test]
    fn provider_kind_parses_aliases() {
        assert_eq!("LOCAL".parse::<ProviderKind>().unwrap(), ProviderKind::Local);
        assert_eq!(
            "local-encrypted".parse::<ProviderKind>().unwrap(),
            ProviderKind::Local
        );
        assert_eq!("privy".parse::<ProviderKind>().unwrap(), ProviderKind::Custodial);
        assert!("ledger".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn validate_flags_custodial_without_app_id() {
        let s = Settings {
            provider: ProviderKind::Custodial,
            ..Settings::default()
        };
        let report = s.validate();
        assert!(!report.is_valid());
        assert!(report.errors.iter().any(|e| e.contains("custodial_app_id")));
    }

    #[test]
    fn validate_reports_errors_and_warnings() {
        let s = Settings {
            argon2_memory_kib: 1024,
            retry_max_attempts: 0,
            custodial_api_url: "ftp://custody".into(),
            ..Settings::default()
        };
        let report = s.validate();
        assert_eq!(report.errors.len(), 3);

        let weak = Settings {
            argon2_memory_kib: MIN_MEMORY_KIB,
            custodial_api_url: "http://localhost:8080".into(),
            ..Settings::default()
        };
        let report = weak.validate();
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 2);
    }

    #[test]
    fn toml_roundtrip_of_defaults() {
        let s = Settings::default();
        let rendered = s.to_toml().unwrap();
        let parsed: Settings = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, s);
    }
}
