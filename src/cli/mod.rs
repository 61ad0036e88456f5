//! CLI module: Clap argument parser, prompts, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::Parser;
use zeroize::Zeroizing;

use crate::config::{default_home, ProviderKind, Settings};
use crate::errors::{Result, WalletError};
use crate::provider::{self, Wallet, WalletAccess};
use crate::wallet::{SecretPayload, SecretStore};

/// Minimum password length to prevent trivially weak passwords.
const MIN_PASSWORD_LEN: usize = 8;

/// How many times an interactive user may mistype the wallet password.
pub const MAX_PASSWORD_ATTEMPTS: u32 = 3;

/// Wallet password for unattended use.
pub const PASSWORD_ENV: &str = "LAUNCHKEY_WALLET_PASSWORD";

/// New wallet password for unattended `change-password`.
pub const NEW_PASSWORD_ENV: &str = "LAUNCHKEY_NEW_WALLET_PASSWORD";

/// Custody API app secret.
pub const APP_SECRET_ENV: &str = "LAUNCHKEY_CUSTODIAL_APP_SECRET";

/// Secret input for `import` (phrase, key or array) for unattended use.
pub const IMPORT_SECRET_ENV: &str = "LAUNCHKEY_IMPORT_SECRET";

/// LaunchKey CLI: encrypted agent wallet manager.
#[derive(Parser)]
#[command(
    name = "launchkey",
    about = "Encrypted wallet manager for launchpad trading agents",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// LaunchKey home directory (default: ~/.launchkey)
    #[arg(long, env = "LAUNCHKEY_HOME", global = true)]
    pub home: Option<PathBuf>,

    /// Override the configured wallet provider (local or custodial)
    #[arg(long, global = true)]
    pub provider: Option<ProviderKind>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Create a new wallet with a fresh recovery phrase
    Create {
        /// Recovery phrase length: 12 or 24 words
        #[arg(short, long, default_value_t = 24)]
        words: usize,

        /// Replace an existing wallet file
        #[arg(long)]
        force: bool,
    },

    /// Import an existing wallet
    Import {
        #[command(subcommand)]
        source: ImportSource,

        /// Replace an existing wallet file
        #[arg(long, global = true)]
        force: bool,
    },

    /// Print the wallet address
    Address,

    /// Show provider, address and storage location
    Info,

    /// Re-encrypt the local wallet under a new password
    ChangePassword,

    /// Sign a UTF-8 message and print the base58 signature
    SignMessage {
        /// Message text
        message: String,
    },

    /// Sign base64-encoded transaction message bytes and print the base58 signature
    SignTransaction {
        /// Serialized transaction message, base64
        transaction: String,
    },

    /// Inspect the configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Where an imported key comes from.
#[derive(clap::Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ImportSource {
    /// BIP-39 recovery phrase (prompted)
    Mnemonic,

    /// Base58 private key (prompted)
    PrivateKey,

    /// JSON byte array such as `[12, 34, ...]` (prompted)
    SecretKeyArray,

    /// Keypair file containing a JSON byte array
    KeypairFile {
        /// Path to the keypair file
        path: PathBuf,
    },
}

/// Config subcommands.
#[derive(clap::Subcommand)]
pub enum ConfigAction {
    /// Print the effective settings as TOML
    Show,

    /// Check the settings for errors and warnings
    Validate,
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Resolved home directory plus the settings loaded from it.
pub struct Context {
    pub home: PathBuf,
    pub settings: Settings,
}

impl Context {
    /// Resolve `--home`, load `config.toml`, and apply `--provider`.
    pub fn load(cli: &Cli) -> Result<Self> {
        let home = match &cli.home {
            Some(home) => home.clone(),
            None => default_home()?,
        };
        let mut settings = Settings::load(&home)?;
        if let Some(provider) = cli.provider {
            settings.provider = provider;
        }
        Ok(Self { home, settings })
    }

    pub fn store(&self) -> SecretStore {
        SecretStore::from_settings(&self.settings, &self.home)
    }
}

fn env_secret(name: &str) -> Option<Zeroizing<String>> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Some(Zeroizing::new(value)),
        _ => None,
    }
}

/// Whether the wallet password comes from the environment.
pub fn password_from_env() -> bool {
    env_secret(PASSWORD_ENV).is_some()
}

/// Get the wallet password, trying in order:
/// 1. `LAUNCHKEY_WALLET_PASSWORD` env var (CI/CD)
/// 2. Interactive prompt
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_password() -> Result<Zeroizing<String>> {
    if let Some(pw) = env_secret(PASSWORD_ENV) {
        return Ok(pw);
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Enter wallet password")
        .interact()
        .map_err(|e| WalletError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new password with confirmation.
///
/// `env_var` is checked first for scripted/CI usage.
/// Enforces a minimum password length.
pub fn prompt_new_password(env_var: &str) -> Result<Zeroizing<String>> {
    if let Some(pw) = env_secret(env_var) {
        check_password_strength(&pw)?;
        return Ok(pw);
    }

    loop {
        let password = Zeroizing::new(
            dialoguer::Password::new()
                .with_prompt("Choose wallet password")
                .with_confirmation(
                    "Confirm wallet password",
                    "Passwords do not match, try again",
                )
                .interact()
                .map_err(|e| WalletError::CommandFailed(format!("password prompt: {e}")))?,
        );

        if let Err(e) = check_password_strength(&password) {
            output::warning(&format!("{e}. Try again."));
            continue;
        }

        return Ok(password);
    }
}

fn check_password_strength(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(WalletError::InvalidParameter(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// Read a secret import input from `LAUNCHKEY_IMPORT_SECRET` or a hidden prompt.
pub fn prompt_secret_input(prompt: &str) -> Result<Zeroizing<String>> {
    if let Some(secret) = env_secret(IMPORT_SECRET_ENV) {
        return Ok(secret);
    }

    let input = dialoguer::Password::new()
        .with_prompt(prompt)
        .interact()
        .map_err(|e| WalletError::CommandFailed(format!("input prompt: {e}")))?;
    Ok(Zeroizing::new(input))
}

/// Get the custody app secret from `LAUNCHKEY_CUSTODIAL_APP_SECRET` or a prompt.
pub fn prompt_app_secret() -> Result<Zeroizing<String>> {
    if let Some(secret) = env_secret(APP_SECRET_ENV) {
        return Ok(secret);
    }

    let secret = dialoguer::Password::new()
        .with_prompt("Enter custody app secret")
        .interact()
        .map_err(|e| WalletError::CommandFailed(format!("app secret prompt: {e}")))?;
    Ok(Zeroizing::new(secret))
}

/// Run `attempt` with a password, re-prompting on `InvalidPassword`.
///
/// Passwords from the environment get exactly one try.
pub async fn with_password_retries<T, F, Fut>(mut attempt: F) -> Result<T>
where
    F: FnMut(Zeroizing<String>) -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let interactive = !password_from_env();
    let mut tries = 1;
    loop {
        let password = prompt_password()?;
        match attempt(password).await {
            Err(WalletError::InvalidPassword) if interactive && tries < MAX_PASSWORD_ATTEMPTS => {
                output::warning(&format!(
                    "Wrong password ({tries}/{MAX_PASSWORD_ATTEMPTS}), try again."
                ));
                tries += 1;
            }
            other => return other,
        }
    }
}

/// Unlock the local wallet file, re-prompting on a wrong password.
///
/// Returns the payload and the password that unlocked it.
pub async fn unlock_local(store: &SecretStore) -> Result<(SecretPayload, Zeroizing<String>)> {
    if !store.exists() {
        return Err(WalletError::NotFound(store.path().to_path_buf()));
    }

    with_password_retries(|password| {
        let store = store.clone();
        async move {
            tokio::task::spawn_blocking(move || {
                let payload = store.load(&password)?;
                Ok((payload, password))
            })
            .await
            .map_err(|e| WalletError::CommandFailed(format!("wallet unlock task failed: {e}")))?
        }
    })
    .await
}

/// Open the configured wallet, prompting for whatever secret it needs.
pub async fn open_wallet(ctx: &Context) -> Result<Wallet> {
    match ctx.settings.provider {
        ProviderKind::Custodial => {
            let secret = prompt_app_secret()?;
            let access = WalletAccess::with_app_secret(secret.as_str());
            provider::open_wallet(&ctx.settings, &ctx.home, &access).await
        }
        ProviderKind::Local => {
            let store = ctx.store();
            if !store.exists() {
                output::tip("Run `launchkey create` or `launchkey import` first.");
                return Err(WalletError::NotFound(store.path().to_path_buf()));
            }
            with_password_retries(|password| async move {
                let access = WalletAccess::with_password(password.as_str());
                provider::open_wallet(&ctx.settings, &ctx.home, &access).await
            })
            .await
        }
    }
}

/// Fail early when a command only makes sense for the local provider.
pub fn require_local(ctx: &Context, command: &str) -> Result<()> {
    if ctx.settings.provider != ProviderKind::Local {
        return Err(WalletError::CommandFailed(format!(
            "`{command}` is only available for the local provider (current: {})",
            ctx.settings.provider
        )));
    }
    Ok(())
}
