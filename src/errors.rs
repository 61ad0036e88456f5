use std::path::PathBuf;
use thiserror::Error;

use crate::retry::RetryError;

/// All errors that can occur in LaunchKey.
#[derive(Debug, Error)]
pub enum WalletError {
    // --- Caller errors ---
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid recovery phrase: {0}")]
    InvalidMnemonic(String),

    // --- Crypto errors ---
    #[error("Invalid password: wrong password or corrupted wallet file")]
    InvalidPassword,

    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    // --- Wallet record errors ---
    #[error("No wallet found at {0}")]
    NotFound(PathBuf),

    #[error("Wallet already exists at {0}")]
    AlreadyExists(PathBuf),

    // --- IO errors ---
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    Serialization(String),

    // --- Config errors ---
    #[error("Config error: {0}")]
    Config(String),

    // --- Custody provider errors ---
    #[error("{}", custodial_message(.status, .message))]
    Custodial { status: Option<u16>, message: String },

    // --- Retry errors ---
    #[error("Retry exhausted for '{operation}' after {attempts} attempts: {last_error}")]
    RetryExhausted {
        operation: String,
        attempts: u32,
        last_error: Box<WalletError>,
    },

    #[error("'{operation}' cancelled after {attempts} attempts (last error: {last_error})")]
    Cancelled {
        operation: String,
        attempts: u32,
        last_error: Box<WalletError>,
    },

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("User cancelled operation")]
    UserCancelled,
}

fn custodial_message(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(code) => format!("Custody API error (HTTP {code}): {message}"),
        None => format!("Custody API unreachable: {message}"),
    }
}

impl WalletError {
    /// Whether a custody API failure is worth retrying.
    ///
    /// Network failures, rate limiting and server errors are transient;
    /// everything else (bad credentials, unknown wallet) is not.
    pub fn is_transient(&self) -> bool {
        match self {
            WalletError::Custodial { status: None, .. } => true,
            WalletError::Custodial {
                status: Some(code), ..
            } => *code == 429 || (500..600).contains(code),
            _ => false,
        }
    }
}

impl From<RetryError<WalletError>> for WalletError {
    fn from(err: RetryError<WalletError>) -> Self {
        match err {
            RetryError::Fatal(inner) => inner,
            RetryError::Exhausted {
                operation,
                attempts,
                last_error,
            } => WalletError::RetryExhausted {
                operation,
                attempts,
                last_error: Box::new(last_error),
            },
            RetryError::Cancelled {
                operation,
                attempts,
                last_error,
            } => WalletError::Cancelled {
                operation,
                attempts,
                last_error: Box::new(last_error),
            },
        }
    }
}

/// Convenience type alias for LaunchKey results.
pub type Result<T> = std::result::Result<T, WalletError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custodial_transient_classification() {
        let network = WalletError::Custodial {
            status: None,
            message: "connection refused".into(),
        };
        let throttled = WalletError::Custodial {
            status: Some(429),
            message: "slow down".into(),
        };
        let server = WalletError::Custodial {
            status: Some(503),
            message: "unavailable".into(),
        };
        let unauthorized = WalletError::Custodial {
            status: Some(401),
            message: "bad credentials".into(),
        };

        assert!(network.is_transient());
        assert!(throttled.is_transient());
        assert!(server.is_transient());
        assert!(!unauthorized.is_transient());
        assert!(!WalletError::InvalidPassword.is_transient());
    }

    #[test]
    fn fatal_retry_error_unwraps_to_original() {
        let err: WalletError = RetryError::Fatal(WalletError::InvalidPassword).into();
        assert!(matches!(err, WalletError::InvalidPassword));
    }

    #[test]
    fn exhausted_retry_error_keeps_context() {
        let err: WalletError = RetryError::Exhausted {
            operation: "sign".into(),
            attempts: 3,
            last_error: WalletError::UserCancelled,
        }
        .into();

        match err {
            WalletError::RetryExhausted {
                operation,
                attempts,
                last_error,
            } => {
                assert_eq!(operation, "sign");
                assert_eq!(attempts, 3);
                assert!(matches!(*last_error, WalletError::UserCancelled));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
