//! `launchkey sign-message` / `launchkey sign-transaction`.
//!
//! Both print only the base58 signature on stdout.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::cli::{open_wallet, Context};
use crate::errors::{Result, WalletError};

/// Execute the `sign-message` command.
pub async fn execute_message(ctx: &Context, message: &str) -> Result<()> {
    let wallet = open_wallet(ctx).await?;
    let signature = wallet.sign_message(message.as_bytes()).await?;
    println!("{}", bs58::encode(signature).into_string());
    Ok(())
}

/// Execute the `sign-transaction` command.
pub async fn execute_transaction(ctx: &Context, transaction: &str) -> Result<()> {
    let tx_bytes = decode_transaction(transaction)?;
    let wallet = open_wallet(ctx).await?;
    let signature = wallet.sign_transaction(&tx_bytes).await?;
    println!("{}", bs58::encode(signature).into_string());
    Ok(())
}

fn decode_transaction(input: &str) -> Result<Vec<u8>> {
    let bytes = BASE64
        .decode(input.trim())
        .map_err(|e| WalletError::InvalidParameter(format!("transaction is not valid base64: {e}")))?;
    if bytes.is_empty() {
        return Err(WalletError::InvalidParameter(
            "transaction bytes cannot be empty".into(),
        ));
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_base64_transactions() {
        assert_eq!(decode_transaction(" AQID ").unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn rejects_bad_or_empty_transactions() {
        assert!(decode_transaction("not base64!").is_err());
        assert!(decode_transaction("").is_err());
    }
}
