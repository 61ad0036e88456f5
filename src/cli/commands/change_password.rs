//! `launchkey change-password`: re-encrypt the local wallet under a new password.
//!
//! Unlocks with the current password, then writes a fresh record (new
//! salt, new IV) atomically over the old one.  The recovery phrase and
//! creation time are kept.

use crate::cli::output;
use crate::cli::{prompt_new_password, require_local, unlock_local, Context, NEW_PASSWORD_ENV};
use crate::errors::{Result, WalletError};

/// Execute the `change-password` command.
pub async fn execute(ctx: &Context) -> Result<()> {
    require_local(ctx, "change-password")?;
    let store = ctx.store();

    // 1. Verify the current password.
    output::info("Enter your current wallet password.");
    let (payload, old_password) = unlock_local(&store).await?;
    let address = payload.address().to_string();
    drop(payload);

    // 2. Prompt for the new password.
    output::info("Choose your new wallet password.");
    let new_password = prompt_new_password(NEW_PASSWORD_ENV)?;
    if new_password.as_str() == old_password.as_str() {
        return Err(WalletError::InvalidParameter(
            "new password must differ from the current one".into(),
        ));
    }

    // 3. Re-encrypt and save atomically.
    tokio::task::spawn_blocking(move || store.change_password(&old_password, &new_password))
        .await
        .map_err(|e| WalletError::CommandFailed(format!("change-password task failed: {e}")))??;

    output::success(&format!("Password changed for wallet {address}"));
    Ok(())
}
