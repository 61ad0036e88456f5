//! `launchkey create`: generate a new wallet and show its recovery phrase once.

use crate::cli::output;
use crate::cli::{
    password_from_env, prompt_new_password, require_local, Context, NEW_PASSWORD_ENV, PASSWORD_ENV,
};
use crate::errors::{Result, WalletError};

/// Execute the `create` command.
pub async fn execute(ctx: &Context, words: usize, force: bool) -> Result<()> {
    require_local(ctx, "create")?;
    let store = ctx.store().allow_overwrite(force);

    // 1. Fail before prompting if we'd refuse to write anyway.
    if store.exists() && !force {
        output::tip("Pass --force to replace it (the old wallet is lost unless backed up).");
        return Err(WalletError::AlreadyExists(store.path().to_path_buf()));
    }
    if words != 12 && words != 24 {
        return Err(WalletError::InvalidParameter(format!(
            "word count must be 12 or 24 (got {words})"
        )));
    }

    // 2. Choose a password.  A pre-set wallet password counts as the new one.
    let env_var = if password_from_env() {
        PASSWORD_ENV
    } else {
        NEW_PASSWORD_ENV
    };
    let password = prompt_new_password(env_var)?;

    // 3. Derive and encrypt off the async runtime.
    let created = tokio::task::spawn_blocking(move || store.create(&password, words))
        .await
        .map_err(|e| WalletError::CommandFailed(format!("create task failed: {e}")))??;

    output::success(&format!("Wallet created: {}", created.address));
    output::warning("Write down your recovery phrase. It will NOT be shown again.");
    output::print_mnemonic(&created.mnemonic);
    output::tip("Anyone with this phrase controls the wallet. Store it offline.");

    Ok(())
}
