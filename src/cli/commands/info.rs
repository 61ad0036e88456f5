//! `launchkey info`: show provider, address and where the wallet lives.

use crate::cli::output;
use crate::cli::{open_wallet, Context};
use crate::errors::Result;

/// Execute the `info` command.
pub async fn execute(ctx: &Context) -> Result<()> {
    let wallet = open_wallet(ctx).await?;
    output::print_wallet_info(&wallet.info());
    Ok(())
}
