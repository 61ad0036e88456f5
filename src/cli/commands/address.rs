//! `launchkey address`: print the wallet address.

use crate::cli::{open_wallet, Context};
use crate::errors::Result;

/// Execute the `address` command.
///
/// Prints only the address so the output can be captured by scripts.
pub async fn execute(ctx: &Context) -> Result<()> {
    let wallet = open_wallet(ctx).await?;
    println!("{}", wallet.address());
    Ok(())
}
