//! `launchkey config show` / `launchkey config validate`.

use crate::cli::output;
use crate::cli::Context;
use crate::config::Settings;
use crate::errors::{Result, WalletError};

/// Execute `config show`.
pub fn execute_show(ctx: &Context) -> Result<()> {
    let config_path = ctx.home.join(Settings::FILE_NAME);
    if config_path.exists() {
        output::info(&format!("Loaded from {}", config_path.display()));
    } else {
        output::info(&format!(
            "No config file at {}, showing defaults",
            config_path.display()
        ));
    }
    print!("{}", ctx.settings.to_toml()?);
    Ok(())
}

/// Execute `config validate`.  Exits non-zero when any error is found.
pub fn execute_validate(ctx: &Context) -> Result<()> {
    let report = ctx.settings.validate();
    output::print_validation(&report);

    if report.is_valid() {
        Ok(())
    } else {
        Err(WalletError::Config(format!(
            "{} configuration error(s)",
            report.errors.len()
        )))
    }
}
