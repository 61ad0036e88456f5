//! `launchkey import`: restore a wallet from a phrase, a key, or a keypair file.

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{
    password_from_env, prompt_new_password, prompt_secret_input, require_local, Context,
    ImportSource, NEW_PASSWORD_ENV, PASSWORD_ENV,
};
use crate::errors::{Result, WalletError};
use crate::wallet::RawKeyFormat;

/// What the store should receive once the input has been read.
enum Input {
    Phrase(Zeroizing<String>),
    RawKey(Zeroizing<Vec<u8>>),
}

/// Execute the `import` command.
pub async fn execute(ctx: &Context, source: &ImportSource, force: bool) -> Result<()> {
    require_local(ctx, "import")?;
    let store = ctx.store().allow_overwrite(force);

    if store.exists() && !force {
        output::tip("Pass --force to replace it (the old wallet is lost unless backed up).");
        return Err(WalletError::AlreadyExists(store.path().to_path_buf()));
    }

    // 1. Read and decode the secret before asking for a password so
    //    typos are reported straight away.
    let input = read_input(source)?;

    // 2. Choose the password that will protect the imported key.
    let env_var = if password_from_env() {
        PASSWORD_ENV
    } else {
        NEW_PASSWORD_ENV
    };
    let password = prompt_new_password(env_var)?;

    // 3. Encrypt and write off the async runtime.
    let address = tokio::task::spawn_blocking(move || match input {
        Input::Phrase(phrase) => store.import_from_mnemonic(&phrase, &password),
        Input::RawKey(bytes) => store.import_from_raw_key(&bytes, &password),
    })
    .await
    .map_err(|e| WalletError::CommandFailed(format!("import task failed: {e}")))??;

    output::success(&format!("Wallet imported: {address}"));
    Ok(())
}

fn read_input(source: &ImportSource) -> Result<Input> {
    match source {
        ImportSource::Mnemonic => {
            let phrase = prompt_secret_input("Enter recovery phrase")?;
            // Validate now; the store re-validates when it derives the key.
            crate::wallet::mnemonic::parse(&phrase)?;
            Ok(Input::Phrase(phrase))
        }
        ImportSource::PrivateKey => {
            let key = prompt_secret_input("Enter base58 private key")?;
            Ok(Input::RawKey(RawKeyFormat::Base58.decode(&key)?))
        }
        ImportSource::SecretKeyArray => {
            let array = prompt_secret_input("Enter secret key array")?;
            Ok(Input::RawKey(RawKeyFormat::JsonArray.decode(&array)?))
        }
        ImportSource::KeypairFile { path } => {
            let bytes = crate::wallet::import::read_keypair_file(path)?;
            Ok(Input::RawKey(bytes))
        }
    }
}
