use clap::Parser;
use launchkey::cli::commands;
use launchkey::cli::{output, Cli, Commands, ConfigAction, Context};
use launchkey::errors::Result;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays clean for addresses and signatures.
    let default_level = match cli.verbose {
        0 => "launchkey=warn",
        1 => "launchkey=debug",
        _ => "launchkey=trace",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(cli).await {
        output::error_chain(&e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    if let Commands::Completions { shell } = cli.command {
        return commands::completions::execute(shell);
    }

    let ctx = Context::load(&cli)?;

    match cli.command {
        Commands::Create { words, force } => commands::create::execute(&ctx, words, force).await,
        Commands::Import { ref source, force } => {
            commands::import::execute(&ctx, source, force).await
        }
        Commands::Address => commands::address::execute(&ctx).await,
        Commands::Info => commands::info::execute(&ctx).await,
        Commands::ChangePassword => commands::change_password::execute(&ctx).await,
        Commands::SignMessage { ref message } => {
            commands::sign::execute_message(&ctx, message).await
        }
        Commands::SignTransaction { ref transaction } => {
            commands::sign::execute_transaction(&ctx, transaction).await
        }
        Commands::Config { ref action } => match action {
            ConfigAction::Show => commands::config_cmd::execute_show(&ctx),
            ConfigAction::Validate => commands::config_cmd::execute_validate(&ctx),
        },
        Commands::Completions { .. } => Ok(()),
    }
}
