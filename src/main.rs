mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "nostr_vault=debug" } else { "warn" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .try_init();

    let net = commands::NetworkOptions::from(&cli);

    match cli.command {
        Commands::Encrypt(args) => commands::encrypt::run_encrypt(args).await?,
        Commands::Decrypt(args) => commands::decrypt::run_decrypt(args).await?,
        Commands::Upload(args) => commands::upload::run_upload(args, &net).await?,
        Commands::Fetch(args) => commands::fetch::run_fetch(args, &net).await?,
        Commands::Health => commands::health::run_health(&net).await?,
        Commands::Config(cmd) => commands::config::run_config(cmd, net.escrow_url.as_deref())?,
    }

    Ok(())
}
