/// Config command: show or save the escrow URL.
use nostr_vault::config::{self, store};
use owo_colors::{OwoColorize, Stream::Stdout};

use crate::cli::ConfigCommand;

pub fn run_config(cmd: ConfigCommand, explicit_url: Option<&str>) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show => {
            let (url, source) = config::escrow_url(explicit_url)?;
            println!(
                "Escrow URL: {} ({})",
                url.if_supports_color(Stdout, |t| t.cyan()),
                source
            );
            println!("Config file: {}", store::escrow_url_path()?.display());
        }
        ConfigCommand::SetUrl { url } => {
            let url = url.trim().trim_end_matches('/');
            config::validate_escrow_url(url)?;
            store::ensure_config_dir()?;
            let path = store::escrow_url_path()?;
            store::write_escrow_url(url, &path)?;
            println!(
                "{} Escrow URL set to {}",
                "✓".if_supports_color(Stdout, |t| t.green()),
                url.if_supports_color(Stdout, |t| t.cyan())
            );
            println!("  Saved to {}", path.display());
        }
    }
    Ok(())
}
