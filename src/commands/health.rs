use owo_colors::{OwoColorize, Stream::Stdout};

use super::NetworkOptions;

pub async fn run_health(net: &NetworkOptions) -> anyhow::Result<()> {
    let client = net.client()?;
    net.with_retries(|| client.health_check())
        .await
        .map_err(|e| {
            anyhow::anyhow!(
                "Escrow service at {} is unavailable: {}",
                client.base_url(),
                e
            )
        })?;
    println!(
        "{} Escrow service at {} is up",
        "✓".if_supports_color(Stdout, |t| t.green()),
        client.base_url().if_supports_color(Stdout, |t| t.cyan())
    );
    Ok(())
}
