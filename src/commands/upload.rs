/// Upload command: seal a secret key and store the envelope with the escrow
/// service under a NIP-05 identifier and PIN.
///
/// The secret never leaves this process unencrypted; only the envelope text
/// is sent.
use nostr_vault::domain::{Nip05Id, Pin};
use nostr_vault::envelope::{self, EncodeOptions};
use nostr_vault::error::EscrowError;
use owo_colors::{OwoColorize, Stream::Stdout};

use crate::cli::UploadArgs;

use super::NetworkOptions;

pub async fn run_upload(args: UploadArgs, net: &NetworkOptions) -> anyhow::Result<()> {
    // ── 1. Validate inputs before prompting ─────────────────────────────
    let nip_05_id = Nip05Id::parse(&args.lookup.nip_05_id)?;
    let pin = Pin::parse(args.lookup.pin)?;
    super::check_iterations(args.seal.iterations)?;
    let client = net.client()?;

    // ── 2. Seal ─────────────────────────────────────────────────────────
    let secret = super::read_secret(args.seal.secret_stdin)?;
    let password = super::read_password(args.seal.password, true)?;
    let options = EncodeOptions {
        iterations: args.seal.iterations,
        ..EncodeOptions::default()
    };
    let sealed = envelope::encode_async(secret, password, options).await?;

    // ── 3. Store ────────────────────────────────────────────────────────
    // Only resend when the first attempt never connected; a timed-out
    // upload may already be stored.
    let stored = net
        .retry_when(
            || client.upload_key(&nip_05_id, pin, &sealed),
            EscrowError::is_connect_failure,
        )
        .await
        .map_err(|e| anyhow::anyhow!("Failed to upload key: {}", e))?;

    println!(
        "{} Stored encrypted key for {}",
        "✓".if_supports_color(Stdout, |t| t.green()),
        nip_05_id.if_supports_color(Stdout, |t| t.cyan())
    );
    if !stored.created_at.is_empty() {
        println!("  Created: {}", stored.created_at);
    }
    println!("  Service: {}", client.base_url());
    println!(
        "{}",
        "Keep your PIN and password: the service cannot recover either."
            .if_supports_color(Stdout, |t| t.yellow())
    );

    Ok(())
}
