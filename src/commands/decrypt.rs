/// Decrypt command: open an envelope given on the command line or stdin.
use std::io::Read;

use nostr_vault::envelope::{self, Envelope};
use nostr_vault::error::EnvelopeError;
use owo_colors::{OwoColorize, Stream::Stderr};

use crate::cli::DecryptArgs;

fn read_envelope_arg(arg: &str) -> anyhow::Result<String> {
    if arg != "-" {
        return Ok(arg.trim().to_string());
    }
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .map_err(|e| anyhow::anyhow!("Failed to read envelope from stdin: {}", e))?;
    Ok(buf.trim().to_string())
}

pub async fn run_decrypt(args: DecryptArgs) -> anyhow::Result<()> {
    // Parse before prompting so a typo fails without asking for a password.
    let text = read_envelope_arg(&args.envelope)?;
    let sealed: Envelope = text.parse()?;

    let password = super::read_password(args.password, false)?;
    let secret = match envelope::decode_async(sealed, password).await {
        Ok(secret) => secret,
        Err(err @ EnvelopeError::Authentication) => {
            eprintln!(
                "{} Wrong password or corrupted envelope.",
                "Error:".if_supports_color(Stderr, |t| t.red())
            );
            return Err(err.into());
        }
        Err(e) => return Err(e.into()),
    };

    super::emit_secret(&secret, args.copy);
    Ok(())
}
