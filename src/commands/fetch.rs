/// Fetch command: retrieve an envelope from the escrow service and open it.
///
/// With `--expect`, the recovered secret is only compared against the given
/// value and never printed, which makes the command usable as a backup check.
use nostr_vault::domain::{Nip05Id, Pin};
use nostr_vault::envelope;
use nostr_vault::error::{EnvelopeError, EscrowError};
use owo_colors::{OwoColorize, Stream::Stderr, Stream::Stdout};

use crate::cli::FetchArgs;

use super::NetworkOptions;

/// Compare without short-circuiting on the first differing byte.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

pub async fn run_fetch(args: FetchArgs, net: &NetworkOptions) -> anyhow::Result<()> {
    // ── 1. Validate inputs ──────────────────────────────────────────────
    let nip_05_id = Nip05Id::parse(&args.lookup.nip_05_id)?;
    let pin = Pin::parse(args.lookup.pin)?;
    let client = net.client()?;

    // ── 2. Retrieve ─────────────────────────────────────────────────────
    let stored = match net
        .with_retries(|| client.fetch_key(&nip_05_id, pin))
        .await
    {
        Ok(stored) => stored,
        Err(EscrowError::NotFound) => {
            eprintln!(
                "{} No key stored for {}.",
                "Error:".if_supports_color(Stderr, |t| t.red()),
                nip_05_id
            );
            return Err(EscrowError::NotFound.into());
        }
        Err(EscrowError::InvalidPin) => {
            eprintln!(
                "{} The service rejected this PIN.",
                "Error:".if_supports_color(Stderr, |t| t.red())
            );
            return Err(EscrowError::InvalidPin.into());
        }
        Err(e) => return Err(anyhow::anyhow!("Failed to fetch key: {}", e)),
    };

    if args.raw {
        println!("{}", stored.private_key_hash.trim());
        return Ok(());
    }

    // ── 3. Open ─────────────────────────────────────────────────────────
    let sealed = stored.envelope()?;
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

    // ── 4. Verify or emit ───────────────────────────────────────────────
    if let Some(expected) = args.expect {
        if constant_time_eq(secret.as_bytes(), expected.trim().as_bytes()) {
            println!(
                "{} Stored key for {} matches.",
                "✓".if_supports_color(Stdout, |t| t.green()),
                nip_05_id
            );
            return Ok(());
        }
        println!(
            "{} Stored key for {} does not match.",
            "✗".if_supports_color(Stdout, |t| t.red()),
            nip_05_id
        );
        anyhow::bail!("Recovered key does not match the expected value");
    }

    super::emit_secret(&secret, args.copy);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"nsec1abc", b"nsec1abc"));
        assert!(!constant_time_eq(b"nsec1abc", b"nsec1abd"));
        assert!(!constant_time_eq(b"nsec1abc", b"nsec1ab"));
        assert!(constant_time_eq(b"", b""));
    }
}
