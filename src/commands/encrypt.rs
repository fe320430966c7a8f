/// Encrypt command: seal a secret key locally and print the envelope.
use nostr_vault::envelope::{self, EncodeOptions};
use owo_colors::{OwoColorize, Stream::Stderr};

use crate::cli::EncryptArgs;

pub async fn run_encrypt(args: EncryptArgs) -> anyhow::Result<()> {
    super::check_iterations(args.seal.iterations)?;

    let secret = super::read_secret(args.seal.secret_stdin)?;
    let password = super::read_password(args.seal.password, true)?;

    let options = EncodeOptions {
        iterations: args.seal.iterations,
        ..EncodeOptions::default()
    };
    let sealed = envelope::encode_async(secret, password, options).await?;
    let text = sealed.to_string();

    println!("{}", text);

    if args.qr {
        eprintln!();
        qr2term::print_qr(&text).map_err(|e| anyhow::anyhow!("QR render failed: {}", e))?;
        eprintln!(
            "{}",
            "Anyone with this code and your password can recover the key."
                .if_supports_color(Stderr, |t| t.yellow())
        );
    }

    Ok(())
}
