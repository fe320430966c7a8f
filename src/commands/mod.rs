//! Command flows and the prompting/retry plumbing they share.

pub mod config;
pub mod decrypt;
pub mod encrypt;
pub mod fetch;
pub mod health;
pub mod upload;

use std::future::Future;
use std::io::{IsTerminal, Read};
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use nostr_vault::crypto::DEFAULT_ITERATIONS;
use nostr_vault::error::{EscrowError, VaultError};
use nostr_vault::transport::EscrowClient;
use owo_colors::{OwoColorize, Stream::Stderr};
use tracing::warn;
use zeroize::Zeroizing;

use crate::cli::Cli;

/// Network settings taken from the global CLI flags.
pub struct NetworkOptions {
    pub escrow_url: Option<String>,
    pub timeout: Duration,
    pub retries: usize,
}

impl From<&Cli> for NetworkOptions {
    fn from(cli: &Cli) -> Self {
        Self {
            escrow_url: cli.escrow_url.clone(),
            timeout: Duration::from_secs(cli.timeout),
            retries: cli.retries,
        }
    }
}

impl NetworkOptions {
    pub fn client(&self) -> anyhow::Result<EscrowClient> {
        let (url, source) = nostr_vault::config::escrow_url(self.escrow_url.as_deref())?;
        nostr_vault::config::validate_escrow_url(&url)?;
        tracing::debug!(%url, %source, "using escrow service");
        Ok(EscrowClient::new(&url, self.timeout)?)
    }

    /// Run `op`, retrying transient failures with exponential backoff.
    pub async fn with_retries<T, F, Fut>(&self, op: F) -> Result<T, EscrowError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, EscrowError>>,
    {
        self.retry_when(op, EscrowError::is_transient).await
    }

    /// Run `op`, retrying only the failures `retryable` accepts.
    ///
    /// Writes use [`EscrowError::is_connect_failure`]: a request that timed
    /// out may already have been stored.
    pub async fn retry_when<T, F, Fut>(
        &self,
        op: F,
        retryable: fn(&EscrowError) -> bool,
    ) -> Result<T, EscrowError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, EscrowError>>,
    {
        let backoff = ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(500))
            .with_max_delay(Duration::from_secs(8))
            .with_max_times(self.retries);
        op.retry(backoff)
            .when(retryable)
            .notify(|err: &EscrowError, delay: Duration| {
                warn!(error = %err, ?delay, "escrow request failed, retrying");
            })
            .await
    }
}

/// Use `provided` or prompt for a password, asking twice when `confirm` is set.
pub fn read_password(
    provided: Option<String>,
    confirm: bool,
) -> anyhow::Result<Zeroizing<String>> {
    if let Some(password) = provided {
        return Ok(Zeroizing::new(password));
    }
    if !std::io::stdin().is_terminal() {
        return Err(
            VaultError::NotInteractive("Password entry (or set NOSTR_VAULT_PASSWORD)").into(),
        );
    }
    let mut prompt = dialoguer::Password::new().with_prompt("Password");
    if confirm {
        prompt = prompt.with_confirmation("Confirm password", "Passwords don't match");
    }
    let password = prompt
        .interact()
        .map_err(|e| anyhow::anyhow!("Password prompt failed: {}", e))?;
    Ok(Zeroizing::new(password))
}

/// Read the secret key from stdin or a hidden prompt.
///
/// Trailing line endings from stdin are dropped; anything else is kept as
/// typed, since the secret is opaque.
pub fn read_secret(from_stdin: bool) -> anyhow::Result<Zeroizing<String>> {
    let secret = if from_stdin {
        let mut buf = Zeroizing::new(String::new());
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| anyhow::anyhow!("Failed to read secret from stdin: {}", e))?;
        Zeroizing::new(buf.trim_end_matches(['\r', '\n']).to_string())
    } else {
        if !std::io::stdin().is_terminal() {
            return Err(
                VaultError::NotInteractive("Secret key entry (or use --secret-stdin)").into(),
            );
        }
        Zeroizing::new(
            dialoguer::Password::new()
                .with_prompt("Secret key")
                .interact()
                .map_err(|e| anyhow::anyhow!("Secret prompt failed: {}", e))?,
        )
    };
    if secret.is_empty() {
        anyhow::bail!("No secret key provided");
    }
    Ok(secret)
}

/// Reject iteration counts below the default; opening old weak envelopes
/// still works, creating new ones does not.
pub fn check_iterations(iterations: u32) -> Result<(), VaultError> {
    if iterations < DEFAULT_ITERATIONS {
        return Err(VaultError::IterationsTooLow(iterations, DEFAULT_ITERATIONS));
    }
    Ok(())
}

pub fn try_copy_to_clipboard(text: &str) -> bool {
    match arboard::Clipboard::new() {
        Ok(mut clipboard) => clipboard.set_text(text).is_ok(),
        Err(_) => false,
    }
}

/// Print a recovered secret, or put it on the clipboard when `copy` is set.
/// Falls back to printing if no clipboard is available.
pub fn emit_secret(secret: &str, copy: bool) {
    if copy {
        if try_copy_to_clipboard(secret) {
            eprintln!(
                "{}",
                "Secret key copied to clipboard.".if_supports_color(Stderr, |t| t.green())
            );
            return;
        }
        eprintln!(
            "{}",
            "(Clipboard unavailable, printing instead)"
                .if_supports_color(Stderr, |t| t.yellow())
        );
    }
    println!("{}", secret);
}
