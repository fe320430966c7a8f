use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "nostr-vault",
    version,
    about = "Store a password-encrypted Nostr private key with a key-escrow service"
)]
pub struct Cli {
    /// Base URL of the key-escrow service (overrides the saved config)
    #[arg(long, global = true, env = "NOSTR_VAULT_URL", value_name = "URL")]
    pub escrow_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, global = true, default_value = "30", value_name = "SECS")]
    pub timeout: u64,

    /// Retries for transient network failures (0 disables retrying)
    #[arg(long, global = true, default_value = "2", value_name = "N")]
    pub retries: usize,

    /// Enable debug logging on stderr (RUST_LOG takes precedence)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Encrypt a secret key into an envelope and print it
    Encrypt(EncryptArgs),
    /// Decrypt an envelope and print the secret key
    Decrypt(DecryptArgs),
    /// Encrypt a secret key and store the envelope with the escrow service
    Upload(UploadArgs),
    /// Fetch an envelope from the escrow service and decrypt it
    Fetch(FetchArgs),
    /// Check that the escrow service is reachable
    Health,
    /// Show or change the saved escrow URL
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Options shared by every command that creates an envelope.
#[derive(Args)]
pub struct SealArgs {
    /// PBKDF2 iteration count recorded in the envelope
    #[arg(long, default_value = "100000", value_name = "N")]
    pub iterations: u32,

    /// Read the secret key from stdin instead of prompting
    #[arg(long)]
    pub secret_stdin: bool,

    /// Password (prompted if omitted)
    #[arg(long, env = "NOSTR_VAULT_PASSWORD", hide_env_values = true, value_name = "PASSWORD")]
    pub password: Option<String>,
}

#[derive(Args)]
pub struct EncryptArgs {
    #[command(flatten)]
    pub seal: SealArgs,

    /// Render the envelope as a QR code for a paper backup
    #[arg(long)]
    pub qr: bool,
}

#[derive(Args)]
pub struct DecryptArgs {
    /// Envelope text, or - to read it from stdin
    #[arg(value_name = "ENVELOPE")]
    pub envelope: String,

    /// Password (prompted if omitted)
    #[arg(long, env = "NOSTR_VAULT_PASSWORD", hide_env_values = true, value_name = "PASSWORD")]
    pub password: Option<String>,

    /// Copy the secret to the clipboard instead of printing it
    #[arg(long)]
    pub copy: bool,
}

#[derive(Args)]
pub struct LookupArgs {
    /// NIP-05 identifier the key is stored under (name@domain)
    #[arg(long = "id", value_name = "NIP05")]
    pub nip_05_id: String,

    /// Six-digit escrow PIN
    #[arg(long, value_name = "PIN")]
    pub pin: u64,
}

#[derive(Args)]
pub struct UploadArgs {
    #[command(flatten)]
    pub lookup: LookupArgs,

    #[command(flatten)]
    pub seal: SealArgs,
}

#[derive(Args)]
pub struct FetchArgs {
    #[command(flatten)]
    pub lookup: LookupArgs,

    /// Password (prompted if omitted)
    #[arg(long, env = "NOSTR_VAULT_PASSWORD", hide_env_values = true, value_name = "PASSWORD")]
    pub password: Option<String>,

    /// Print the stored envelope without decrypting it
    #[arg(long, conflicts_with_all = ["expect", "copy"])]
    pub raw: bool,

    /// Compare the decrypted secret with this value and report whether it matches
    #[arg(long, value_name = "SECRET")]
    pub expect: Option<String>,

    /// Copy the secret to the clipboard instead of printing it
    #[arg(long)]
    pub copy: bool,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print the escrow URL in effect and where it came from
    Show,
    /// Save the escrow URL to ~/.nostr-vault/escrow_url
    SetUrl {
        #[arg(value_name = "URL")]
        url: String,
    },
}
