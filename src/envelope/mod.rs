//! Envelope module: password-sealed, self-describing text container for a secret key.
//!
//! Sealing derives a key with PBKDF2-HMAC-SHA256 from the password and a fresh
//! 32-byte salt, encrypts the secret with AES-GCM under a fresh 12-byte nonce,
//! and records everything needed to reverse the process except the password:
//!
//! ```text
//! $PBKDF2$i=100000,l=256,s=<salt-b64>$AESGM$<nonce-b64>$<ciphertext+tag-b64>
//! ```
//!
//! `AESGM` is the AEAD tag the browser client writes; envelopes already held
//! by the escrow service carry it.
//!
//! The PBKDF2 hash is not recorded; it is always SHA-256. See `crate::crypto`.

mod grammar;

use std::str::FromStr;

use zeroize::Zeroizing;

use crate::crypto::{self, KeyBits, DEFAULT_ITERATIONS, MAX_ITERATIONS, NONCE_LEN, SALT_LEN};
use crate::error::EnvelopeError;

/// KDF family name written into every envelope.
pub const KDF_NAME: &str = "PBKDF2";

/// AEAD name written into every envelope.
pub const AEAD_NAME: &str = "AESGM";

/// Key-derivation parameters carried by an envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KdfParams {
    iterations: u32,
    key_bits: KeyBits,
    salt: [u8; SALT_LEN],
}

impl KdfParams {
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn key_bits(&self) -> KeyBits {
        self.key_bits
    }

    pub fn salt(&self) -> &[u8; SALT_LEN] {
        &self.salt
    }
}

/// A parsed key envelope.
///
/// Built only by [`encode_with`] or by parsing, so the parameters are always
/// within the ranges the decoder accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    kdf: KdfParams,
    nonce: [u8; NONCE_LEN],
    ciphertext: Vec<u8>,
}

impl Envelope {
    pub fn kdf(&self) -> &KdfParams {
        &self.kdf
    }

    pub fn nonce(&self) -> &[u8; NONCE_LEN] {
        &self.nonce
    }

    /// AES-GCM ciphertext with the 16-byte tag appended.
    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    /// Re-derive the key from `password` and decrypt the secret.
    ///
    /// A wrong password and a tampered envelope both surface as
    /// [`EnvelopeError::Authentication`].
    pub fn open(&self, password: &str) -> Result<Zeroizing<String>, EnvelopeError> {
        let key = crypto::derive_key(
            password,
            &self.kdf.salt,
            self.kdf.iterations,
            self.kdf.key_bits,
        );
        let plaintext = Zeroizing::new(
            crypto::aead_open(&key, &self.nonce, &self.ciphertext)
                .ok_or(EnvelopeError::Authentication)?,
        );
        let text = std::str::from_utf8(&plaintext).map_err(|_| EnvelopeError::Decoding)?;
        Ok(Zeroizing::new(text.to_owned()))
    }
}

impl FromStr for Envelope {
    type Err = EnvelopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        grammar::parse(s)
    }
}

/// Tunables for sealing. The defaults are what the browser client used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    pub iterations: u32,
    /// Derived key length in bits: 128 or 256.
    pub key_bits: u32,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            key_bits: 256,
        }
    }
}

/// Seal `secret` under `password` with the default parameters.
pub fn encode(secret: &str, password: &str) -> Result<Envelope, EnvelopeError> {
    encode_with(secret, password, &EncodeOptions::default())
}

/// Seal `secret` under `password`.
///
/// Every call draws a new salt and nonce, so sealing the same inputs twice
/// yields two different envelopes that both open to the same secret.
pub fn encode_with(
    secret: &str,
    password: &str,
    options: &EncodeOptions,
) -> Result<Envelope, EnvelopeError> {
    if secret.is_empty() {
        return Err(EnvelopeError::Encryption("secret is empty".to_string()));
    }
    if options.iterations == 0 || options.iterations > MAX_ITERATIONS {
        return Err(EnvelopeError::Encryption(format!(
            "iteration count {} is outside 1..={}",
            options.iterations, MAX_ITERATIONS
        )));
    }
    let key_bits = KeyBits::from_bits(options.key_bits).ok_or_else(|| {
        EnvelopeError::Encryption(format!(
            "unsupported AES-GCM key length: {} bits",
            options.key_bits
        ))
    })?;

    let salt = crypto::random_salt();
    let key = crypto::derive_key(password, &salt, options.iterations, key_bits);
    let nonce = crypto::random_nonce();
    let ciphertext = crypto::aead_seal(&key, &nonce, secret.as_bytes())
        .map_err(|e| EnvelopeError::Encryption(e.to_string()))?;

    Ok(Envelope {
        kdf: KdfParams {
            iterations: options.iterations,
            key_bits,
            salt,
        },
        nonce,
        ciphertext,
    })
}

/// Parse `envelope` and open it with `password`.
pub fn decode(envelope: &str, password: &str) -> Result<Zeroizing<String>, EnvelopeError> {
    envelope.parse::<Envelope>()?.open(password)
}

/// [`encode_with`] on the blocking pool, for use from async code.
///
/// Dropping the returned future abandons the result; nothing is written
/// anywhere until the envelope is returned.
pub async fn encode_async(
    secret: Zeroizing<String>,
    password: Zeroizing<String>,
    options: EncodeOptions,
) -> Result<Envelope, EnvelopeError> {
    tokio::task::spawn_blocking(move || encode_with(&secret, &password, &options))
        .await
        .map_err(|e| EnvelopeError::Task(e.to_string()))?
}

/// [`Envelope::open`] on the blocking pool, for use from async code.
pub async fn decode_async(
    envelope: Envelope,
    password: Zeroizing<String>,
) -> Result<Zeroizing<String>, EnvelopeError> {
    tokio::task::spawn_blocking(move || envelope.open(&password))
        .await
        .map_err(|e| EnvelopeError::Task(e.to_string()))?
}
