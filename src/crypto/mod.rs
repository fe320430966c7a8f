//! Crypto module: PBKDF2-HMAC-SHA256 key derivation and AES-GCM sealing.
//!
//! These are the leaf primitives under the envelope format. Keys are always
//! returned in `Zeroizing` buffers so derived material is wiped on drop. The
//! hash inside PBKDF2 is fixed to SHA-256: envelopes record the KDF family and
//! its parameters but not the hash, so there is nothing to select it from.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes128Gcm, Aes256Gcm};
use pbkdf2::pbkdf2_hmac;
use rand::Rng;
use sha2::Sha256;
use zeroize::Zeroizing;

/// Salt length in bytes, generated fresh for every envelope.
pub const SALT_LEN: usize = 32;

/// AES-GCM nonce length in bytes (96 bits).
pub const NONCE_LEN: usize = 12;

/// AES-GCM authentication tag length, appended to every ciphertext.
pub const TAG_LEN: usize = 16;

/// Default PBKDF2 iteration count written into new envelopes.
pub const DEFAULT_ITERATIONS: u32 = 100_000;

/// Upper bound on the iteration count an envelope may claim.
pub const MAX_ITERATIONS: u32 = 10_000_000;

/// AES-GCM key sizes this crate can derive and use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyBits {
    Aes128,
    Aes256,
}

impl KeyBits {
    pub fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            128 => Some(KeyBits::Aes128),
            256 => Some(KeyBits::Aes256),
            _ => None,
        }
    }

    pub fn bits(self) -> u32 {
        match self {
            KeyBits::Aes128 => 128,
            KeyBits::Aes256 => 256,
        }
    }

    pub fn byte_len(self) -> usize {
        self.bits() as usize / 8
    }
}

/// Generate a fresh random 32-byte salt.
pub fn random_salt() -> [u8; SALT_LEN] {
    rand::thread_rng().gen()
}

/// Generate a fresh random 12-byte nonce.
pub fn random_nonce() -> [u8; NONCE_LEN] {
    rand::thread_rng().gen()
}

/// Derive a symmetric key from a password and salt with PBKDF2-HMAC-SHA256.
///
/// Deterministic: the same password, salt, iteration count and key length
/// always produce the same key.
pub fn derive_key(
    password: &str,
    salt: &[u8],
    iterations: u32,
    key_bits: KeyBits,
) -> Zeroizing<Vec<u8>> {
    let mut key = Zeroizing::new(vec![0u8; key_bits.byte_len()]);
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, key.as_mut_slice());
    key
}

/// Encrypt `plaintext` with AES-GCM under `key` and `nonce`, no associated data.
///
/// The returned ciphertext has the 16-byte tag appended, in the same layout
/// WebCrypto produces.
pub fn aead_seal(
    key: &[u8],
    nonce: &[u8; NONCE_LEN],
    plaintext: &[u8],
) -> anyhow::Result<Vec<u8>> {
    match key.len() {
        16 => seal_with::<Aes128Gcm>(key, nonce, plaintext),
        32 => seal_with::<Aes256Gcm>(key, nonce, plaintext),
        n => anyhow::bail!("unsupported AES-GCM key length: {} bytes", n),
    }
}

/// Decrypt and authenticate an AES-GCM ciphertext (tag appended).
///
/// Returns `None` when the tag does not verify; a wrong key and tampered
/// bytes are the same failure.
pub fn aead_open(key: &[u8], nonce: &[u8; NONCE_LEN], ciphertext: &[u8]) -> Option<Vec<u8>> {
    match key.len() {
        16 => open_with::<Aes128Gcm>(key, nonce, ciphertext),
        32 => open_with::<Aes256Gcm>(key, nonce, ciphertext),
        _ => None,
    }
}

fn seal_with<C>(key: &[u8], nonce: &[u8; NONCE_LEN], plaintext: &[u8]) -> anyhow::Result<Vec<u8>>
where
    C: KeyInit + Aead,
{
    let cipher = C::new_from_slice(key).map_err(|e| anyhow::anyhow!("cipher init failed: {}", e))?;
    cipher
        .encrypt(aes_gcm::aead::Nonce::<C>::from_slice(nonce), plaintext)
        .map_err(|e| anyhow::anyhow!("AES-GCM encrypt failed: {}", e))
}

fn open_with<C>(key: &[u8], nonce: &[u8; NONCE_LEN], ciphertext: &[u8]) -> Option<Vec<u8>>
where
    C: KeyInit + Aead,
{
    let cipher = C::new_from_slice(key).ok()?;
    cipher
        .decrypt(aes_gcm::aead::Nonce::<C>::from_slice(nonce), ciphertext)
        .ok()
}
