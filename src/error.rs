use std::fmt;

use thiserror::Error;

/// Envelope field named by a [`EnvelopeError::Malformed`] error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeField {
    /// The `$`-delimited layout itself (field count, leading delimiter, empty fields).
    Structure,
    Kdf,
    /// The `i=…,l=…,s=…` parameter list as a whole.
    Params,
    Iterations,
    KeyBits,
    Salt,
    Aead,
    Nonce,
    Ciphertext,
}

impl fmt::Display for EnvelopeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EnvelopeField::Structure => "structure",
            EnvelopeField::Kdf => "KDF name",
            EnvelopeField::Params => "KDF parameters",
            EnvelopeField::Iterations => "iteration count",
            EnvelopeField::KeyBits => "key length",
            EnvelopeField::Salt => "salt",
            EnvelopeField::Aead => "AEAD name",
            EnvelopeField::Nonce => "nonce",
            EnvelopeField::Ciphertext => "ciphertext",
        };
        f.write_str(name)
    }
}

/// Errors produced while sealing or opening a key envelope.
///
/// `Authentication` carries no detail: a wrong password and a tampered
/// envelope are indistinguishable to the caller.
#[derive(Error, Debug)]
pub enum EnvelopeError {
    #[error("Malformed envelope ({field}): {reason}")]
    Malformed {
        field: EnvelopeField,
        reason: String,
    },

    #[error("Wrong password or corrupted envelope")]
    Authentication,

    #[error("Decrypted secret is not valid UTF-8")]
    Decoding,

    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("Envelope task failed: {0}")]
    Task(String),
}

impl EnvelopeError {
    pub(crate) fn malformed(field: EnvelopeField, reason: impl Into<String>) -> Self {
        EnvelopeError::Malformed {
            field,
            reason: reason.into(),
        }
    }
}

/// Errors returned by the key-escrow HTTP client.
#[derive(Error, Debug)]
pub enum EscrowError {
    #[error("Escrow service rejected the request: {0}")]
    Validation(String),

    #[error("Pin is not valid for the provided identifier")]
    InvalidPin,

    #[error("No key stored for the provided identifier and pin")]
    NotFound,

    #[error("Escrow service returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Escrow request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Escrow service returned an unusable envelope: {0}")]
    BadEnvelope(#[source] EnvelopeError),
}

impl EscrowError {
    /// True for failures worth retrying: transport errors and 5xx responses.
    pub fn is_transient(&self) -> bool {
        match self {
            EscrowError::Http(e) => !e.is_builder() && !e.is_decode(),
            EscrowError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// True when the request never reached the service, so sending it again
    /// cannot store a second record.
    pub fn is_connect_failure(&self) -> bool {
        matches!(self, EscrowError::Http(e) if e.is_connect())
    }
}

#[derive(Error, Debug)]
pub enum VaultError {
    #[error("Pin must be six digits ({}..={})", crate::domain::Pin::MIN, crate::domain::Pin::MAX)]
    InvalidPin(u64),

    #[error("{0} is not a valid NIP-05 identifier")]
    InvalidNip05Id(String),

    #[error("Cannot determine home directory")]
    HomeDirNotFound,

    #[error("Failed to write config file atomically")]
    AtomicWriteFailed(#[source] std::io::Error),

    #[error("{0} requires an interactive terminal")]
    NotInteractive(&'static str),

    #[error("Iteration count {0} is below the minimum of {1}")]
    IterationsTooLow(u32, u32),
}
