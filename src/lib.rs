/// nostr-vault library crate: password-sealed key envelopes and the escrow
/// client that stores them.
///
/// Modules are public so the `tests/` integration tests (and the binary) can
/// reach them via `use nostr_vault::envelope::*` and friends.
pub mod config;
pub mod crypto;
pub mod domain;
pub mod envelope;
pub mod error;
pub mod transport;
