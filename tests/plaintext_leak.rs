/// Plaintext leak detection tests.
///
/// Verify that envelopes never contain the secret key or the password in any
/// readable form: not in the envelope text, not in its decoded ciphertext
/// bytes, and not as a base64 substring.
use base64::Engine;
use nostr_vault::envelope::{self, EncodeOptions, Envelope};

const SECRET: &str = "nsec1KNOWNSECRETKEYMUSTNOTAPPEARanywhere0123456789";
const PASSWORD: &str = "KNOWN-PASSWORD-MUST-NOT-APPEAR";

fn seal() -> Envelope {
    let options = EncodeOptions {
        iterations: 1_000,
        key_bits: 256,
    };
    envelope::encode_with(SECRET, PASSWORD, &options).expect("encode should succeed")
}

fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

// ── Test 1: Envelope text ──────────────────────────────────────────────────

#[test]
fn test_envelope_text_contains_no_plaintext() {
    let text = seal().to_string();

    assert!(!text.contains(SECRET), "envelope must not contain the secret");
    assert!(!text.contains(PASSWORD), "envelope must not contain the password");
    assert!(!text.contains("nsec1"), "envelope must not even carry the bech32 prefix");

    let secret_b64 = base64::engine::general_purpose::STANDARD.encode(SECRET);
    assert!(
        !text.contains(&secret_b64),
        "envelope must not contain the base64-encoded secret"
    );
}

// ── Test 2: Raw ciphertext bytes ───────────────────────────────────────────

#[test]
fn test_ciphertext_bytes_contain_no_plaintext() {
    let sealed = seal();
    assert!(!contains_bytes(sealed.ciphertext(), SECRET.as_bytes()));
    assert!(!contains_bytes(sealed.ciphertext(), PASSWORD.as_bytes()));
    // Ciphertext is exactly plaintext plus the 16-byte tag.
    assert_eq!(sealed.ciphertext().len(), SECRET.len() + 16);
}

// ── Test 3: Debug output ───────────────────────────────────────────────────

#[test]
fn test_pin_debug_output_is_masked() {
    let pin = nostr_vault::domain::Pin::parse(374_859).expect("valid pin");
    let debug = format!("{:?}", pin);
    assert!(!debug.contains("374859"), "Debug must not reveal the PIN: {}", debug);
}
