//! Text grammar for key envelopes.
//!
//! ```text
//! "$" KDFName "$" "i=" Iterations "," "l=" KeyBits "," "s=" SaltB64 "$" AEADName "$" NonceB64 "$" CiphertextB64
//! ```
//!
//! Serialization always writes the parameters in `i,l,s` order. Parsing accepts
//! them in any order but requires each exactly once and rejects unknown keys,
//! so an envelope claiming a different hash or extra settings cannot be
//! silently misread.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::{Envelope, KdfParams, AEAD_NAME, KDF_NAME};
use crate::crypto::{KeyBits, MAX_ITERATIONS, NONCE_LEN, SALT_LEN, TAG_LEN};
use crate::error::{EnvelopeError, EnvelopeField};

const DELIMITER: char = '$';

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "${}$i={},l={},s={}${}${}${}",
            KDF_NAME,
            self.kdf.iterations,
            self.kdf.key_bits.bits(),
            STANDARD.encode(self.kdf.salt),
            AEAD_NAME,
            STANDARD.encode(self.nonce),
            STANDARD.encode(&self.ciphertext),
        )
    }
}

/// Parse an envelope string into its typed parts.
///
/// Only structure and encodings are checked here; whether the password is
/// right is decided later by the AEAD tag.
pub(super) fn parse(input: &str) -> Result<Envelope, EnvelopeError> {
    let rest = input.strip_prefix(DELIMITER).ok_or_else(|| {
        EnvelopeError::malformed(EnvelopeField::Structure, "envelope must start with '$'")
    })?;

    let fields: Vec<&str> = rest.split(DELIMITER).collect();
    let [kdf_name, params, aead_name, nonce_b64, ciphertext_b64] = fields.as_slice() else {
        return Err(EnvelopeError::malformed(
            EnvelopeField::Structure,
            format!("expected 6 '$'-delimited fields, found {}", fields.len() + 1),
        ));
    };

    if let Some(pos) = fields.iter().position(|f| f.is_empty()) {
        return Err(EnvelopeError::malformed(
            EnvelopeField::Structure,
            format!("field {} is empty", pos + 1),
        ));
    }

    if *kdf_name != KDF_NAME {
        return Err(EnvelopeError::malformed(
            EnvelopeField::Kdf,
            format!("unsupported KDF (expected {})", KDF_NAME),
        ));
    }
    let kdf = parse_params(params)?;

    if *aead_name != AEAD_NAME {
        return Err(EnvelopeError::malformed(
            EnvelopeField::Aead,
            format!("unsupported AEAD (expected {})", AEAD_NAME),
        ));
    }

    let nonce: [u8; NONCE_LEN] = decode_fixed(nonce_b64, EnvelopeField::Nonce)?;

    let ciphertext = decode_b64(ciphertext_b64, EnvelopeField::Ciphertext)?;
    if ciphertext.len() < TAG_LEN {
        return Err(EnvelopeError::malformed(
            EnvelopeField::Ciphertext,
            format!(
                "too short ({} bytes, need at least {})",
                ciphertext.len(),
                TAG_LEN
            ),
        ));
    }

    Ok(Envelope {
        kdf,
        nonce,
        ciphertext,
    })
}

/// Parse the `i=…,l=…,s=…` list.
fn parse_params(field: &str) -> Result<KdfParams, EnvelopeError> {
    let mut iterations: Option<u32> = None;
    let mut key_bits: Option<KeyBits> = None;
    let mut salt: Option<[u8; SALT_LEN]> = None;

    for (index, entry) in field.split(',').enumerate() {
        // split_once at the first '=' keeps base64 padding in the value
        let (key, value) = entry.split_once('=').ok_or_else(|| {
            EnvelopeError::malformed(
                EnvelopeField::Params,
                format!("entry {} is not a key=value pair", index + 1),
            )
        })?;

        match key {
            "i" => set_once(&mut iterations, parse_iterations(value)?, key)?,
            "l" => set_once(&mut key_bits, parse_key_bits(value)?, key)?,
            "s" => set_once(&mut salt, decode_fixed(value, EnvelopeField::Salt)?, key)?,
            other => {
                return Err(EnvelopeError::malformed(
                    EnvelopeField::Params,
                    format!("unknown parameter '{}'", other),
                ))
            }
        }
    }

    Ok(KdfParams {
        iterations: iterations.ok_or_else(|| missing("i"))?,
        key_bits: key_bits.ok_or_else(|| missing("l"))?,
        salt: salt.ok_or_else(|| missing("s"))?,
    })
}

fn set_once<T>(slot: &mut Option<T>, value: T, key: &str) -> Result<(), EnvelopeError> {
    if slot.is_some() {
        return Err(EnvelopeError::malformed(
            EnvelopeField::Params,
            format!("parameter '{}' appears more than once", key),
        ));
    }
    *slot = Some(value);
    Ok(())
}

fn missing(key: &str) -> EnvelopeError {
    EnvelopeError::malformed(
        EnvelopeField::Params,
        format!("missing parameter '{}'", key),
    )
}

/// Strict unsigned decimal: no sign, no whitespace, at least one digit.
fn parse_decimal(value: &str, field: EnvelopeField) -> Result<u32, EnvelopeError> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(EnvelopeError::malformed(field, "not a decimal integer"));
    }
    value
        .parse::<u32>()
        .map_err(|_| EnvelopeError::malformed(field, "value out of range"))
}

fn parse_iterations(value: &str) -> Result<u32, EnvelopeError> {
    let iterations = parse_decimal(value, EnvelopeField::Iterations)?;
    if iterations == 0 || iterations > MAX_ITERATIONS {
        return Err(EnvelopeError::malformed(
            EnvelopeField::Iterations,
            format!("{} is outside 1..={}", iterations, MAX_ITERATIONS),
        ));
    }
    Ok(iterations)
}

fn parse_key_bits(value: &str) -> Result<KeyBits, EnvelopeError> {
    let bits = parse_decimal(value, EnvelopeField::KeyBits)?;
    KeyBits::from_bits(bits).ok_or_else(|| {
        EnvelopeError::malformed(
            EnvelopeField::KeyBits,
            format!("unsupported key length {} bits", bits),
        )
    })
}

fn decode_b64(value: &str, field: EnvelopeField) -> Result<Vec<u8>, EnvelopeError> {
    STANDARD
        .decode(value)
        .map_err(|e| EnvelopeError::malformed(field, format!("invalid base64: {}", e)))
}

fn decode_fixed<const N: usize>(
    value: &str,
    field: EnvelopeField,
) -> Result<[u8; N], EnvelopeError> {
    let bytes = decode_b64(value, field)?;
    let len = bytes.len();
    bytes.try_into().map_err(|_| {
        EnvelopeError::malformed(field, format!("expected {} bytes, got {}", N, len))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn b64(bytes: &[u8]) -> String {
        STANDARD.encode(bytes)
    }

    fn well_formed() -> String {
        format!(
            "$PBKDF2$i=100000,l=256,s={}$AESGM${}${}",
            b64(&[1u8; 32]),
            b64(&[2u8; 12]),
            b64(&[3u8; 40])
        )
    }

    fn malformed_field(input: &str) -> EnvelopeField {
        match parse(input) {
            Err(EnvelopeError::Malformed { field, .. }) => field,
            other => panic!("expected Malformed, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_well_formed() {
        let envelope = parse(&well_formed()).expect("well-formed envelope should parse");
        assert_eq!(envelope.kdf.iterations, 100_000);
        assert_eq!(envelope.kdf.key_bits, KeyBits::Aes256);
        assert_eq!(envelope.kdf.salt, [1u8; 32]);
        assert_eq!(envelope.nonce, [2u8; 12]);
        assert_eq!(envelope.ciphertext, vec![3u8; 40]);
    }

    #[test]
    fn test_display_reproduces_input() {
        let input = well_formed();
        let envelope = parse(&input).expect("should parse");
        assert_eq!(envelope.to_string(), input);
    }

    #[test]
    fn test_params_accepted_in_any_order() {
        let input = format!(
            "$PBKDF2$s={},l=128,i=5$AESGM${}${}",
            b64(&[1u8; 32]),
            b64(&[2u8; 12]),
            b64(&[3u8; 16])
        );
        let envelope = parse(&input).expect("reordered params should parse");
        assert_eq!(envelope.kdf.iterations, 5);
        assert_eq!(envelope.kdf.key_bits, KeyBits::Aes128);
        // Serialization normalizes to i,l,s
        assert!(envelope.to_string().starts_with("$PBKDF2$i=5,l=128,s="));
    }

    #[test]
    fn test_missing_leading_delimiter() {
        let input = well_formed();
        assert_eq!(malformed_field(&input[1..]), EnvelopeField::Structure);
    }

    #[test]
    fn test_wrong_field_count() {
        let input = well_formed();
        let truncated = &input[..input.rfind('$').unwrap()];
        assert_eq!(malformed_field(truncated), EnvelopeField::Structure);
        let extra = format!("{}$extra", input);
        assert_eq!(malformed_field(&extra), EnvelopeField::Structure);
        assert_eq!(malformed_field(""), EnvelopeField::Structure);
        assert_eq!(malformed_field("$"), EnvelopeField::Structure);
    }

    #[test]
    fn test_empty_field() {
        let input = format!("$PBKDF2$i=1,l=256,s={}$$AAAA$AAAA", b64(&[1u8; 32]));
        assert_eq!(malformed_field(&input), EnvelopeField::Structure);
    }

    #[test]
    fn test_unknown_kdf_and_aead() {
        let kdf = well_formed().replacen("PBKDF2", "SCRYPT", 1);
        assert_eq!(malformed_field(&kdf), EnvelopeField::Kdf);
        let aead = well_formed().replacen("AESGM", "CHACHA", 1);
        assert_eq!(malformed_field(&aead), EnvelopeField::Aead);
    }

    #[test]
    fn test_bad_params() {
        let salt = b64(&[1u8; 32]);
        let cases = [
            ("i=1,l=256".to_string(), EnvelopeField::Params),
            (format!("i=1,l=256,s={},s={}", salt, salt), EnvelopeField::Params),
            (format!("i=1,l=256,s={},h=SHA-512", salt), EnvelopeField::Params),
            (format!("i=1,l=256,{}", salt), EnvelopeField::Params),
            (format!("i=0,l=256,s={}", salt), EnvelopeField::Iterations),
            (format!("i=+5,l=256,s={}", salt), EnvelopeField::Iterations),
            (format!("i=99999999999,l=256,s={}", salt), EnvelopeField::Iterations),
            (format!("i=20000000,l=256,s={}", salt), EnvelopeField::Iterations),
            (format!("i=1,l=192,s={}", salt), EnvelopeField::KeyBits),
            (format!("i=1,l=abc,s={}", salt), EnvelopeField::KeyBits),
            (format!("i=1,l=256,s={}", b64(&[1u8; 16])), EnvelopeField::Salt),
            ("i=1,l=256,s=!!!!".to_string(), EnvelopeField::Salt),
        ];
        for (params, expected) in cases {
            let input = format!("$PBKDF2${}$AESGM${}${}", params, b64(&[2u8; 12]), b64(&[3u8; 40]));
            assert_eq!(malformed_field(&input), expected, "params: {}", params);
        }
    }

    #[test]
    fn test_bad_nonce() {
        let salt = b64(&[1u8; 32]);
        let short = format!(
            "$PBKDF2$i=1,l=256,s={}$AESGM${}${}",
            salt,
            b64(&[2u8; 8]),
            b64(&[3u8; 40])
        );
        assert_eq!(malformed_field(&short), EnvelopeField::Nonce);
        let garbage = format!("$PBKDF2$i=1,l=256,s={}$AESGM$not*base64${}", salt, b64(&[3u8; 40]));
        assert_eq!(malformed_field(&garbage), EnvelopeField::Nonce);
    }

    #[test]
    fn test_bad_ciphertext() {
        let salt = b64(&[1u8; 32]);
        let nonce = b64(&[2u8; 12]);
        let short = format!("$PBKDF2$i=1,l=256,s={}$AESGM${}${}", salt, nonce, b64(&[3u8; 15]));
        assert_eq!(malformed_field(&short), EnvelopeField::Ciphertext);
        let garbage = format!("$PBKDF2$i=1,l=256,s={}$AESGM${}$%%%", salt, nonce);
        assert_eq!(malformed_field(&garbage), EnvelopeField::Ciphertext);
    }
}
