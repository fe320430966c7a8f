use std::fmt;

use serde::Serialize;

use crate::error::VaultError;

/// Six-digit escrow PIN, sent to the service as a JSON number.
///
/// The service owns PIN enforcement; this only rejects values it would refuse
/// anyway, before a round trip.
#[derive(Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Pin(u64);

impl Pin {
    pub const MIN: u64 = 100_000;
    pub const MAX: u64 = 999_999;

    pub fn parse(value: u64) -> Result<Pin, VaultError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Pin(value))
        } else {
            Err(VaultError::InvalidPin(value))
        }
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

// Keep PINs out of logs and panic messages.
impl fmt::Debug for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Pin(******)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn six_digit_pins_are_accepted() {
        assert!(Pin::parse(100_000).is_ok());
        assert!(Pin::parse(374_859).is_ok());
        assert!(Pin::parse(999_999).is_ok());
    }

    #[test]
    fn short_and_long_pins_are_rejected() {
        assert!(matches!(Pin::parse(99_999), Err(VaultError::InvalidPin(99_999))));
        assert!(Pin::parse(1_000_000).is_err());
        assert!(Pin::parse(0).is_err());
    }

    #[test]
    fn serializes_as_a_number() {
        let pin = Pin::parse(132_432).unwrap();
        assert_eq!(serde_json::to_string(&pin).unwrap(), "132432");
    }

    #[test]
    fn debug_does_not_leak_the_pin() {
        let pin = Pin::parse(132_432).unwrap();
        assert!(!format!("{:?}", pin).contains("132432"));
    }
}
