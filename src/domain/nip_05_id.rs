use std::fmt;

use serde::Serialize;

use crate::error::VaultError;

/// NIP-05 identifier (`name@domain`) used as the escrow lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Nip05Id(String);

impl Nip05Id {
    /// Shape check only: a non-empty local part, one `@`, and a dotted domain
    /// with no empty labels. The escrow service does its own validation.
    pub fn parse(s: &str) -> Result<Nip05Id, VaultError> {
        let invalid = || VaultError::InvalidNip05Id(s.to_string());

        if s.len() > 254 || s.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(invalid());
        }
        let (local, domain) = s.split_once('@').ok_or_else(invalid)?;
        if local.is_empty() || domain.contains('@') {
            return Err(invalid());
        }
        let labels: Vec<&str> = domain.split('.').collect();
        if labels.len() < 2 || labels.iter().any(|l| l.is_empty()) {
            return Err(invalid());
        }
        Ok(Self(s.to_string()))
    }
}

impl fmt::Display for Nip05Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl AsRef<str> for Nip05Id {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_identifiers_are_parsed() {
        for id in [
            "the_name_is_bob_bob_smith@frogs.cloud",
            "alice@example.com",
            "_@sub.domain.org",
        ] {
            assert!(Nip05Id::parse(id).is_ok(), "{} should parse", id);
        }
    }

    #[test]
    fn empty_string_is_rejected() {
        assert!(Nip05Id::parse("").is_err());
    }

    #[test]
    fn missing_at_symbol_is_rejected() {
        assert!(Nip05Id::parse("ursuladomain.com").is_err());
    }

    #[test]
    fn missing_subject_is_rejected() {
        assert!(Nip05Id::parse("@domain.com").is_err());
    }

    #[test]
    fn undotted_or_broken_domains_are_rejected() {
        assert!(Nip05Id::parse("bob@localhost").is_err());
        assert!(Nip05Id::parse("bob@domain.").is_err());
        assert!(Nip05Id::parse("bob@.com").is_err());
        assert!(Nip05Id::parse("bob@a@b.com").is_err());
    }

    #[test]
    fn whitespace_is_rejected() {
        assert!(Nip05Id::parse("bob smith@domain.com").is_err());
        assert!(Nip05Id::parse("bob@domain.com\n").is_err());
    }

    #[test]
    fn serializes_as_a_string() {
        let id = Nip05Id::parse("alice@example.com").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"alice@example.com\"");
    }
}
