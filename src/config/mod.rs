//! Configuration: where the escrow service lives.
//!
//! Resolution order is flag/env (`--escrow-url`, `NOSTR_VAULT_URL`), then the
//! saved file under `~/.nostr-vault/`, then [`DEFAULT_ESCROW_URL`].

pub mod store;

use std::fmt;

/// Where the local nostr-vault service listens by default.
pub const DEFAULT_ESCROW_URL: &str = "http://localhost:9000";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlSource {
    Flag,
    File,
    Default,
}

impl fmt::Display for UrlSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UrlSource::Flag => "--escrow-url / NOSTR_VAULT_URL",
            UrlSource::File => "config file",
            UrlSource::Default => "built-in default",
        };
        f.write_str(s)
    }
}

/// Pick the escrow URL from an explicit value, else `saved`, else the default.
pub fn resolve_escrow_url(explicit: Option<&str>, saved: Option<String>) -> (String, UrlSource) {
    if let Some(url) = explicit.map(str::trim).filter(|u| !u.is_empty()) {
        return (url.to_string(), UrlSource::Flag);
    }
    if let Some(url) = saved {
        return (url, UrlSource::File);
    }
    (DEFAULT_ESCROW_URL.to_string(), UrlSource::Default)
}

/// Read the saved URL from disk and resolve against `explicit`.
pub fn escrow_url(explicit: Option<&str>) -> anyhow::Result<(String, UrlSource)> {
    if explicit.is_some_and(|u| !u.trim().is_empty()) {
        return Ok(resolve_escrow_url(explicit, None));
    }
    let saved = store::read_escrow_url(&store::escrow_url_path()?)?;
    Ok(resolve_escrow_url(None, saved))
}

/// Accept only http(s) URLs so a typo fails here instead of inside reqwest.
pub fn validate_escrow_url(url: &str) -> anyhow::Result<()> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .ok_or_else(|| anyhow::anyhow!("escrow URL must start with http:// or https://: {}", url))?;
    if rest.is_empty() || rest.starts_with('/') || rest.chars().any(char::is_whitespace) {
        anyhow::bail!("escrow URL has no host: {}", url);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_url_wins() {
        let (url, source) =
            resolve_escrow_url(Some("https://vault.example"), Some("http://saved".into()));
        assert_eq!(url, "https://vault.example");
        assert_eq!(source, UrlSource::Flag);
    }

    #[test]
    fn blank_explicit_url_falls_through() {
        let (url, source) = resolve_escrow_url(Some("  "), Some("http://saved:1".into()));
        assert_eq!(url, "http://saved:1");
        assert_eq!(source, UrlSource::File);
    }

    #[test]
    fn default_when_nothing_configured() {
        let (url, source) = resolve_escrow_url(None, None);
        assert_eq!(url, DEFAULT_ESCROW_URL);
        assert_eq!(source, UrlSource::Default);
    }

    #[test]
    fn url_validation() {
        assert!(validate_escrow_url("http://localhost:9000").is_ok());
        assert!(validate_escrow_url("https://vault.example/api").is_ok());
        assert!(validate_escrow_url("localhost:9000").is_err());
        assert!(validate_escrow_url("ftp://host").is_err());
        assert!(validate_escrow_url("https://").is_err());
        assert!(validate_escrow_url("https://ho st").is_err());
    }
}
