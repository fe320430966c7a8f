/// Transport module: HTTP client for the nostr-vault key-escrow service.
///
/// The service stores one envelope per (NIP-05 identifier, PIN) pair and
/// exposes three endpoints:
///
/// ```text
/// POST /upload_key   {nip_05_id, pin, private_key_hash}  -> StoredKey
/// POST /fetch_key    {nip_05_id, pin}                    -> StoredKey
/// GET  /health_check                                     -> 200
/// ```
///
/// Error responses carry `{"value": "<message>"}`. Every call is a single
/// awaited request; retry and timeout policy belong to the caller.
use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{Nip05Id, Pin};
use crate::envelope::Envelope;
use crate::error::{EnvelopeError, EscrowError};

/// Default request timeout when the caller does not pick one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Serialize)]
struct UploadKeyRequest<'a> {
    nip_05_id: &'a Nip05Id,
    pin: Pin,
    private_key_hash: String,
}

#[derive(Serialize)]
struct FetchKeyRequest<'a> {
    nip_05_id: &'a Nip05Id,
    pin: Pin,
}

/// Error body returned by the escrow service.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ErrorResponse {
    pub value: String,
}

/// A key record as returned by `upload_key` and `fetch_key`.
///
/// Only `private_key_hash` (the envelope text) is required; the rest is
/// metadata the service may or may not include.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StoredKey {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub nip_05_id: String,
    pub private_key_hash: String,
}

impl StoredKey {
    /// Parse the stored envelope text.
    pub fn envelope(&self) -> Result<Envelope, EnvelopeError> {
        self.private_key_hash.trim().parse()
    }
}

/// Async client for the key-escrow service.
#[derive(Clone)]
pub struct EscrowClient {
    client: reqwest::Client,
    /// Base URL without a trailing slash, e.g. "http://localhost:9000".
    base_url: String,
}

impl EscrowClient {
    /// Create a client for `base_url` with a per-request `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, EscrowError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Store `envelope` under (`nip_05_id`, `pin`).
    pub async fn upload_key(
        &self,
        nip_05_id: &Nip05Id,
        pin: Pin,
        envelope: &Envelope,
    ) -> Result<StoredKey, EscrowError> {
        let url = format!("{}/upload_key", self.base_url);
        debug!(%url, %nip_05_id, "uploading envelope");

        let body = UploadKeyRequest {
            nip_05_id,
            pin,
            private_key_hash: envelope.to_string(),
        };
        let response = self.client.post(&url).json(&body).send().await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    /// Retrieve the envelope stored under (`nip_05_id`, `pin`).
    ///
    /// The returned record's envelope is verified to parse, so a garbled
    /// record is reported here as `BadEnvelope` rather than later as a
    /// decrypt failure.
    pub async fn fetch_key(
        &self,
        nip_05_id: &Nip05Id,
        pin: Pin,
    ) -> Result<StoredKey, EscrowError> {
        let url = format!("{}/fetch_key", self.base_url);
        debug!(%url, %nip_05_id, "fetching envelope");

        let body = FetchKeyRequest { nip_05_id, pin };
        let response = self.client.post(&url).json(&body).send().await?;
        let response = check_status(response).await?;
        let stored: StoredKey = response.json().await?;
        stored.envelope().map_err(EscrowError::BadEnvelope)?;
        Ok(stored)
    }

    /// Check that the service is up.
    pub async fn health_check(&self) -> Result<(), EscrowError> {
        let url = format!("{}/health_check", self.base_url);
        debug!(%url, "health check");
        let response = self.client.get(&url).send().await?;
        check_status(response).await?;
        Ok(())
    }
}

/// Map non-success statuses onto `EscrowError`, surfacing the service's
/// `{"value": …}` message when it sent one.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, EscrowError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&text)
        .map(|e| e.value)
        .unwrap_or_else(|_| text.trim().to_string());
    debug!(status = status.as_u16(), %message, "escrow request rejected");

    Err(match status {
        StatusCode::BAD_REQUEST => EscrowError::Validation(message),
        StatusCode::FORBIDDEN => EscrowError::InvalidPin,
        StatusCode::NOT_FOUND => EscrowError::NotFound,
        other => EscrowError::Status {
            status: other.as_u16(),
            message,
        },
    })
}
