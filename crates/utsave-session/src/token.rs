//! Stateless guest session tokens.
//!
//! Wire format: `base64url(payload_json) "." base64url(hmac_sha256(payload_b64))`,
//! both parts unpadded. The payload is `{email, event_slug, issued_at_ms}`.
//! Nothing is stored server-side; lifetime is enforced from `issued_at_ms`
//! on every verification.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Guest session lifetime in milliseconds (2 hours).
pub const GUEST_SESSION_TTL_MS: i64 = 2 * 60 * 60 * 1000;

/// Minimum accepted length of the signing secret in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// Tolerated forward clock skew between issuing and verifying nodes.
const MAX_CLOCK_SKEW_MS: i64 = 60_000;

/// Identity asserted by a valid guest session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuestClaims {
    pub email: String,
    pub event_slug: String,
    pub issued_at_ms: i64,
}

impl GuestClaims {
    pub fn expires_at_ms(&self) -> i64 {
        self.issued_at_ms + GUEST_SESSION_TTL_MS
    }
}

/// Errors raised while constructing a signer or issuing a token.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("guest session secret must be at least {MIN_SECRET_LEN} bytes")]
    SecretTooShort,
    #[error("failed to encode session payload")]
    Encode(#[from] serde_json::Error),
}

/// Returned for every token that fails verification, whatever the reason.
///
/// Callers treat it uniformly as "not authenticated".
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid guest session")]
pub struct SessionRejected;

#[derive(Serialize)]
struct OutgoingPayload<'a> {
    email: &'a str,
    event_slug: &'a str,
    issued_at_ms: i64,
}

/// Older tokens carried the slug under `event`; both shapes decode here.
#[derive(Deserialize)]
struct IncomingPayload {
    email: String,
    #[serde(alias = "event")]
    event_slug: String,
    issued_at_ms: i64,
}

/// Issues and verifies guest session tokens with a server-held HMAC key.
#[derive(Clone)]
pub struct GuestSessionSigner {
    mac: HmacSha256,
    ttl_ms: i64,
}

impl std::fmt::Debug for GuestSessionSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuestSessionSigner")
            .field("ttl_ms", &self.ttl_ms)
            .finish_non_exhaustive()
    }
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

impl GuestSessionSigner {
    pub fn new(secret: &[u8]) -> Result<Self, SessionError> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(SessionError::SecretTooShort);
        }
        let mac = HmacSha256::new_from_slice(secret).map_err(|_| SessionError::SecretTooShort)?;
        Ok(Self {
            mac,
            ttl_ms: GUEST_SESSION_TTL_MS,
        })
    }

    pub fn ttl_ms(&self) -> i64 {
        self.ttl_ms
    }

    /// Issue a token for `email` on `event_slug`, stamped with the current time.
    pub fn issue(&self, email: &str, event_slug: &str) -> Result<String, SessionError> {
        self.issue_at(email, event_slug, now_ms())
    }

    pub fn issue_at(
        &self,
        email: &str,
        event_slug: &str,
        issued_at_ms: i64,
    ) -> Result<String, SessionError> {
        let payload = serde_json::to_vec(&OutgoingPayload {
            email,
            event_slug,
            issued_at_ms,
        })?;
        let encoded = URL_SAFE_NO_PAD.encode(payload);
        let signature = self.sign(encoded.as_bytes());
        Ok(format!("{encoded}.{}", URL_SAFE_NO_PAD.encode(signature)))
    }

    /// Verify a token against the current time.
    ///
    /// When `expected_event_slug` is given, a token for any other event is rejected.
    pub fn verify(
        &self,
        token: &str,
        expected_event_slug: Option<&str>,
    ) -> Result<GuestClaims, SessionRejected> {
        self.verify_at(token, expected_event_slug, now_ms())
    }

    pub fn verify_at(
        &self,
        token: &str,
        expected_event_slug: Option<&str>,
        now_ms: i64,
    ) -> Result<GuestClaims, SessionRejected> {
        let (payload_b64, signature_b64) = token.rsplit_once('.').ok_or(SessionRejected)?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| SessionRejected)?;

        // Signature first: nothing in the payload is trusted before this.
        let mut mac = self.mac.clone();
        mac.update(payload_b64.as_bytes());
        mac.verify_slice(&signature).map_err(|_| SessionRejected)?;

        let payload = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| SessionRejected)?;
        let payload: IncomingPayload =
            serde_json::from_slice(&payload).map_err(|_| SessionRejected)?;

        let elapsed = now_ms.saturating_sub(payload.issued_at_ms);
        if elapsed >= self.ttl_ms || elapsed < -MAX_CLOCK_SKEW_MS {
            return Err(SessionRejected);
        }

        if let Some(expected) = expected_event_slug {
            if payload.event_slug != expected {
                return Err(SessionRejected);
            }
        }

        Ok(GuestClaims {
            email: payload.email,
            event_slug: payload.event_slug,
            issued_at_ms: payload.issued_at_ms,
        })
    }

    fn sign(&self, data: &[u8]) -> Vec<u8> {
        let mut mac = self.mac.clone();
        mac.update(data);
        mac.finalize().into_bytes().to_vec()
    }
}
