//! Gateway-injected host identity extractor.

use axum::extract::FromRequestParts;
use http::request::Parts;
use http::{HeaderMap, StatusCode};
use uuid::Uuid;

/// Header the gateway sets after authenticating a host-owner session.
pub const HOST_ID_HEADER: &str = "x-utsave-host-id";

/// Host identity injected by the gateway via `x-utsave-host-id`.
///
/// Returns 401 if the header is absent or cannot be parsed as UUID.
/// Ownership checks (403) are done by use cases after extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostIdentity {
    pub host_id: Uuid,
}

impl HostIdentity {
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        headers
            .get(HOST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<Uuid>().ok())
            .map(|host_id| Self { host_id })
    }
}

impl<S> FromRequestParts<S> for HostIdentity
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    // Read the header synchronously and return a 'static future; an `async fn`
    // here would capture `parts` and trip E0195 against axum-core's signature.
    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let identity = Self::from_headers(&parts.headers);
        async move { identity.ok_or(StatusCode::UNAUTHORIZED) }
    }
}
