//! Request identity for gallery routes.
//!
//! A gateway-injected host id wins over a guest cookie when both are present.

use axum::extract::{FromRequestParts, Query};
use axum::http::{HeaderMap, Uri, request::Parts};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use utsave_domain::email::GuestEmail;
use utsave_domain::id::HostId;
use utsave_session::cookie::GUEST_SESSION_COOKIE;
use utsave_session::identity::HostIdentity;
use utsave_session::token::{GuestClaims, GuestSessionSigner};

use crate::domain::types::Viewer;
use crate::error::GalleryServiceError;
use crate::state::AppState;

#[derive(Deserialize)]
struct EventFilter {
    event: Option<String>,
}

/// `?event=<slug>` on the request URI, if any.
fn expected_event(uri: &Uri) -> Option<String> {
    Query::<EventFilter>::try_from_uri(uri)
        .ok()
        .and_then(|Query(filter)| filter.event)
        .filter(|slug| !slug.is_empty())
}

/// Verify the guest cookie. A bad or missing cookie is `Unauthenticated`;
/// a valid cookie for a different event than `expected_event` is `Forbidden`.
pub fn guest_claims(
    headers: &HeaderMap,
    signer: &GuestSessionSigner,
    expected_event: Option<&str>,
) -> Result<GuestClaims, GalleryServiceError> {
    let jar = CookieJar::from_headers(headers);
    let token = jar
        .get(GUEST_SESSION_COOKIE)
        .map(|c| c.value())
        .filter(|v| !v.is_empty())
        .ok_or(GalleryServiceError::Unauthenticated)?;
    let claims = signer
        .verify(token, None)
        .map_err(|_| GalleryServiceError::Unauthenticated)?;
    if expected_event.is_some_and(|slug| slug != claims.event_slug) {
        return Err(GalleryServiceError::Forbidden);
    }
    Ok(claims)
}

pub fn resolve_viewer(
    headers: &HeaderMap,
    uri: &Uri,
    signer: &GuestSessionSigner,
) -> Result<Viewer, GalleryServiceError> {
    if let Some(host) = HostIdentity::from_headers(headers) {
        return Ok(Viewer::Host {
            host_id: HostId(host.host_id),
        });
    }
    let expected = expected_event(uri);
    let claims = guest_claims(headers, signer, expected.as_deref())?;
    let email =
        GuestEmail::parse(&claims.email).map_err(|_| GalleryServiceError::Unauthenticated)?;
    Ok(Viewer::Guest {
        email,
        event_slug: claims.event_slug,
    })
}

impl FromRequestParts<AppState> for Viewer {
    type Rejection = GalleryServiceError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let viewer = resolve_viewer(&parts.headers, &parts.uri, &state.signer);
        async move { viewer }
    }
}

/// A verified guest session, cookie only.
#[derive(Debug, Clone)]
pub struct GuestSession(pub GuestClaims);

impl FromRequestParts<AppState> for GuestSession {
    type Rejection = GalleryServiceError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let expected = expected_event(&parts.uri);
        let claims = guest_claims(&parts.headers, &state.signer, expected.as_deref());
        async move { claims.map(GuestSession) }
    }
}

/// Gateway-authenticated host, for host-only routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostOwner(pub HostId);

impl HostOwner {
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, GalleryServiceError> {
        HostIdentity::from_headers(headers)
            .map(|identity| Self(HostId(identity.host_id)))
            .ok_or(GalleryServiceError::Unauthenticated)
    }
}

impl FromRequestParts<AppState> for HostOwner {
    type Rejection = GalleryServiceError;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let owner = Self::from_headers(&parts.headers);
        async move { owner }
    }
}
