//! Request identity helpers for tests.
//!
//! Hosts reach the services through the gateway, which injects
//! `x-utsave-host-id`. Guests carry a signed `guest_session` cookie.
//! These helpers build both without a gateway or browser.

use http::header::COOKIE;
use http::{HeaderMap, HeaderName, HeaderValue};
use uuid::Uuid;

use utsave_session::cookie::GUEST_SESSION_COOKIE;
use utsave_session::identity::HOST_ID_HEADER;
use utsave_session::token::GuestSessionSigner;

/// Secret shared by tests that sign or verify guest sessions.
pub const TEST_SESSION_SECRET: &[u8] = b"utsave-test-session-secret-0123456789";

pub fn test_signer() -> GuestSessionSigner {
    GuestSessionSigner::new(TEST_SESSION_SECRET).unwrap()
}

/// A host identity as the gateway would inject it.
pub struct MockHost {
    pub host_id: Uuid,
}

impl MockHost {
    pub fn new(host_id: Uuid) -> Self {
        Self { host_id }
    }

    pub fn headers(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(
            HeaderName::from_static(HOST_ID_HEADER),
            HeaderValue::from_str(&self.host_id.to_string()).unwrap(),
        );
        map
    }
}

/// A verified guest, carried as a `Cookie` header.
pub struct MockGuest {
    pub email: String,
    pub event_slug: String,
}

impl MockGuest {
    pub fn new(email: &str, event_slug: &str) -> Self {
        Self {
            email: email.to_owned(),
            event_slug: event_slug.to_owned(),
        }
    }

    pub fn token(&self) -> String {
        test_signer().issue(&self.email, &self.event_slug).unwrap()
    }

    pub fn headers(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(
            COOKIE,
            HeaderValue::from_str(&format!("{GUEST_SESSION_COOKIE}={}", self.token())).unwrap(),
        );
        map
    }
}
