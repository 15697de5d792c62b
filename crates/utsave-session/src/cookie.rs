//! Cookie builders for the guest session.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

use crate::token::GUEST_SESSION_TTL_MS;

/// Cookie name carrying the signed guest session token.
pub const GUEST_SESSION_COOKIE: &str = "guest_session";

/// Cookie Max-Age in seconds; matches the token lifetime (2 hours).
pub const GUEST_SESSION_MAX_AGE_SECS: i64 = GUEST_SESSION_TTL_MS / 1000;

/// Set the guest session cookie on the jar.
///
/// ```
/// use axum_extra::extract::cookie::{CookieJar, SameSite};
/// use utsave_session::cookie::{set_guest_session_cookie, GUEST_SESSION_COOKIE};
///
/// let jar = set_guest_session_cookie(CookieJar::new(), "token".to_string(), true);
/// let cookie = jar.get(GUEST_SESSION_COOKIE).unwrap();
/// assert_eq!(cookie.value(), "token");
/// assert_eq!(cookie.path(), Some("/"));
/// assert_eq!(cookie.max_age(), Some(time::Duration::seconds(7200)));
/// assert_eq!(cookie.same_site(), Some(SameSite::Lax));
/// assert!(cookie.http_only().unwrap_or(false));
/// assert!(cookie.secure().unwrap_or(false));
/// ```
pub fn set_guest_session_cookie(jar: CookieJar, token: String, secure: bool) -> CookieJar {
    let cookie = Cookie::build((GUEST_SESSION_COOKIE, token))
        .path("/")
        .max_age(Duration::seconds(GUEST_SESSION_MAX_AGE_SECS))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build();
    jar.add(cookie)
}

/// Expire the guest session cookie (Max-Age 0).
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use utsave_session::cookie::{
///     clear_guest_session_cookie, set_guest_session_cookie, GUEST_SESSION_COOKIE,
/// };
///
/// let jar = set_guest_session_cookie(CookieJar::new(), "token".to_string(), false);
/// let jar = clear_guest_session_cookie(jar, false);
/// let cookie = jar.get(GUEST_SESSION_COOKIE).unwrap();
/// assert_eq!(cookie.value(), "");
/// assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
/// ```
pub fn clear_guest_session_cookie(jar: CookieJar, secure: bool) -> CookieJar {
    let cookie = Cookie::build((GUEST_SESSION_COOKIE, ""))
        .path("/")
        .max_age(Duration::ZERO)
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build();
    jar.add(cookie)
}
