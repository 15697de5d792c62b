//! Guest session primitives shared by Utsave services.
//!
//! Provides the HMAC-signed guest session token, the `guest_session` cookie
//! builders, and the gateway-injected `HostIdentity` extractor.

pub mod cookie;
pub mod identity;
pub mod token;
