use chrono::{DateTime, Utc};

use utsave_domain::attendance::Attendance;
use utsave_domain::email::GuestEmail;
use utsave_domain::id::{AlbumId, ChallengeId, EventId, HostId};

#[derive(Debug, Clone)]
pub struct Event {
    pub id: EventId,
    pub host_id: HostId,
    pub slug: String,
    pub name: String,
    pub starts_at: DateTime<Utc>,
}

/// Guest-list entry for one event.
#[derive(Debug, Clone)]
pub struct Guest {
    pub event_id: EventId,
    pub email: GuestEmail,
    pub name: String,
    pub attendance: Attendance,
}

/// Pending email verification for one (event, email) pair.
#[derive(Debug, Clone)]
pub struct OtpChallenge {
    pub id: ChallengeId,
    pub event_id: EventId,
    pub email: GuestEmail,
    /// Keyed digest of the code; the code itself is never stored.
    pub code_hash: String,
    pub expires_at: DateTime<Utc>,
    pub attempts: u32,
    pub created_at: DateTime<Utc>,
}

impl OtpChallenge {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_locked(&self) -> bool {
        self.attempts >= MAX_OTP_ATTEMPTS
    }
}

#[derive(Debug, Clone)]
pub struct Album {
    pub id: AlbumId,
    pub host_id: HostId,
    pub event_id: Option<EventId>,
    pub name: String,
    pub slug: String,
    pub slideshow_enabled: bool,
    pub created_at: DateTime<Utc>,
}

impl Album {
    /// Object-storage prefix under which this album's photos live.
    pub fn storage_prefix(&self) -> String {
        format!("{}/{}/", self.host_id, self.id)
    }
}

#[derive(Debug, Clone)]
pub struct AlbumShare {
    pub album_id: AlbumId,
    pub email: GuestEmail,
    pub granted_at: DateTime<Utc>,
}

/// An object found under an album's storage prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoObject {
    /// File name relative to the album prefix.
    pub name: String,
    /// Full object path within the bucket.
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedPhoto {
    pub name: String,
    pub url: String,
}

/// Who is asking to see gallery content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Viewer {
    /// A guest holding a valid session for `event_slug`.
    Guest {
        email: GuestEmail,
        event_slug: String,
    },
    /// The owning host, authenticated by the gateway.
    Host { host_id: HostId },
}

/// OTP length in digits.
pub const OTP_CODE_LEN: usize = 6;

/// OTP time-to-live in seconds (10 minutes).
pub const OTP_TTL_SECS: i64 = 600;

/// Failed verifications allowed before a challenge is locked.
pub const MAX_OTP_ATTEMPTS: u32 = 5;

/// Signed photo URL lifetime in seconds (1 hour).
pub const SIGNED_URL_TTL_SECS: u64 = 3600;

/// OTP send requests allowed per client IP per window.
pub const OTP_SEND_LIMIT: u64 = 5;

/// OTP send rate-limit window in seconds (10 minutes).
pub const OTP_SEND_WINDOW_SECS: u64 = 600;
