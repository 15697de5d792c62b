#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};

use utsave_domain::email::GuestEmail;
use utsave_domain::id::{AlbumId, ChallengeId, EventId, HostId};

use crate::domain::types::{Album, AlbumShare, Event, Guest, OtpChallenge, PhotoObject};
use crate::error::GalleryServiceError;

pub trait EventRepository: Send + Sync {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Event>, GalleryServiceError>;
}

/// Read access to event guest lists (RSVPs).
pub trait GuestRepository: Send + Sync {
    async fn find(
        &self,
        event_id: EventId,
        email: &GuestEmail,
    ) -> Result<Option<Guest>, GalleryServiceError>;
}

/// Repository for pending OTP challenges.
pub trait OtpChallengeRepository: Send + Sync {
    /// Delete any challenge for the same (event, email) and insert this one,
    /// atomically (same transaction).
    async fn replace(&self, challenge: &OtpChallenge) -> Result<(), GalleryServiceError>;

    async fn find(
        &self,
        event_id: EventId,
        email: &GuestEmail,
    ) -> Result<Option<OtpChallenge>, GalleryServiceError>;

    /// Delete a challenge. Returns `true` if this call removed the row.
    async fn delete(&self, id: ChallengeId) -> Result<bool, GalleryServiceError>;

    /// Claim one verification attempt: `attempts + 1` only while `attempts < max`,
    /// in a single conditional write.
    async fn reserve_attempt(
        &self,
        id: ChallengeId,
        max: u32,
    ) -> Result<AttemptSlot, GalleryServiceError>;
}

/// Outcome of [`OtpChallengeRepository::reserve_attempt`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptSlot {
    /// Attempt claimed; carries the new attempt count.
    Reserved(u32),
    /// The challenge already used all of its attempts.
    Exhausted,
    /// The challenge no longer exists.
    Gone,
}

pub trait AlbumRepository: Send + Sync {
    async fn find_by_id(&self, id: AlbumId) -> Result<Option<Album>, GalleryServiceError>;

    async fn list_by_host(&self, host_id: HostId) -> Result<Vec<Album>, GalleryServiceError>;

    /// Albums of `host_id` that have been shared with `email`.
    async fn list_shared_with(
        &self,
        host_id: HostId,
        email: &GuestEmail,
    ) -> Result<Vec<Album>, GalleryServiceError>;
}

pub trait AlbumShareRepository: Send + Sync {
    async fn is_shared(
        &self,
        album_id: AlbumId,
        email: &GuestEmail,
    ) -> Result<bool, GalleryServiceError>;

    async fn list_by_album(&self, album_id: AlbumId)
    -> Result<Vec<AlbumShare>, GalleryServiceError>;

    /// Grant shares, ignoring ones that already exist. Returns the number of new grants.
    async fn grant(
        &self,
        album_id: AlbumId,
        emails: &[GuestEmail],
        granted_at: DateTime<Utc>,
    ) -> Result<u64, GalleryServiceError>;

    /// Revoke a share. Returns `true` if deleted, `false` if not found.
    async fn revoke(
        &self,
        album_id: AlbumId,
        email: &GuestEmail,
    ) -> Result<bool, GalleryServiceError>;
}

/// Content of the verification-code email.
#[derive(Debug, Clone)]
pub struct OtpMessage {
    pub to: GuestEmail,
    pub guest_name: String,
    pub event_name: String,
    pub event_starts_at: DateTime<Utc>,
    pub code: String,
}

/// Outbound email delivery.
pub trait Mailer: Send + Sync {
    async fn send_otp(&self, message: &OtpMessage) -> Result<(), GalleryServiceError>;
}

/// Private object storage holding album photos.
pub trait PhotoStorage: Send + Sync {
    /// List photo objects directly under `prefix`.
    async fn list(&self, prefix: &str) -> Result<Vec<PhotoObject>, GalleryServiceError>;

    /// Mint signed URLs for `paths`, in the same order, valid for `expires_in_secs`.
    async fn sign_urls(
        &self,
        paths: &[String],
        expires_in_secs: u64,
    ) -> Result<Vec<String>, GalleryServiceError>;
}

/// Fixed-window limiter for OTP send requests.
pub trait SendRateLimiter: Send + Sync {
    /// Record one request for `client_key`. Returns `false` once the window's quota is spent.
    async fn allow(&self, client_key: &str) -> Result<bool, GalleryServiceError>;
}
