use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use utsave_domain::attendance::Attendance;
use utsave_domain::email::GuestEmail;
use utsave_domain::id::{AlbumId, ChallengeId, EventId, HostId};
use utsave_gallery::domain::repository::{
    AlbumRepository, AlbumShareRepository, AttemptSlot, EventRepository, GuestRepository,
    Mailer, OtpChallengeRepository, OtpMessage, PhotoStorage, SendRateLimiter,
};
use utsave_gallery::domain::types::{
    Album, AlbumShare, Event, Guest, OTP_SEND_LIMIT, OtpChallenge, PhotoObject,
};
use utsave_gallery::error::GalleryServiceError;
use utsave_gallery::usecase::otp::OtpHasher;
use utsave_testing::auth::TEST_SESSION_SECRET;

pub fn email(raw: &str) -> GuestEmail {
    GuestEmail::parse(raw).unwrap()
}

pub fn test_hasher() -> OtpHasher {
    OtpHasher::new(TEST_SESSION_SECRET).unwrap()
}

pub fn test_event(host_id: HostId, slug: &str) -> Event {
    Event {
        id: EventId(Uuid::new_v4()),
        host_id,
        slug: slug.to_owned(),
        name: "Diwali Celebration".to_owned(),
        starts_at: Utc.with_ymd_and_hms(2025, 10, 20, 18, 30, 0).unwrap(),
    }
}

pub fn test_guest(event: &Event, raw_email: &str, attendance: Attendance) -> Guest {
    Guest {
        event_id: event.id,
        email: email(raw_email),
        name: "Asha".to_owned(),
        attendance,
    }
}

pub fn test_album(host_id: HostId, event_id: Option<EventId>, name: &str) -> Album {
    Album {
        id: AlbumId(Uuid::new_v4()),
        host_id,
        event_id,
        name: name.to_owned(),
        slug: name.to_lowercase().replace(' ', "-"),
        slideshow_enabled: false,
        created_at: Utc::now(),
    }
}

pub fn share(album: &Album, raw_email: &str) -> AlbumShare {
    AlbumShare {
        album_id: album.id,
        email: email(raw_email),
        granted_at: Utc::now(),
    }
}

// ── MockEventRepo ────────────────────────────────────────────────────────────

pub struct MockEventRepo {
    pub events: Vec<Event>,
}

impl MockEventRepo {
    pub fn new(events: Vec<Event>) -> Self {
        Self { events }
    }
}

impl EventRepository for MockEventRepo {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Event>, GalleryServiceError> {
        Ok(self.events.iter().find(|e| e.slug == slug).cloned())
    }
}

// ── MockGuestRepo ────────────────────────────────────────────────────────────

pub struct MockGuestRepo {
    pub guests: Vec<Guest>,
}

impl MockGuestRepo {
    pub fn new(guests: Vec<Guest>) -> Self {
        Self { guests }
    }
}

impl GuestRepository for MockGuestRepo {
    async fn find(
        &self,
        event_id: EventId,
        email: &GuestEmail,
    ) -> Result<Option<Guest>, GalleryServiceError> {
        Ok(self
            .guests
            .iter()
            .find(|g| g.event_id == event_id && g.email == *email)
            .cloned())
    }
}

// ── MockOtpRepo ──────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockOtpRepo {
    pub challenges: Arc<Mutex<Vec<OtpChallenge>>>,
}

impl MockOtpRepo {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns a shared handle to the stored challenges for post-execution inspection.
    pub fn handle(&self) -> Arc<Mutex<Vec<OtpChallenge>>> {
        Arc::clone(&self.challenges)
    }
}

impl OtpChallengeRepository for MockOtpRepo {
    async fn replace(&self, challenge: &OtpChallenge) -> Result<(), GalleryServiceError> {
        let mut challenges = self.challenges.lock().unwrap();
        challenges.retain(|c| !(c.event_id == challenge.event_id && c.email == challenge.email));
        challenges.push(challenge.clone());
        Ok(())
    }

    async fn find(
        &self,
        event_id: EventId,
        email: &GuestEmail,
    ) -> Result<Option<OtpChallenge>, GalleryServiceError> {
        Ok(self
            .challenges
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.event_id == event_id && c.email == *email)
            .cloned())
    }

    async fn delete(&self, id: ChallengeId) -> Result<bool, GalleryServiceError> {
        let mut challenges = self.challenges.lock().unwrap();
        let before = challenges.len();
        challenges.retain(|c| c.id != id);
        Ok(challenges.len() < before)
    }

    async fn reserve_attempt(
        &self,
        id: ChallengeId,
        max: u32,
    ) -> Result<AttemptSlot, GalleryServiceError> {
        let mut challenges = self.challenges.lock().unwrap();
        Ok(match challenges.iter_mut().find(|c| c.id == id) {
            None => AttemptSlot::Gone,
            Some(c) if c.attempts >= max => AttemptSlot::Exhausted,
            Some(c) => {
                c.attempts += 1;
                AttemptSlot::Reserved(c.attempts)
            }
        })
    }
}

/// Challenge store that yields to the scheduler after every lookup, so
/// concurrent verifications interleave between read and write.
#[derive(Clone, Default)]
pub struct YieldingOtpRepo {
    pub inner: MockOtpRepo,
}

impl OtpChallengeRepository for YieldingOtpRepo {
    async fn replace(&self, challenge: &OtpChallenge) -> Result<(), GalleryServiceError> {
        self.inner.replace(challenge).await
    }

    async fn find(
        &self,
        event_id: EventId,
        email: &GuestEmail,
    ) -> Result<Option<OtpChallenge>, GalleryServiceError> {
        let found = self.inner.find(event_id, email).await;
        tokio::task::yield_now().await;
        found
    }

    async fn delete(&self, id: ChallengeId) -> Result<bool, GalleryServiceError> {
        self.inner.delete(id).await
    }

    async fn reserve_attempt(
        &self,
        id: ChallengeId,
        max: u32,
    ) -> Result<AttemptSlot, GalleryServiceError> {
        self.inner.reserve_attempt(id, max).await
    }
}

// ── MockMailer ───────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockMailer {
    pub sent: Arc<Mutex<Vec<OtpMessage>>>,
    pub fail: bool,
}

impl MockMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn handle(&self) -> Arc<Mutex<Vec<OtpMessage>>> {
        Arc::clone(&self.sent)
    }
}

/// Code from the most recent message in a mailer's outbox.
pub fn last_code(sent: &Arc<Mutex<Vec<OtpMessage>>>) -> String {
    sent.lock()
        .unwrap()
        .last()
        .map(|m| m.code.clone())
        .expect("no otp email sent")
}

impl Mailer for MockMailer {
    async fn send_otp(&self, message: &OtpMessage) -> Result<(), GalleryServiceError> {
        if self.fail {
            return Err(GalleryServiceError::DeliveryError);
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

// ── MockLimiter ──────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockLimiter {
    pub counts: Arc<Mutex<HashMap<String, u64>>>,
}

impl SendRateLimiter for MockLimiter {
    async fn allow(&self, client_key: &str) -> Result<bool, GalleryServiceError> {
        let mut counts = self.counts.lock().unwrap();
        let count = counts.entry(client_key.to_owned()).or_insert(0);
        *count += 1;
        Ok(*count <= OTP_SEND_LIMIT)
    }
}

// ── MockAlbumRepo / MockShareRepo ────────────────────────────────────────────

pub type ShareStore = Arc<Mutex<Vec<AlbumShare>>>;

pub fn share_store(shares: Vec<AlbumShare>) -> ShareStore {
    Arc::new(Mutex::new(shares))
}

pub struct MockAlbumRepo {
    pub albums: Vec<Album>,
    pub shares: ShareStore,
}

impl MockAlbumRepo {
    pub fn new(albums: Vec<Album>, shares: &ShareStore) -> Self {
        Self {
            albums,
            shares: Arc::clone(shares),
        }
    }
}

impl AlbumRepository for MockAlbumRepo {
    async fn find_by_id(&self, id: AlbumId) -> Result<Option<Album>, GalleryServiceError> {
        Ok(self.albums.iter().find(|a| a.id == id).cloned())
    }

    async fn list_by_host(&self, host_id: HostId) -> Result<Vec<Album>, GalleryServiceError> {
        Ok(self
            .albums
            .iter()
            .filter(|a| a.host_id == host_id)
            .cloned()
            .collect())
    }

    async fn list_shared_with(
        &self,
        host_id: HostId,
        email: &GuestEmail,
    ) -> Result<Vec<Album>, GalleryServiceError> {
        let shares = self.shares.lock().unwrap();
        Ok(self
            .albums
            .iter()
            .filter(|a| a.host_id == host_id)
            .filter(|a| shares.iter().any(|s| s.album_id == a.id && s.email == *email))
            .cloned()
            .collect())
    }
}

pub struct MockShareRepo {
    pub shares: ShareStore,
}

impl MockShareRepo {
    pub fn new(shares: &ShareStore) -> Self {
        Self {
            shares: Arc::clone(shares),
        }
    }
}

impl AlbumShareRepository for MockShareRepo {
    async fn is_shared(
        &self,
        album_id: AlbumId,
        email: &GuestEmail,
    ) -> Result<bool, GalleryServiceError> {
        Ok(self
            .shares
            .lock()
            .unwrap()
            .iter()
            .any(|s| s.album_id == album_id && s.email == *email))
    }

    async fn list_by_album(
        &self,
        album_id: AlbumId,
    ) -> Result<Vec<AlbumShare>, GalleryServiceError> {
        Ok(self
            .shares
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.album_id == album_id)
            .cloned()
            .collect())
    }

    async fn grant(
        &self,
        album_id: AlbumId,
        emails: &[GuestEmail],
        granted_at: DateTime<Utc>,
    ) -> Result<u64, GalleryServiceError> {
        let mut shares = self.shares.lock().unwrap();
        let mut granted = 0;
        for email in emails {
            if !shares.iter().any(|s| s.album_id == album_id && s.email == *email) {
                shares.push(AlbumShare {
                    album_id,
                    email: email.clone(),
                    granted_at,
                });
                granted += 1;
            }
        }
        Ok(granted)
    }

    async fn revoke(
        &self,
        album_id: AlbumId,
        email: &GuestEmail,
    ) -> Result<bool, GalleryServiceError> {
        let mut shares = self.shares.lock().unwrap();
        let before = shares.len();
        shares.retain(|s| !(s.album_id == album_id && s.email == *email));
        Ok(shares.len() < before)
    }
}

// ── MockStorage ──────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockStorage {
    /// Object names per album prefix.
    pub objects: HashMap<String, Vec<String>>,
    pub listed: Arc<Mutex<Vec<String>>>,
}

impl MockStorage {
    pub fn with_photos(album: &Album, names: &[&str]) -> Self {
        Self {
            objects: HashMap::from([(
                album.storage_prefix(),
                names.iter().map(|n| (*n).to_owned()).collect(),
            )]),
            listed: Arc::default(),
        }
    }
}

impl PhotoStorage for MockStorage {
    async fn list(&self, prefix: &str) -> Result<Vec<PhotoObject>, GalleryServiceError> {
        self.listed.lock().unwrap().push(prefix.to_owned());
        Ok(self
            .objects
            .get(prefix)
            .map(|names| {
                names
                    .iter()
                    .map(|name| PhotoObject {
                        name: name.clone(),
                        path: format!("{prefix}{name}"),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn sign_urls(
        &self,
        paths: &[String],
        expires_in_secs: u64,
    ) -> Result<Vec<String>, GalleryServiceError> {
        Ok(paths
            .iter()
            .map(|p| format!("https://signed.test/{p}?expires_in={expires_in_secs}"))
            .collect())
    }
}
