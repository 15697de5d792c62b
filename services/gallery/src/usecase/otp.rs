use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use rand::RngExt;
use sha2::Sha256;
use uuid::Uuid;

use utsave_domain::email::GuestEmail;
use utsave_domain::id::{ChallengeId, EventId};
use utsave_session::token::GuestSessionSigner;

use crate::domain::repository::{
    AttemptSlot, EventRepository, GuestRepository, Mailer, OtpChallengeRepository, OtpMessage,
    SendRateLimiter,
};
use crate::domain::types::{
    Event, Guest, MAX_OTP_ATTEMPTS, OTP_CODE_LEN, OTP_TTL_SECS, OtpChallenge,
};
use crate::error::GalleryServiceError;

type HmacSha256 = Hmac<Sha256>;

fn generate_code() -> String {
    let mut rng = rand::rng();
    format!("{:0width$}", rng.random_range(0..1_000_000u32), width = OTP_CODE_LEN)
}

fn is_well_formed_code(code: &str) -> bool {
    code.len() == OTP_CODE_LEN && code.bytes().all(|b| b.is_ascii_digit())
}

/// Keyed one-way digest of OTP codes.
///
/// The digest binds the code to its (event, email) pair, so a stored hash is
/// useless for any other challenge.
#[derive(Clone)]
pub struct OtpHasher {
    mac: HmacSha256,
}

impl OtpHasher {
    pub fn new(secret: &[u8]) -> Result<Self, GalleryServiceError> {
        let mac = HmacSha256::new_from_slice(secret)
            .map_err(|e| GalleryServiceError::Internal(anyhow::anyhow!("otp hasher key: {e}")))?;
        Ok(Self { mac })
    }

    fn keyed(&self, event_id: EventId, email: &GuestEmail, code: &str) -> HmacSha256 {
        let mut mac = self.mac.clone();
        mac.update(format!("otp:{event_id}:{email}:{code}").as_bytes());
        mac
    }

    pub fn digest(&self, event_id: EventId, email: &GuestEmail, code: &str) -> String {
        URL_SAFE_NO_PAD.encode(self.keyed(event_id, email, code).finalize().into_bytes())
    }

    /// Constant-time check of `code` against a stored digest.
    pub fn matches(&self, stored: &str, event_id: EventId, email: &GuestEmail, code: &str) -> bool {
        let Ok(expected) = URL_SAFE_NO_PAD.decode(stored) else {
            return false;
        };
        self.keyed(event_id, email, code)
            .verify_slice(&expected)
            .is_ok()
    }
}

// ── Challenge manager ────────────────────────────────────────────────────────

pub struct OtpChallengeManager<R, M>
where
    R: OtpChallengeRepository,
    M: Mailer,
{
    pub challenges: R,
    pub mailer: M,
    pub hasher: OtpHasher,
}

impl<R, M> OtpChallengeManager<R, M>
where
    R: OtpChallengeRepository,
    M: Mailer,
{
    /// Create a fresh challenge for `guest`, replacing any earlier one, and email the code.
    ///
    /// If delivery fails the new challenge is deleted again before returning
    /// `DeliveryError`.
    pub async fn issue(
        &self,
        event: &Event,
        guest: &Guest,
    ) -> Result<ChallengeId, GalleryServiceError> {
        let code = generate_code();
        let now = Utc::now();
        let challenge = OtpChallenge {
            id: ChallengeId(Uuid::new_v4()),
            event_id: event.id,
            email: guest.email.clone(),
            code_hash: self.hasher.digest(event.id, &guest.email, &code),
            expires_at: now + Duration::seconds(OTP_TTL_SECS),
            attempts: 0,
            created_at: now,
        };
        self.challenges.replace(&challenge).await?;

        let message = OtpMessage {
            to: guest.email.clone(),
            guest_name: guest.name.clone(),
            event_name: event.name.clone(),
            event_starts_at: event.starts_at,
            code,
        };
        if let Err(send_err) = self.mailer.send_otp(&message).await {
            let rolled_back = self.challenges.delete(challenge.id).await;
            match rolled_back {
                Ok(_) => tracing::warn!(
                    error = %send_err,
                    challenge_id = %challenge.id,
                    event_id = %event.id,
                    "otp delivery failed, challenge rolled back"
                ),
                Err(rollback_err) => tracing::error!(
                    error = %send_err,
                    rollback_error = %rollback_err,
                    challenge_id = %challenge.id,
                    event_id = %event.id,
                    "otp delivery failed and challenge rollback failed"
                ),
            }
            return Err(GalleryServiceError::DeliveryError);
        }

        tracing::info!(challenge_id = %challenge.id, event_id = %event.id, "otp challenge issued");
        Ok(challenge.id)
    }

    /// Check `submitted` against the live challenge for (event, email).
    ///
    /// Success consumes the challenge. Expired and locked challenges are deleted on sight.
    pub async fn verify(
        &self,
        event_id: EventId,
        email: &GuestEmail,
        submitted: &str,
    ) -> Result<(), GalleryServiceError> {
        let challenge = self
            .challenges
            .find(event_id, email)
            .await?
            .ok_or(GalleryServiceError::ChallengeNotFound)?;

        if challenge.is_expired_at(Utc::now()) {
            self.challenges.delete(challenge.id).await?;
            return Err(GalleryServiceError::Expired);
        }

        // The slot is claimed before the code is compared, so concurrent guesses
        // cannot get past the attempt cap.
        let attempts = if challenge.is_locked() {
            AttemptSlot::Exhausted
        } else {
            self.challenges
                .reserve_attempt(challenge.id, MAX_OTP_ATTEMPTS)
                .await?
        };
        let attempts = match attempts {
            AttemptSlot::Reserved(attempts) => attempts,
            AttemptSlot::Exhausted => {
                self.challenges.delete(challenge.id).await?;
                tracing::info!(challenge_id = %challenge.id, %event_id, "otp challenge locked out");
                return Err(GalleryServiceError::RateLimited);
            }
            AttemptSlot::Gone => return Err(GalleryServiceError::ChallengeNotFound),
        };

        let code = submitted.trim();
        let matched = is_well_formed_code(code)
            && self
                .hasher
                .matches(&challenge.code_hash, event_id, email, code);

        if !matched {
            return Err(GalleryServiceError::Invalid {
                remaining_attempts: MAX_OTP_ATTEMPTS.saturating_sub(attempts),
            });
        }

        // Only the request that actually removes the row wins a concurrent race.
        if !self.challenges.delete(challenge.id).await? {
            return Err(GalleryServiceError::ChallengeNotFound);
        }
        tracing::info!(challenge_id = %challenge.id, %event_id, "otp challenge verified");
        Ok(())
    }
}

// ── SendOtp ──────────────────────────────────────────────────────────────────

pub struct SendOtpInput {
    pub email: String,
    pub event_slug: String,
    pub client_ip: String,
}

pub struct SendOtpUseCase<E, G, L, R, M>
where
    E: EventRepository,
    G: GuestRepository,
    L: SendRateLimiter,
    R: OtpChallengeRepository,
    M: Mailer,
{
    pub events: E,
    pub guests: G,
    pub limiter: L,
    pub manager: OtpChallengeManager<R, M>,
}

impl<E, G, L, R, M> SendOtpUseCase<E, G, L, R, M>
where
    E: EventRepository,
    G: GuestRepository,
    L: SendRateLimiter,
    R: OtpChallengeRepository,
    M: Mailer,
{
    pub async fn execute(&self, input: SendOtpInput) -> Result<(), GalleryServiceError> {
        // 1. Per-IP send quota → 429
        if !self.limiter.allow(&input.client_ip).await? {
            return Err(GalleryServiceError::TooManyRequests);
        }

        // 2. Resolve event → 404
        let email = GuestEmail::parse(&input.email)?;
        let event = self
            .events
            .find_by_slug(&input.event_slug)
            .await?
            .ok_or(GalleryServiceError::EventNotFound)?;

        // 3. Guest must have RSVP'd yes → 403
        let guest = self
            .guests
            .find(event.id, &email)
            .await?
            .filter(|g| g.attendance.is_attending())
            .ok_or(GalleryServiceError::NotEligible)?;

        // 4. Issue + deliver
        self.manager.issue(&event, &guest).await?;
        Ok(())
    }
}

// ── VerifyOtp ────────────────────────────────────────────────────────────────

pub struct VerifyOtpInput {
    pub email: String,
    pub event_slug: String,
    pub code: String,
}

#[derive(Debug)]
pub struct VerifyOtpOutput {
    pub session_token: String,
    pub email: GuestEmail,
    pub event_slug: String,
}

pub struct VerifyOtpUseCase<E, R, M>
where
    E: EventRepository,
    R: OtpChallengeRepository,
    M: Mailer,
{
    pub events: E,
    pub manager: OtpChallengeManager<R, M>,
    pub signer: GuestSessionSigner,
}

impl<E, R, M> VerifyOtpUseCase<E, R, M>
where
    E: EventRepository,
    R: OtpChallengeRepository,
    M: Mailer,
{
    pub async fn execute(
        &self,
        input: VerifyOtpInput,
    ) -> Result<VerifyOtpOutput, GalleryServiceError> {
        let email = GuestEmail::parse(&input.email)?;
        let event = self
            .events
            .find_by_slug(&input.event_slug)
            .await?
            .ok_or(GalleryServiceError::EventNotFound)?;

        self.manager.verify(event.id, &email, &input.code).await?;

        let session_token = self
            .signer
            .issue(email.as_str(), &event.slug)
            .map_err(|e| GalleryServiceError::Internal(e.into()))?;

        Ok(VerifyOtpOutput {
            session_token,
            email,
            event_slug: event.slug,
        })
    }
}
