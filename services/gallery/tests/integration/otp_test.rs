use chrono::{Duration, Utc};
use uuid::Uuid;

use utsave_domain::attendance::Attendance;
use utsave_domain::id::{ChallengeId, HostId};
use utsave_gallery::domain::types::{Event, Guest, MAX_OTP_ATTEMPTS, OtpChallenge};
use utsave_gallery::error::GalleryServiceError;
use utsave_gallery::usecase::otp::{
    OtpChallengeManager, SendOtpInput, SendOtpUseCase, VerifyOtpInput, VerifyOtpUseCase,
};
use utsave_testing::auth::test_signer;

use crate::helpers::{
    MockEventRepo, MockGuestRepo, MockLimiter, MockMailer, MockOtpRepo, YieldingOtpRepo, email,
    last_code, test_event, test_guest, test_hasher,
};

const SLUG: &str = "diwali-2025";
const GUEST: &str = "g@x.com";

struct Fixture {
    event: Event,
    guest: Guest,
    otp: MockOtpRepo,
    mailer: MockMailer,
    limiter: MockLimiter,
}

impl Fixture {
    fn new() -> Self {
        let event = test_event(HostId(Uuid::new_v4()), SLUG);
        let guest = test_guest(&event, GUEST, Attendance::Yes);
        Self {
            event,
            guest,
            otp: MockOtpRepo::empty(),
            mailer: MockMailer::new(),
            limiter: MockLimiter::default(),
        }
    }

    fn manager(&self) -> OtpChallengeManager<MockOtpRepo, MockMailer> {
        OtpChallengeManager {
            challenges: self.otp.clone(),
            mailer: self.mailer.clone(),
            hasher: test_hasher(),
        }
    }

    fn send_usecase(
        &self,
    ) -> SendOtpUseCase<MockEventRepo, MockGuestRepo, MockLimiter, MockOtpRepo, MockMailer> {
        SendOtpUseCase {
            events: MockEventRepo::new(vec![self.event.clone()]),
            guests: MockGuestRepo::new(vec![self.guest.clone()]),
            limiter: self.limiter.clone(),
            manager: self.manager(),
        }
    }

    fn verify_usecase(&self) -> VerifyOtpUseCase<MockEventRepo, MockOtpRepo, MockMailer> {
        VerifyOtpUseCase {
            events: MockEventRepo::new(vec![self.event.clone()]),
            manager: self.manager(),
            signer: test_signer(),
        }
    }

    async fn send(&self) -> Result<(), GalleryServiceError> {
        self.send_from("203.0.113.7").await
    }

    async fn send_from(&self, ip: &str) -> Result<(), GalleryServiceError> {
        self.send_usecase()
            .execute(SendOtpInput {
                email: GUEST.to_owned(),
                event_slug: SLUG.to_owned(),
                client_ip: ip.to_owned(),
            })
            .await
    }

    async fn verify(&self, code: &str) -> Result<String, GalleryServiceError> {
        self.verify_usecase()
            .execute(VerifyOtpInput {
                email: GUEST.to_owned(),
                event_slug: SLUG.to_owned(),
                code: code.to_owned(),
            })
            .await
            .map(|out| out.session_token)
    }

    fn stored(&self) -> Vec<OtpChallenge> {
        self.otp.handle().lock().unwrap().clone()
    }
}

fn wrong_code(code: &str) -> String {
    if code == "000000" {
        "000001".to_owned()
    } else {
        "000000".to_owned()
    }
}

// ── SendOtpUseCase ───────────────────────────────────────────────────────────

#[tokio::test]
async fn should_send_code_to_attending_guest() {
    let fx = Fixture::new();
    fx.send().await.unwrap();

    let sent = fx.mailer.handle();
    let sent = sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, email(GUEST));
    assert_eq!(sent[0].event_name, "Diwali Celebration");
    assert_eq!(sent[0].code.len(), 6);

    let stored = fx.stored();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].attempts, 0);
    assert_ne!(stored[0].code_hash, sent[0].code);
    let ttl = stored[0].expires_at - stored[0].created_at;
    assert_eq!(ttl, Duration::minutes(10));
}

#[tokio::test]
async fn should_normalize_email_before_lookup() {
    let fx = Fixture::new();
    fx.send_usecase()
        .execute(SendOtpInput {
            email: "  G@X.COM ".to_owned(),
            event_slug: SLUG.to_owned(),
            client_ip: "203.0.113.7".to_owned(),
        })
        .await
        .unwrap();
    assert_eq!(fx.stored()[0].email, email(GUEST));
}

#[tokio::test]
async fn should_reject_unknown_event() {
    let fx = Fixture::new();
    let result = fx
        .send_usecase()
        .execute(SendOtpInput {
            email: GUEST.to_owned(),
            event_slug: "holi-2026".to_owned(),
            client_ip: "203.0.113.7".to_owned(),
        })
        .await;
    assert!(matches!(result, Err(GalleryServiceError::EventNotFound)));
}

#[tokio::test]
async fn should_reject_guest_not_attending() {
    for attendance in [Attendance::No, Attendance::Maybe, Attendance::Pending] {
        let mut fx = Fixture::new();
        fx.guest = test_guest(&fx.event, GUEST, attendance);
        let result = fx.send().await;
        assert!(
            matches!(result, Err(GalleryServiceError::NotEligible)),
            "{attendance:?} got {result:?}"
        );
        assert!(fx.stored().is_empty());
    }
}

#[tokio::test]
async fn should_reject_email_not_on_guest_list() {
    let fx = Fixture::new();
    let result = fx
        .send_usecase()
        .execute(SendOtpInput {
            email: "stranger@x.com".to_owned(),
            event_slug: SLUG.to_owned(),
            client_ip: "203.0.113.7".to_owned(),
        })
        .await;
    assert!(matches!(result, Err(GalleryServiceError::NotEligible)));
}

#[tokio::test]
async fn should_reject_malformed_email() {
    let fx = Fixture::new();
    let result = fx
        .send_usecase()
        .execute(SendOtpInput {
            email: "not-an-email".to_owned(),
            event_slug: SLUG.to_owned(),
            client_ip: "203.0.113.7".to_owned(),
        })
        .await;
    assert!(matches!(result, Err(GalleryServiceError::InvalidEmail)));
}

#[tokio::test]
async fn should_roll_back_challenge_when_delivery_fails() {
    let mut fx = Fixture::new();
    fx.mailer = MockMailer::failing();
    let result = fx.send().await;
    assert!(matches!(result, Err(GalleryServiceError::DeliveryError)));
    assert!(fx.stored().is_empty(), "challenge must not outlive failed delivery");
}

#[tokio::test]
async fn should_limit_sends_per_client_ip() {
    let fx = Fixture::new();
    for _ in 0..5 {
        fx.send().await.unwrap();
    }
    let result = fx.send().await;
    assert!(matches!(result, Err(GalleryServiceError::TooManyRequests)));
    // Other clients are unaffected.
    fx.send_from("198.51.100.4").await.unwrap();
}

#[tokio::test]
async fn should_invalidate_previous_code_on_resend() {
    let fx = Fixture::new();
    fx.send().await.unwrap();
    let first = last_code(&fx.mailer.handle());
    fx.send().await.unwrap();
    let second = last_code(&fx.mailer.handle());
    assert_eq!(fx.stored().len(), 1);

    if first != second {
        let result = fx.verify(&first).await;
        assert!(matches!(result, Err(GalleryServiceError::Invalid { .. })));
    }
    fx.verify(&second).await.unwrap();
}

// ── VerifyOtpUseCase ─────────────────────────────────────────────────────────

#[tokio::test]
async fn should_issue_session_for_correct_code() {
    let fx = Fixture::new();
    fx.send().await.unwrap();
    let code = last_code(&fx.mailer.handle());

    let token = fx.verify(&code).await.unwrap();
    let claims = test_signer().verify(&token, Some(SLUG)).unwrap();
    assert_eq!(claims.email, GUEST);
    assert_eq!(claims.event_slug, SLUG);
    assert!(fx.stored().is_empty(), "challenge is consumed on success");
}

#[tokio::test]
async fn should_accept_code_only_once() {
    let fx = Fixture::new();
    fx.send().await.unwrap();
    let code = last_code(&fx.mailer.handle());
    fx.verify(&code).await.unwrap();

    let result = fx.verify(&code).await;
    assert!(matches!(result, Err(GalleryServiceError::ChallengeNotFound)));
}

#[tokio::test]
async fn should_report_remaining_attempts_on_wrong_code() {
    let fx = Fixture::new();
    fx.send().await.unwrap();
    let code = last_code(&fx.mailer.handle());

    for expected in (0..MAX_OTP_ATTEMPTS).rev() {
        let result = fx.verify(&wrong_code(&code)).await;
        match result {
            Err(GalleryServiceError::Invalid { remaining_attempts }) => {
                assert_eq!(remaining_attempts, expected)
            }
            other => panic!("expected Invalid, got {other:?}"),
        }
    }
    assert_eq!(fx.stored()[0].attempts, MAX_OTP_ATTEMPTS);
}

#[tokio::test]
async fn should_lock_out_after_five_failures_even_with_correct_code() {
    let fx = Fixture::new();
    fx.send().await.unwrap();
    let code = last_code(&fx.mailer.handle());
    for _ in 0..MAX_OTP_ATTEMPTS {
        let _ = fx.verify(&wrong_code(&code)).await;
    }

    let result = fx.verify(&code).await;
    assert!(matches!(result, Err(GalleryServiceError::RateLimited)));
    assert!(fx.stored().is_empty(), "locked challenge is deleted");
}

#[tokio::test]
async fn should_cap_concurrent_guesses_at_attempt_limit() {
    let fx = Fixture::new();
    let repo = YieldingOtpRepo::default();
    let guest_email = email(GUEST);
    let now = Utc::now();
    repo.inner.handle().lock().unwrap().push(OtpChallenge {
        id: ChallengeId(Uuid::new_v4()),
        event_id: fx.event.id,
        email: guest_email.clone(),
        code_hash: test_hasher().digest(fx.event.id, &guest_email, "123456"),
        expires_at: now + Duration::minutes(10),
        attempts: 0,
        created_at: now,
    });
    let manager = OtpChallengeManager {
        challenges: repo.clone(),
        mailer: MockMailer::new(),
        hasher: test_hasher(),
    };
    let guess = |code: &'static str| manager.verify(fx.event.id, &guest_email, code);

    let (r0, r1, r2, r3, r4, r5, r6, r7, r8, r9) = tokio::join!(
        guess("000000"),
        guess("000001"),
        guess("000002"),
        guess("000003"),
        guess("000004"),
        guess("000005"),
        guess("000006"),
        guess("000007"),
        guess("000008"),
        guess("000009"),
    );
    let results = [r0, r1, r2, r3, r4, r5, r6, r7, r8, r9];

    let compared = results
        .iter()
        .filter(|r| matches!(r, Err(GalleryServiceError::Invalid { .. })))
        .count();
    assert_eq!(compared, MAX_OTP_ATTEMPTS as usize, "results: {results:?}");
    assert!(results.iter().all(|r| matches!(
        r,
        Err(GalleryServiceError::Invalid { .. }
            | GalleryServiceError::RateLimited
            | GalleryServiceError::ChallengeNotFound)
    )));
    assert!(
        results
            .iter()
            .any(|r| matches!(r, Err(GalleryServiceError::RateLimited)))
    );
    assert!(repo.inner.handle().lock().unwrap().is_empty(), "exhausted challenge is deleted");
}

#[tokio::test]
async fn should_count_malformed_code_as_attempt() {
    let fx = Fixture::new();
    fx.send().await.unwrap();

    let result = fx.verify("12ab").await;
    assert!(matches!(
        result,
        Err(GalleryServiceError::Invalid {
            remaining_attempts: 4
        })
    ));
    assert_eq!(fx.stored()[0].attempts, 1);
}

#[tokio::test]
async fn should_reject_and_delete_expired_challenge() {
    let fx = Fixture::new();
    let created_at = Utc::now() - Duration::minutes(11);
    let challenge = OtpChallenge {
        id: ChallengeId(Uuid::new_v4()),
        event_id: fx.event.id,
        email: email(GUEST),
        code_hash: test_hasher().digest(fx.event.id, &email(GUEST), "123456"),
        expires_at: created_at + Duration::minutes(10),
        attempts: 0,
        created_at,
    };
    fx.otp.handle().lock().unwrap().push(challenge);

    let result = fx.verify("123456").await;
    assert!(matches!(result, Err(GalleryServiceError::Expired)));
    assert!(fx.stored().is_empty());
}

#[tokio::test]
async fn should_reject_verify_without_pending_challenge() {
    let fx = Fixture::new();
    let result = fx.verify("123456").await;
    assert!(matches!(result, Err(GalleryServiceError::ChallengeNotFound)));
}

#[tokio::test]
async fn should_not_accept_code_issued_for_another_event() {
    let fx = Fixture::new();
    let other = test_event(fx.event.host_id, "holi-2026");
    let challenge = OtpChallenge {
        id: ChallengeId(Uuid::new_v4()),
        event_id: fx.event.id,
        email: email(GUEST),
        // Digest bound to a different event id.
        code_hash: test_hasher().digest(other.id, &email(GUEST), "123456"),
        expires_at: Utc::now() + Duration::minutes(10),
        attempts: 0,
        created_at: Utc::now(),
    };
    fx.otp.handle().lock().unwrap().push(challenge);

    let result = fx.verify("123456").await;
    assert!(matches!(result, Err(GalleryServiceError::Invalid { .. })));
}
