use deadpool_redis::Pool as RedisPool;
use sea_orm::DatabaseConnection;

use utsave_session::token::GuestSessionSigner;

use crate::infra::cache::RedisSendRateLimiter;
use crate::infra::db::{
    DbAlbumRepository, DbAlbumShareRepository, DbEventRepository, DbGuestRepository,
    DbOtpChallengeRepository,
};
use crate::infra::mailer::HttpMailer;
use crate::infra::storage::HttpPhotoStorage;
use crate::usecase::otp::{OtpChallengeManager, OtpHasher};

#[derive(Clone)]
pub struct StorageSettings {
    pub base_url: String,
    pub service_key: String,
    pub bucket: String,
}

#[derive(Clone)]
pub struct MailSettings {
    pub api_url: String,
    pub api_key: String,
    pub from: String,
}

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub redis: RedisPool,
    /// Outbound client for mail and storage APIs.
    pub http: reqwest::Client,
    pub signer: GuestSessionSigner,
    pub otp_hasher: OtpHasher,
    pub storage: StorageSettings,
    pub mail: MailSettings,
    pub cookie_secure: bool,
}

impl AppState {
    pub fn event_repo(&self) -> DbEventRepository {
        DbEventRepository {
            db: self.db.clone(),
        }
    }

    pub fn guest_repo(&self) -> DbGuestRepository {
        DbGuestRepository {
            db: self.db.clone(),
        }
    }

    pub fn otp_challenge_repo(&self) -> DbOtpChallengeRepository {
        DbOtpChallengeRepository {
            db: self.db.clone(),
        }
    }

    pub fn album_repo(&self) -> DbAlbumRepository {
        DbAlbumRepository {
            db: self.db.clone(),
        }
    }

    pub fn album_share_repo(&self) -> DbAlbumShareRepository {
        DbAlbumShareRepository {
            db: self.db.clone(),
        }
    }

    pub fn send_limiter(&self) -> RedisSendRateLimiter {
        RedisSendRateLimiter {
            pool: self.redis.clone(),
        }
    }

    pub fn mailer(&self) -> HttpMailer {
        HttpMailer {
            http: self.http.clone(),
            api_url: self.mail.api_url.clone(),
            api_key: self.mail.api_key.clone(),
            from: self.mail.from.clone(),
        }
    }

    pub fn photo_storage(&self) -> HttpPhotoStorage {
        HttpPhotoStorage {
            http: self.http.clone(),
            base_url: self.storage.base_url.clone(),
            service_key: self.storage.service_key.clone(),
            bucket: self.storage.bucket.clone(),
        }
    }

    pub fn otp_manager(&self) -> OtpChallengeManager<DbOtpChallengeRepository, HttpMailer> {
        OtpChallengeManager {
            challenges: self.otp_challenge_repo(),
            mailer: self.mailer(),
            hasher: self.otp_hasher.clone(),
        }
    }
}
