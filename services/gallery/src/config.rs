use utsave_session::token::MIN_SECRET_LEN;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("GUEST_SESSION_SECRET must be at least {MIN_SECRET_LEN} bytes")]
    SecretTooShort,
}

/// Gallery service configuration loaded from environment variables.
pub struct GalleryConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Redis connection URL (OTP send limiter).
    pub redis_url: String,
    /// HMAC secret for guest session tokens and OTP digests.
    pub guest_session_secret: String,
    /// Object storage base URL (e.g. "https://xyz.supabase.co").
    pub storage_url: String,
    pub storage_service_key: String,
    /// Private bucket holding album photos.
    pub storage_bucket: String,
    /// Transactional mail API endpoint.
    pub mail_api_url: String,
    pub mail_api_key: String,
    /// Sender address, e.g. "Utsave <no-reply@utsave.app>".
    pub mail_from: String,
    /// TCP port to listen on (default 3120). Env var: `GALLERY_PORT`.
    pub gallery_port: u16,
    /// Set `Secure` on the guest cookie (default true). Env var: `COOKIE_SECURE`.
    pub cookie_secure: bool,
}

const REDACTED: &str = "<redacted>";

// Connection URLs can carry passwords, so they are masked with the keys.
impl std::fmt::Debug for GalleryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GalleryConfig")
            .field("database_url", &REDACTED)
            .field("redis_url", &REDACTED)
            .field("guest_session_secret", &REDACTED)
            .field("storage_url", &self.storage_url)
            .field("storage_service_key", &REDACTED)
            .field("storage_bucket", &self.storage_bucket)
            .field("mail_api_url", &self.mail_api_url)
            .field("mail_api_key", &REDACTED)
            .field("mail_from", &self.mail_from)
            .field("gallery_port", &self.gallery_port)
            .field("cookie_secure", &self.cookie_secure)
            .finish()
    }
}

impl GalleryConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let guest_session_secret = required("GUEST_SESSION_SECRET")?;
        if guest_session_secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::SecretTooShort);
        }

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            redis_url: required("REDIS_URL")?,
            guest_session_secret,
            storage_url: required("STORAGE_URL")?,
            storage_service_key: required("STORAGE_SERVICE_KEY")?,
            storage_bucket: required("STORAGE_BUCKET")?,
            mail_api_url: required("MAIL_API_URL")?,
            mail_api_key: required("MAIL_API_KEY")?,
            mail_from: required("MAIL_FROM")?,
            gallery_port: lookup("GALLERY_PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(3120),
            cookie_secure: lookup("COOKIE_SECURE")
                .map(|v| !matches!(v.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no"))
                .unwrap_or(true),
        })
    }
}
