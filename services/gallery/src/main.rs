use std::time::Duration;

use anyhow::Context as _;
use sea_orm::Database;
use tracing::info;

use utsave_core::tracing::init_tracing;
use utsave_gallery::config::GalleryConfig;
use utsave_gallery::router::build_router;
use utsave_gallery::state::{AppState, MailSettings, StorageSettings};
use utsave_gallery::usecase::otp::OtpHasher;
use utsave_session::token::GuestSessionSigner;

const OUTBOUND_TIMEOUT: Duration = Duration::from_secs(15);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = GalleryConfig::from_env().context("invalid gallery configuration")?;

    let signer = GuestSessionSigner::new(config.guest_session_secret.as_bytes())
        .context("invalid GUEST_SESSION_SECRET")?;
    let otp_hasher = OtpHasher::new(config.guest_session_secret.as_bytes())?;

    let db = Database::connect(&config.database_url)
        .await
        .context("failed to connect to database")?;

    let redis = deadpool_redis::Config::from_url(&config.redis_url)
        .create_pool(Some(deadpool_redis::Runtime::Tokio1))
        .context("failed to create Redis pool")?;

    let http = reqwest::Client::builder()
        .timeout(OUTBOUND_TIMEOUT)
        .build()
        .context("failed to build HTTP client")?;

    let state = AppState {
        db,
        redis,
        http,
        signer,
        otp_hasher,
        storage: StorageSettings {
            base_url: config.storage_url,
            service_key: config.storage_service_key,
            bucket: config.storage_bucket,
        },
        mail: MailSettings {
            api_url: config.mail_api_url,
            api_key: config.mail_api_key,
            from: config.mail_from,
        },
        cookie_secure: config.cookie_secure,
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.gallery_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("gallery service listening on {addr}");
    axum::serve(listener, router).await.context("server error")?;
    Ok(())
}
