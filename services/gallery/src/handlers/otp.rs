use axum::{Json, extract::State, http::HeaderMap};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use utsave_session::cookie::set_guest_session_cookie;

use crate::error::GalleryServiceError;
use crate::state::AppState;
use crate::usecase::otp::{SendOtpInput, SendOtpUseCase, VerifyOtpInput, VerifyOtpUseCase};

/// Client address as seen through the proxy chain.
pub fn client_ip(headers: &HeaderMap) -> String {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };
    header("x-forwarded-for")
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .or_else(|| header("x-real-ip"))
        .unwrap_or("unknown")
        .to_owned()
}

// ── POST /gallery/otp ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendOtpRequest {
    pub email: String,
    pub event_slug: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendOtpResponse {
    pub code_sent: bool,
}

pub async fn send_otp(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<SendOtpRequest>,
) -> Result<Json<SendOtpResponse>, GalleryServiceError> {
    let usecase = SendOtpUseCase {
        events: state.event_repo(),
        guests: state.guest_repo(),
        limiter: state.send_limiter(),
        manager: state.otp_manager(),
    };
    usecase
        .execute(SendOtpInput {
            email: body.email,
            event_slug: body.event_slug,
            client_ip: client_ip(&headers),
        })
        .await?;
    Ok(Json(SendOtpResponse { code_sent: true }))
}

// ── POST /gallery/otp/verify ──────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpRequest {
    pub email: String,
    pub event_slug: String,
    pub code: String,
}

#[derive(Serialize)]
pub struct VerifyOtpResponse {
    pub verified: bool,
}

pub async fn verify_otp(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<VerifyOtpRequest>,
) -> Result<(CookieJar, Json<VerifyOtpResponse>), GalleryServiceError> {
    let usecase = VerifyOtpUseCase {
        events: state.event_repo(),
        manager: state.otp_manager(),
        signer: state.signer.clone(),
    };
    let output = usecase
        .execute(VerifyOtpInput {
            email: body.email,
            event_slug: body.event_slug,
            code: body.code,
        })
        .await?;

    let jar = set_guest_session_cookie(jar, output.session_token, state.cookie_secure);
    Ok((jar, Json(VerifyOtpResponse { verified: true })))
}
