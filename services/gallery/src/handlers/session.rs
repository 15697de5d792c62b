use axum::{Json, extract::State, http::StatusCode};
use axum_extra::extract::CookieJar;
use serde::Serialize;

use utsave_session::cookie::clear_guest_session_cookie;

use crate::handlers::viewer::GuestSession;
use crate::state::AppState;

// ── GET /gallery/session ──────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct SessionResponse {
    pub email: String,
    pub event_slug: String,
    pub expires_at_ms: i64,
}

pub async fn get_session(GuestSession(claims): GuestSession) -> Json<SessionResponse> {
    Json(SessionResponse {
        expires_at_ms: claims.expires_at_ms(),
        email: claims.email,
        event_slug: claims.event_slug,
    })
}

// ── DELETE /gallery/session ───────────────────────────────────────────────────

pub async fn delete_session(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (StatusCode, CookieJar) {
    (
        StatusCode::NO_CONTENT,
        clear_guest_session_cookie(jar, state.cookie_secure),
    )
}
