use axum::{
    Router,
    routing::{delete, get, post},
};
use tower_http::trace::TraceLayer;

use utsave_core::health::healthz;
use utsave_core::middleware::{propagate_request_id_layer, request_id_layer};

use crate::handlers::{
    albums::{album_photos, list_albums},
    health::readyz,
    otp::{send_otp, verify_otp},
    session::{delete_session, get_session},
    shares::{grant_shares, list_shares, revoke_share},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Guest verification
        .route("/gallery/otp", post(send_otp))
        .route("/gallery/otp/verify", post(verify_otp))
        .route("/gallery/session", get(get_session).delete(delete_session))
        // Albums
        .route("/gallery/albums", get(list_albums))
        .route("/gallery/albums/{album_id}/photos", get(album_photos))
        // Shares (host only)
        .route("/albums/{album_id}/shares", get(list_shares).post(grant_shares))
        .route("/albums/{album_id}/shares/{email}", delete(revoke_share))
        .layer(TraceLayer::new_for_http())
        .layer(propagate_request_id_layer())
        .layer(request_id_layer())
        .with_state(state)
}
