use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use utsave_core::serde::to_rfc3339_ms;
use utsave_domain::id::AlbumId;

use crate::error::GalleryServiceError;
use crate::handlers::viewer::HostOwner;
use crate::state::AppState;
use crate::usecase::share::{
    GrantSharesInput, GrantSharesUseCase, ListSharesUseCase, RevokeShareUseCase,
};

// ── GET /albums/{album_id}/shares ─────────────────────────────────────────────

#[derive(Serialize)]
pub struct ShareResponse {
    pub email: String,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub granted_at: DateTime<Utc>,
}

pub async fn list_shares(
    State(state): State<AppState>,
    HostOwner(host_id): HostOwner,
    Path(album_id): Path<AlbumId>,
) -> Result<Json<Vec<ShareResponse>>, GalleryServiceError> {
    let usecase = ListSharesUseCase {
        albums: state.album_repo(),
        shares: state.album_share_repo(),
    };
    let shares = usecase.execute(host_id, album_id).await?;
    Ok(Json(
        shares
            .into_iter()
            .map(|s| ShareResponse {
                email: s.email.into_inner(),
                granted_at: s.granted_at,
            })
            .collect(),
    ))
}

// ── POST /albums/{album_id}/shares ────────────────────────────────────────────

#[derive(Deserialize)]
pub struct GrantSharesRequest {
    pub emails: Vec<String>,
}

#[derive(Serialize)]
pub struct GrantSharesResponse {
    pub granted: u64,
}

pub async fn grant_shares(
    State(state): State<AppState>,
    HostOwner(host_id): HostOwner,
    Path(album_id): Path<AlbumId>,
    Json(body): Json<GrantSharesRequest>,
) -> Result<Json<GrantSharesResponse>, GalleryServiceError> {
    let usecase = GrantSharesUseCase {
        albums: state.album_repo(),
        shares: state.album_share_repo(),
    };
    let granted = usecase
        .execute(
            host_id,
            album_id,
            GrantSharesInput {
                emails: body.emails,
            },
        )
        .await?;
    Ok(Json(GrantSharesResponse { granted }))
}

// ── DELETE /albums/{album_id}/shares/{email} ──────────────────────────────────

pub async fn revoke_share(
    State(state): State<AppState>,
    HostOwner(host_id): HostOwner,
    Path((album_id, email)): Path<(AlbumId, String)>,
) -> Result<StatusCode, GalleryServiceError> {
    let usecase = RevokeShareUseCase {
        albums: state.album_repo(),
        shares: state.album_share_repo(),
    };
    usecase.execute(host_id, album_id, &email).await?;
    Ok(StatusCode::NO_CONTENT)
}
