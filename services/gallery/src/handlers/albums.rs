use axum::{
    Json,
    extract::{Path, State},
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use utsave_core::serde::to_rfc3339_ms;
use utsave_domain::id::{AlbumId, EventId};

use crate::domain::types::{Album, Viewer};
use crate::error::GalleryServiceError;
use crate::state::AppState;
use crate::usecase::album::{ListAlbumsUseCase, ViewAlbumPhotosUseCase};

#[derive(Serialize)]
pub struct AlbumResponse {
    pub id: AlbumId,
    pub name: String,
    pub slug: String,
    pub event_id: Option<EventId>,
    pub slideshow_enabled: bool,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
}

impl From<Album> for AlbumResponse {
    fn from(album: Album) -> Self {
        Self {
            id: album.id,
            name: album.name,
            slug: album.slug,
            event_id: album.event_id,
            slideshow_enabled: album.slideshow_enabled,
            created_at: album.created_at,
        }
    }
}

// ── GET /gallery/albums ───────────────────────────────────────────────────────

pub async fn list_albums(
    State(state): State<AppState>,
    viewer: Viewer,
) -> Result<Json<Vec<AlbumResponse>>, GalleryServiceError> {
    let usecase = ListAlbumsUseCase {
        events: state.event_repo(),
        albums: state.album_repo(),
    };
    let albums = usecase.execute(&viewer).await?;
    Ok(Json(albums.into_iter().map(AlbumResponse::from).collect()))
}

// ── GET /gallery/albums/{album_id}/photos ─────────────────────────────────────

#[derive(Serialize)]
pub struct PhotoResponse {
    pub name: String,
    pub url: String,
}

#[derive(Serialize)]
pub struct AlbumPhotosResponse {
    pub album: AlbumResponse,
    pub photos: Vec<PhotoResponse>,
    /// Signed URL lifetime in seconds.
    pub expires_in: u64,
}

pub async fn album_photos(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(album_id): Path<AlbumId>,
) -> Result<Json<AlbumPhotosResponse>, GalleryServiceError> {
    let usecase = ViewAlbumPhotosUseCase {
        events: state.event_repo(),
        albums: state.album_repo(),
        shares: state.album_share_repo(),
        storage: state.photo_storage(),
    };
    let result = usecase.execute(&viewer, album_id).await?;
    Ok(Json(AlbumPhotosResponse {
        album: result.album.into(),
        photos: result
            .photos
            .into_iter()
            .map(|p| PhotoResponse {
                name: p.name,
                url: p.url,
            })
            .collect(),
        expires_in: result.expires_in,
    }))
}
