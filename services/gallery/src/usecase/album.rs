use utsave_domain::id::AlbumId;

use crate::domain::repository::{
    AlbumRepository, AlbumShareRepository, EventRepository, PhotoStorage,
};
use crate::domain::types::{Album, Event, SIGNED_URL_TTL_SECS, SignedPhoto, Viewer};
use crate::error::GalleryServiceError;

/// Decide whether `viewer` may see `album`.
///
/// `event` is the guest's resolved event (ignored for hosts) and `shared`
/// whether an album share exists for the guest's email.
pub fn authorize(
    viewer: &Viewer,
    event: Option<&Event>,
    album: &Album,
    shared: bool,
) -> Result<(), GalleryServiceError> {
    match viewer {
        Viewer::Host { host_id } => {
            if album.host_id != *host_id {
                return Err(GalleryServiceError::Forbidden);
            }
            Ok(())
        }
        Viewer::Guest { .. } => {
            let event = event.ok_or(GalleryServiceError::Forbidden)?;
            if album.host_id != event.host_id {
                return Err(GalleryServiceError::Forbidden);
            }
            if album.event_id.is_some_and(|id| id != event.id) {
                return Err(GalleryServiceError::Forbidden);
            }
            if !shared {
                return Err(GalleryServiceError::Forbidden);
            }
            Ok(())
        }
    }
}

async fn resolve_guest_event<E: EventRepository>(
    events: &E,
    event_slug: &str,
) -> Result<Event, GalleryServiceError> {
    events
        .find_by_slug(event_slug)
        .await?
        .ok_or(GalleryServiceError::EventNotFound)
}

// ── ListAlbums ───────────────────────────────────────────────────────────────

pub struct ListAlbumsUseCase<E, A>
where
    E: EventRepository,
    A: AlbumRepository,
{
    pub events: E,
    pub albums: A,
}

impl<E, A> ListAlbumsUseCase<E, A>
where
    E: EventRepository,
    A: AlbumRepository,
{
    /// Hosts see all their albums; guests see albums shared with them for their event.
    pub async fn execute(&self, viewer: &Viewer) -> Result<Vec<Album>, GalleryServiceError> {
        match viewer {
            Viewer::Host { host_id } => self.albums.list_by_host(*host_id).await,
            Viewer::Guest { email, event_slug } => {
                let event = resolve_guest_event(&self.events, event_slug).await?;
                let albums = self.albums.list_shared_with(event.host_id, email).await?;
                Ok(albums
                    .into_iter()
                    .filter(|a| a.event_id.is_none_or(|id| id == event.id))
                    .collect())
            }
        }
    }
}

// ── ViewAlbumPhotos ──────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct AlbumPhotos {
    pub album: Album,
    pub photos: Vec<SignedPhoto>,
    pub expires_in: u64,
}

pub struct ViewAlbumPhotosUseCase<E, A, S, P>
where
    E: EventRepository,
    A: AlbumRepository,
    S: AlbumShareRepository,
    P: PhotoStorage,
{
    pub events: E,
    pub albums: A,
    pub shares: S,
    pub storage: P,
}

impl<E, A, S, P> ViewAlbumPhotosUseCase<E, A, S, P>
where
    E: EventRepository,
    A: AlbumRepository,
    S: AlbumShareRepository,
    P: PhotoStorage,
{
    pub async fn execute(
        &self,
        viewer: &Viewer,
        album_id: AlbumId,
    ) -> Result<AlbumPhotos, GalleryServiceError> {
        // 1. Guest context → 404 if the event is gone
        let event = match viewer {
            Viewer::Guest { event_slug, .. } => {
                Some(resolve_guest_event(&self.events, event_slug).await?)
            }
            Viewer::Host { .. } => None,
        };

        // 2. Album → 404
        let album = self
            .albums
            .find_by_id(album_id)
            .await?
            .ok_or(GalleryServiceError::AlbumNotFound)?;

        // 3. Access decision → 403
        let shared = match viewer {
            Viewer::Guest { email, .. } => self.shares.is_shared(album.id, email).await?,
            Viewer::Host { .. } => false,
        };
        authorize(viewer, event.as_ref(), &album, shared)?;

        // 4. List + sign
        let objects = self.storage.list(&album.storage_prefix()).await?;
        let paths: Vec<String> = objects.iter().map(|o| o.path.clone()).collect();
        let urls = if paths.is_empty() {
            Vec::new()
        } else {
            self.storage.sign_urls(&paths, SIGNED_URL_TTL_SECS).await?
        };
        if urls.len() != objects.len() {
            return Err(anyhow::anyhow!(
                "storage signed {} of {} objects",
                urls.len(),
                objects.len()
            )
            .into());
        }

        let photos = objects
            .into_iter()
            .zip(urls)
            .map(|(object, url)| SignedPhoto {
                name: object.name,
                url,
            })
            .collect();

        Ok(AlbumPhotos {
            album,
            photos,
            expires_in: SIGNED_URL_TTL_SECS,
        })
    }
}
