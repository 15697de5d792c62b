use chrono::Utc;

use utsave_domain::email::GuestEmail;
use utsave_domain::id::{AlbumId, HostId};

use crate::domain::repository::{AlbumRepository, AlbumShareRepository};
use crate::domain::types::{Album, AlbumShare};
use crate::error::GalleryServiceError;

/// Maximum emails accepted in a single grant request.
pub const MAX_GRANT_BATCH: usize = 500;

/// Load `album_id` and require that `host_id` owns it (404, then 403).
async fn owned_album<A: AlbumRepository>(
    albums: &A,
    host_id: HostId,
    album_id: AlbumId,
) -> Result<Album, GalleryServiceError> {
    let album = albums
        .find_by_id(album_id)
        .await?
        .ok_or(GalleryServiceError::AlbumNotFound)?;
    if album.host_id != host_id {
        return Err(GalleryServiceError::Forbidden);
    }
    Ok(album)
}

// ── ListShares ───────────────────────────────────────────────────────────────

pub struct ListSharesUseCase<A: AlbumRepository, S: AlbumShareRepository> {
    pub albums: A,
    pub shares: S,
}

impl<A: AlbumRepository, S: AlbumShareRepository> ListSharesUseCase<A, S> {
    pub async fn execute(
        &self,
        host_id: HostId,
        album_id: AlbumId,
    ) -> Result<Vec<AlbumShare>, GalleryServiceError> {
        let album = owned_album(&self.albums, host_id, album_id).await?;
        self.shares.list_by_album(album.id).await
    }
}

// ── GrantShares ──────────────────────────────────────────────────────────────

pub struct GrantSharesInput {
    pub emails: Vec<String>,
}

pub struct GrantSharesUseCase<A: AlbumRepository, S: AlbumShareRepository> {
    pub albums: A,
    pub shares: S,
}

impl<A: AlbumRepository, S: AlbumShareRepository> GrantSharesUseCase<A, S> {
    /// Share `album_id` with every listed email. Existing grants are left as is.
    /// Returns the number of newly created shares.
    pub async fn execute(
        &self,
        host_id: HostId,
        album_id: AlbumId,
        input: GrantSharesInput,
    ) -> Result<u64, GalleryServiceError> {
        let album = owned_album(&self.albums, host_id, album_id).await?;

        if input.emails.is_empty() || input.emails.len() > MAX_GRANT_BATCH {
            return Err(GalleryServiceError::InvalidEmail);
        }
        let mut emails = input
            .emails
            .iter()
            .map(|raw| GuestEmail::parse(raw))
            .collect::<Result<Vec<_>, _>>()?;
        emails.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        emails.dedup();

        let granted = self.shares.grant(album.id, &emails, Utc::now()).await?;
        tracing::info!(album_id = %album.id, granted, requested = emails.len(), "album shares granted");
        Ok(granted)
    }
}

// ── RevokeShare ──────────────────────────────────────────────────────────────

pub struct RevokeShareUseCase<A: AlbumRepository, S: AlbumShareRepository> {
    pub albums: A,
    pub shares: S,
}

impl<A: AlbumRepository, S: AlbumShareRepository> RevokeShareUseCase<A, S> {
    pub async fn execute(
        &self,
        host_id: HostId,
        album_id: AlbumId,
        email: &str,
    ) -> Result<(), GalleryServiceError> {
        let album = owned_album(&self.albums, host_id, album_id).await?;
        let email = GuestEmail::parse(email)?;
        if !self.shares.revoke(album.id, &email).await? {
            return Err(GalleryServiceError::ShareNotFound);
        }
        tracing::info!(album_id = %album.id, "album share revoked");
        Ok(())
    }
}
