use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};

use utsave_domain::attendance::Attendance;
use utsave_domain::email::GuestEmail;
use utsave_domain::id::{AlbumId, ChallengeId, EventId, HostId};
use utsave_gallery_schema::{album_shares, albums, events, guests, otp_challenges};

use crate::domain::repository::{
    AlbumRepository, AlbumShareRepository, AttemptSlot, EventRepository, GuestRepository,
    OtpChallengeRepository,
};
use crate::domain::types::{Album, AlbumShare, Event, Guest, OtpChallenge};
use crate::error::GalleryServiceError;

/// Stored emails are written normalized; a row that fails to parse is corrupt.
fn stored_email(raw: String) -> Result<GuestEmail, GalleryServiceError> {
    GuestEmail::parse(&raw)
        .map_err(|_| anyhow::anyhow!("malformed email in database").into())
}

// ── Event / guest repositories ────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbEventRepository {
    pub db: DatabaseConnection,
}

impl EventRepository for DbEventRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Event>, GalleryServiceError> {
        let model = events::Entity::find()
            .filter(events::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .context("find event by slug")?;
        Ok(model.map(event_from_model))
    }
}

fn event_from_model(model: events::Model) -> Event {
    Event {
        id: EventId(model.id),
        host_id: HostId(model.host_id),
        slug: model.slug,
        name: model.name,
        starts_at: model.starts_at,
    }
}

#[derive(Clone)]
pub struct DbGuestRepository {
    pub db: DatabaseConnection,
}

impl GuestRepository for DbGuestRepository {
    async fn find(
        &self,
        event_id: EventId,
        email: &GuestEmail,
    ) -> Result<Option<Guest>, GalleryServiceError> {
        let model = guests::Entity::find()
            .filter(guests::Column::EventId.eq(event_id.0))
            .filter(guests::Column::Email.eq(email.as_str()))
            .one(&self.db)
            .await
            .context("find guest by event and email")?;
        model.map(guest_from_model).transpose()
    }
}

fn guest_from_model(model: guests::Model) -> Result<Guest, GalleryServiceError> {
    Ok(Guest {
        event_id: EventId(model.event_id),
        email: stored_email(model.email)?,
        name: model.name,
        attendance: Attendance::from_db(&model.attendance),
    })
}

// ── OTP challenge repository ──────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbOtpChallengeRepository {
    pub db: DatabaseConnection,
}

impl OtpChallengeRepository for DbOtpChallengeRepository {
    async fn replace(&self, challenge: &OtpChallenge) -> Result<(), GalleryServiceError> {
        let challenge = challenge.clone();
        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                Box::pin(async move {
                    otp_challenges::Entity::delete_many()
                        .filter(otp_challenges::Column::EventId.eq(challenge.event_id.0))
                        .filter(otp_challenges::Column::Email.eq(challenge.email.as_str()))
                        .exec(txn)
                        .await?;
                    otp_challenges::ActiveModel {
                        id: Set(challenge.id.0),
                        event_id: Set(challenge.event_id.0),
                        email: Set(challenge.email.as_str().to_owned()),
                        code_hash: Set(challenge.code_hash.clone()),
                        expires_at: Set(challenge.expires_at),
                        attempts: Set(0),
                        created_at: Set(challenge.created_at),
                    }
                    .insert(txn)
                    .await?;
                    Ok(())
                })
            })
            .await
            .context("replace otp challenge")?;
        Ok(())
    }

    async fn find(
        &self,
        event_id: EventId,
        email: &GuestEmail,
    ) -> Result<Option<OtpChallenge>, GalleryServiceError> {
        let model = otp_challenges::Entity::find()
            .filter(otp_challenges::Column::EventId.eq(event_id.0))
            .filter(otp_challenges::Column::Email.eq(email.as_str()))
            .one(&self.db)
            .await
            .context("find otp challenge")?;
        model.map(challenge_from_model).transpose()
    }

    async fn delete(&self, id: ChallengeId) -> Result<bool, GalleryServiceError> {
        let result = otp_challenges::Entity::delete_by_id(id.0)
            .exec(&self.db)
            .await
            .context("delete otp challenge")?;
        Ok(result.rows_affected > 0)
    }

    async fn reserve_attempt(
        &self,
        id: ChallengeId,
        max: u32,
    ) -> Result<AttemptSlot, GalleryServiceError> {
        let max = i32::try_from(max).unwrap_or(i32::MAX);
        let updated = otp_challenges::Entity::update_many()
            .col_expr(
                otp_challenges::Column::Attempts,
                Expr::col(otp_challenges::Column::Attempts).add(1),
            )
            .filter(otp_challenges::Column::Id.eq(id.0))
            .filter(otp_challenges::Column::Attempts.lt(max))
            .exec_with_returning(&self.db)
            .await
            .context("reserve otp attempt")?;
        if let Some(row) = updated.into_iter().next() {
            return Ok(AttemptSlot::Reserved(u32::try_from(row.attempts).unwrap_or(0)));
        }
        let exists = otp_challenges::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .context("find otp challenge")?
            .is_some();
        Ok(if exists {
            AttemptSlot::Exhausted
        } else {
            AttemptSlot::Gone
        })
    }
}

fn challenge_from_model(model: otp_challenges::Model) -> Result<OtpChallenge, GalleryServiceError> {
    Ok(OtpChallenge {
        id: ChallengeId(model.id),
        event_id: EventId(model.event_id),
        email: stored_email(model.email)?,
        code_hash: model.code_hash,
        expires_at: model.expires_at,
        attempts: u32::try_from(model.attempts).unwrap_or(0),
        created_at: model.created_at,
    })
}

// ── Album repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbAlbumRepository {
    pub db: DatabaseConnection,
}

impl AlbumRepository for DbAlbumRepository {
    async fn find_by_id(&self, id: AlbumId) -> Result<Option<Album>, GalleryServiceError> {
        let model = albums::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .context("find album by id")?;
        Ok(model.map(album_from_model))
    }

    async fn list_by_host(&self, host_id: HostId) -> Result<Vec<Album>, GalleryServiceError> {
        let models = albums::Entity::find()
            .filter(albums::Column::HostId.eq(host_id.0))
            .order_by_asc(albums::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list albums by host")?;
        Ok(models.into_iter().map(album_from_model).collect())
    }

    async fn list_shared_with(
        &self,
        host_id: HostId,
        email: &GuestEmail,
    ) -> Result<Vec<Album>, GalleryServiceError> {
        let models = albums::Entity::find()
            .inner_join(album_shares::Entity)
            .filter(albums::Column::HostId.eq(host_id.0))
            .filter(album_shares::Column::Email.eq(email.as_str()))
            .order_by_asc(albums::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list albums shared with email")?;
        Ok(models.into_iter().map(album_from_model).collect())
    }
}

fn album_from_model(model: albums::Model) -> Album {
    Album {
        id: AlbumId(model.id),
        host_id: HostId(model.host_id),
        event_id: model.event_id.map(EventId),
        name: model.name,
        slug: model.slug,
        slideshow_enabled: model.slideshow_enabled,
        created_at: model.created_at,
    }
}

// ── Album share repository ────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbAlbumShareRepository {
    pub db: DatabaseConnection,
}

impl AlbumShareRepository for DbAlbumShareRepository {
    async fn is_shared(
        &self,
        album_id: AlbumId,
        email: &GuestEmail,
    ) -> Result<bool, GalleryServiceError> {
        let model = album_shares::Entity::find_by_id((album_id.0, email.as_str().to_owned()))
            .one(&self.db)
            .await
            .context("find album share")?;
        Ok(model.is_some())
    }

    async fn list_by_album(
        &self,
        album_id: AlbumId,
    ) -> Result<Vec<AlbumShare>, GalleryServiceError> {
        let models = album_shares::Entity::find()
            .filter(album_shares::Column::AlbumId.eq(album_id.0))
            .order_by_asc(album_shares::Column::GrantedAt)
            .all(&self.db)
            .await
            .context("list album shares")?;
        models.into_iter().map(share_from_model).collect()
    }

    async fn grant(
        &self,
        album_id: AlbumId,
        emails: &[GuestEmail],
        granted_at: DateTime<Utc>,
    ) -> Result<u64, GalleryServiceError> {
        if emails.is_empty() {
            return Ok(0);
        }
        let rows = emails.iter().map(|email| album_shares::ActiveModel {
            album_id: Set(album_id.0),
            email: Set(email.as_str().to_owned()),
            granted_at: Set(granted_at),
        });
        let inserted = album_shares::Entity::insert_many(rows)
            .on_conflict(
                OnConflict::columns([album_shares::Column::AlbumId, album_shares::Column::Email])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .context("grant album shares")?;
        Ok(inserted)
    }

    async fn revoke(
        &self,
        album_id: AlbumId,
        email: &GuestEmail,
    ) -> Result<bool, GalleryServiceError> {
        let result = album_shares::Entity::delete_many()
            .filter(album_shares::Column::AlbumId.eq(album_id.0))
            .filter(album_shares::Column::Email.eq(email.as_str()))
            .exec(&self.db)
            .await
            .context("revoke album share")?;
        Ok(result.rows_affected > 0)
    }
}

fn share_from_model(model: album_shares::Model) -> Result<AlbumShare, GalleryServiceError> {
    Ok(AlbumShare {
        album_id: AlbumId(model.album_id),
        email: stored_email(model.email)?,
        granted_at: model.granted_at,
    })
}
