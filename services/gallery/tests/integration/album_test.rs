use uuid::Uuid;

use utsave_domain::id::{AlbumId, HostId};
use utsave_gallery::domain::types::{Album, Event, SIGNED_URL_TTL_SECS, Viewer};
use utsave_gallery::error::GalleryServiceError;
use utsave_gallery::usecase::album::{ListAlbumsUseCase, ViewAlbumPhotosUseCase};

use crate::helpers::{
    MockAlbumRepo, MockEventRepo, MockShareRepo, MockStorage, ShareStore, email, share,
    share_store, test_album, test_event,
};

const GUEST: &str = "g@x.com";

/// One host with two events. The guest attends `diwali-2025`.
struct Gallery {
    host: HostId,
    diwali: Event,
    holi: Event,
    shared: Album,
    unshared: Album,
    other_event: Album,
    unscoped: Album,
    foreign: Album,
    shares: ShareStore,
}

impl Gallery {
    fn new() -> Self {
        let host = HostId(Uuid::new_v4());
        let diwali = test_event(host, "diwali-2025");
        let holi = test_event(host, "holi-2026");
        let shared = test_album(host, Some(diwali.id), "Rangoli");
        let unshared = test_album(host, Some(diwali.id), "Family Only");
        let other_event = test_album(host, Some(holi.id), "Colours");
        let unscoped = test_album(host, None, "Highlights");
        let foreign = test_album(HostId(Uuid::new_v4()), None, "Elsewhere");
        let shares = share_store(vec![
            share(&shared, GUEST),
            share(&other_event, GUEST),
            share(&unscoped, GUEST),
            share(&foreign, GUEST),
        ]);
        Self {
            host,
            diwali,
            holi,
            shared,
            unshared,
            other_event,
            unscoped,
            foreign,
            shares,
        }
    }

    fn albums(&self) -> Vec<Album> {
        vec![
            self.shared.clone(),
            self.unshared.clone(),
            self.other_event.clone(),
            self.unscoped.clone(),
            self.foreign.clone(),
        ]
    }

    fn guest(&self, event_slug: &str) -> Viewer {
        Viewer::Guest {
            email: email(GUEST),
            event_slug: event_slug.to_owned(),
        }
    }

    fn list_usecase(&self) -> ListAlbumsUseCase<MockEventRepo, MockAlbumRepo> {
        ListAlbumsUseCase {
            events: MockEventRepo::new(vec![self.diwali.clone(), self.holi.clone()]),
            albums: MockAlbumRepo::new(self.albums(), &self.shares),
        }
    }

    fn view_usecase(
        &self,
        storage: MockStorage,
    ) -> ViewAlbumPhotosUseCase<MockEventRepo, MockAlbumRepo, MockShareRepo, MockStorage> {
        ViewAlbumPhotosUseCase {
            events: MockEventRepo::new(vec![self.diwali.clone(), self.holi.clone()]),
            albums: MockAlbumRepo::new(self.albums(), &self.shares),
            shares: MockShareRepo::new(&self.shares),
            storage,
        }
    }
}

// ── ListAlbumsUseCase ────────────────────────────────────────────────────────

#[tokio::test]
async fn should_list_only_shared_albums_of_the_guest_event() {
    let g = Gallery::new();
    let albums = g.list_usecase().execute(&g.guest("diwali-2025")).await.unwrap();
    let ids: Vec<AlbumId> = albums.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![g.shared.id, g.unscoped.id]);
}

#[tokio::test]
async fn should_list_all_albums_for_owning_host() {
    let g = Gallery::new();
    let albums = g
        .list_usecase()
        .execute(&Viewer::Host { host_id: g.host })
        .await
        .unwrap();
    assert_eq!(albums.len(), 4);
    assert!(albums.iter().all(|a| a.host_id == g.host));
}

#[tokio::test]
async fn should_reject_listing_for_unknown_event() {
    let g = Gallery::new();
    let result = g.list_usecase().execute(&g.guest("navratri-2025")).await;
    assert!(matches!(result, Err(GalleryServiceError::EventNotFound)));
}

// ── ViewAlbumPhotosUseCase ───────────────────────────────────────────────────

#[tokio::test]
async fn should_sign_photos_for_verified_guest_with_share() {
    let g = Gallery::new();
    let storage = MockStorage::with_photos(&g.shared, &["diya.jpg", "rangoli.jpg"]);

    let result = g
        .view_usecase(storage)
        .execute(&g.guest("diwali-2025"), g.shared.id)
        .await
        .unwrap();

    assert_eq!(result.album.id, g.shared.id);
    assert_eq!(result.expires_in, SIGNED_URL_TTL_SECS);
    let names: Vec<&str> = result.photos.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["diya.jpg", "rangoli.jpg"]);
    let prefix = g.shared.storage_prefix();
    assert_eq!(
        result.photos[0].url,
        format!("https://signed.test/{prefix}diya.jpg?expires_in=3600")
    );
}

#[tokio::test]
async fn should_forbid_album_not_shared_with_guest() {
    let g = Gallery::new();
    let storage = MockStorage::with_photos(&g.unshared, &["private.jpg"]);
    let listed = storage.listed.clone();

    let result = g
        .view_usecase(storage)
        .execute(&g.guest("diwali-2025"), g.unshared.id)
        .await;
    assert!(matches!(result, Err(GalleryServiceError::Forbidden)));
    assert!(listed.lock().unwrap().is_empty(), "storage must not be touched");
}

#[tokio::test]
async fn should_forbid_album_of_another_event_despite_share() {
    let g = Gallery::new();
    let result = g
        .view_usecase(MockStorage::default())
        .execute(&g.guest("diwali-2025"), g.other_event.id)
        .await;
    assert!(matches!(result, Err(GalleryServiceError::Forbidden)));
}

#[tokio::test]
async fn should_forbid_album_of_another_host_despite_share() {
    let g = Gallery::new();
    let result = g
        .view_usecase(MockStorage::default())
        .execute(&g.guest("diwali-2025"), g.foreign.id)
        .await;
    assert!(matches!(result, Err(GalleryServiceError::Forbidden)));
}

#[tokio::test]
async fn should_allow_unscoped_album_of_same_host() {
    let g = Gallery::new();
    let result = g
        .view_usecase(MockStorage::with_photos(&g.unscoped, &["a.jpg"]))
        .execute(&g.guest("holi-2026"), g.unscoped.id)
        .await
        .unwrap();
    assert_eq!(result.photos.len(), 1);
}

#[tokio::test]
async fn should_return_not_found_for_missing_album() {
    let g = Gallery::new();
    let result = g
        .view_usecase(MockStorage::default())
        .execute(&g.guest("diwali-2025"), AlbumId(Uuid::new_v4()))
        .await;
    assert!(matches!(result, Err(GalleryServiceError::AlbumNotFound)));
}

#[tokio::test]
async fn should_return_event_not_found_for_stale_guest_session() {
    let g = Gallery::new();
    let result = g
        .view_usecase(MockStorage::default())
        .execute(&g.guest("navratri-2025"), g.shared.id)
        .await;
    assert!(matches!(result, Err(GalleryServiceError::EventNotFound)));
}

#[tokio::test]
async fn should_let_owner_view_unshared_album() {
    let g = Gallery::new();
    let result = g
        .view_usecase(MockStorage::with_photos(&g.unshared, &["family.jpg"]))
        .execute(&Viewer::Host { host_id: g.host }, g.unshared.id)
        .await
        .unwrap();
    assert_eq!(result.photos[0].name, "family.jpg");
}

#[tokio::test]
async fn should_forbid_other_host() {
    let g = Gallery::new();
    let intruder = Viewer::Host {
        host_id: HostId(Uuid::new_v4()),
    };
    let result = g
        .view_usecase(MockStorage::default())
        .execute(&intruder, g.shared.id)
        .await;
    assert!(matches!(result, Err(GalleryServiceError::Forbidden)));
}

#[tokio::test]
async fn should_return_empty_photo_list_for_empty_album() {
    let g = Gallery::new();
    let result = g
        .view_usecase(MockStorage::default())
        .execute(&g.guest("diwali-2025"), g.shared.id)
        .await
        .unwrap();
    assert!(result.photos.is_empty());
    assert_eq!(result.expires_in, SIGNED_URL_TTL_SECS);
}
