pub use sea_orm_migration::prelude::*;

mod m20251001_000001_create_events;
mod m20251001_000002_create_guests;
mod m20251001_000003_create_albums;
mod m20251001_000004_create_album_shares;
mod m20251001_000005_create_otp_challenges;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251001_000001_create_events::Migration),
            Box::new(m20251001_000002_create_guests::Migration),
            Box::new(m20251001_000003_create_albums::Migration),
            Box::new(m20251001_000004_create_album_shares::Migration),
            Box::new(m20251001_000005_create_otp_challenges::Migration),
        ]
    }
}
