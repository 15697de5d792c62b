use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(albums_table()).await?;

        manager
            .create_index(
                Index::create()
                    .table(Albums::Table)
                    .col(Albums::HostId)
                    .col(Albums::Slug)
                    .unique()
                    .name("uq_albums_host_id_slug")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Albums::Table).to_owned())
            .await
    }
}

/// Albums belong to their event and go with it.
fn albums_table() -> TableCreateStatement {
    Table::create()
        .table(Albums::Table)
        .if_not_exists()
        .col(ColumnDef::new(Albums::Id).uuid().not_null().primary_key())
        .col(ColumnDef::new(Albums::HostId).uuid().not_null())
        .col(ColumnDef::new(Albums::EventId).uuid())
        .col(ColumnDef::new(Albums::Name).string().not_null())
        .col(ColumnDef::new(Albums::Slug).string().not_null())
        .col(
            ColumnDef::new(Albums::SlideshowEnabled)
                .boolean()
                .not_null()
                .default(false),
        )
        .col(
            ColumnDef::new(Albums::CreatedAt)
                .timestamp_with_time_zone()
                .not_null(),
        )
        .foreign_key(
            ForeignKey::create()
                .from(Albums::Table, Albums::EventId)
                .to(Events::Table, Events::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

#[derive(Iden)]
enum Albums {
    Table,
    Id,
    HostId,
    EventId,
    Name,
    Slug,
    SlideshowEnabled,
    CreatedAt,
}

#[derive(Iden)]
enum Events {
    Table,
    Id,
}
