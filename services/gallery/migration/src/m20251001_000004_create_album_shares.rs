use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AlbumShares::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AlbumShares::AlbumId).uuid().not_null())
                    .col(ColumnDef::new(AlbumShares::Email).string().not_null())
                    .col(
                        ColumnDef::new(AlbumShares::GrantedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(AlbumShares::AlbumId)
                            .col(AlbumShares::Email),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(AlbumShares::Table, AlbumShares::AlbumId)
                            .to(Albums::Table, Albums::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Guest-side lookups go by email first ("which albums can I see?").
        manager
            .create_index(
                Index::create()
                    .table(AlbumShares::Table)
                    .col(AlbumShares::Email)
                    .name("idx_album_shares_email")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AlbumShares::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum AlbumShares {
    Table,
    AlbumId,
    Email,
    GrantedAt,
}

#[derive(Iden)]
enum Albums {
    Table,
    Id,
}
