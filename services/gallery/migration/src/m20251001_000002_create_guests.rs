use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Guests::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Guests::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Guests::EventId).uuid().not_null())
                    .col(ColumnDef::new(Guests::Email).string().not_null())
                    .col(ColumnDef::new(Guests::Name).string().not_null())
                    .col(
                        ColumnDef::new(Guests::Attendance)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Guests::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Guests::Table, Guests::EventId)
                            .to(Events::Table, Events::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Guests::Table)
                    .col(Guests::EventId)
                    .col(Guests::Email)
                    .unique()
                    .name("uq_guests_event_id_email")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Guests::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Guests {
    Table,
    Id,
    EventId,
    Email,
    Name,
    Attendance,
    UpdatedAt,
}

#[derive(Iden)]
enum Events {
    Table,
    Id,
}
