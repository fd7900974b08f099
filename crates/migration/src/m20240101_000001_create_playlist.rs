//! Create `playlist` table.
//! One row per playlist; `uid` is the external identifier, unique per org.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Playlist::Table)
                    .if_not_exists()
                    .col(big_integer(Playlist::Id).auto_increment().primary_key())
                    .col(string_len(Playlist::Uid, 40).not_null())
                    .col(string_len(Playlist::Name, 255).not_null())
                    .col(string_len(Playlist::Interval, 64).not_null())
                    .col(big_integer(Playlist::OrgId).not_null())
                    .col(timestamp_with_time_zone(Playlist::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Playlist::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Playlist::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Playlist {
    Table,
    Id,
    Uid,
    Name,
    Interval,
    OrgId,
    CreatedAt,
    UpdatedAt,
}
