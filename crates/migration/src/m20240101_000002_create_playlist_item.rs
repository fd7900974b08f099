//! Create `playlist_item` table.
//! Ordered dashboard references belonging to a playlist.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PlaylistItem::Table)
                    .if_not_exists()
                    .col(big_integer(PlaylistItem::Id).auto_increment().primary_key())
                    .col(big_integer(PlaylistItem::PlaylistId).not_null())
                    .col(string_len(PlaylistItem::Type, 32).not_null())
                    .col(string_len(PlaylistItem::Value, 255).not_null())
                    .col(string_len(PlaylistItem::Title, 255).not_null())
                    .col(integer(PlaylistItem::Order).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_playlist_item_playlist")
                            .from(PlaylistItem::Table, PlaylistItem::PlaylistId)
                            .to(Playlist::Table, Playlist::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(PlaylistItem::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum PlaylistItem {
    Table,
    Id,
    PlaylistId,
    Type,
    Value,
    Title,
    Order,
}

#[derive(DeriveIden)]
enum Playlist { Table, Id }
