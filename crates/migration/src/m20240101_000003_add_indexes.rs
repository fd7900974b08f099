//! Indexes for playlist lookups: uid per org (unique), name search per org,
//! and items by owning playlist.
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name("idx_playlist_org_uid")
                    .table(Playlist::Table)
                    .col(Playlist::OrgId)
                    .col(Playlist::Uid)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_playlist_org_name")
                    .table(Playlist::Table)
                    .col(Playlist::OrgId)
                    .col(Playlist::Name)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_playlist_item_playlist")
                    .table(PlaylistItem::Table)
                    .col(PlaylistItem::PlaylistId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_playlist_item_playlist").table(PlaylistItem::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_playlist_org_name").table(Playlist::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_playlist_org_uid").table(Playlist::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Playlist { Table, OrgId, Uid, Name }

#[derive(DeriveIden)]
enum PlaylistItem { Table, PlaylistId }
