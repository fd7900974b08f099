use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    sea_query::{Expr, Func, LikeExpr},
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseBackend, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::debug;

use models::{playlist, playlist_item};

use crate::playlist::domain::{NewPlaylist, Playlist, PlaylistItem};
use crate::playlist::errors::PlaylistError;
use crate::playlist::repository::PlaylistStore;

pub struct SeaOrmPlaylistStore {
    pub db: DatabaseConnection,
}

impl SeaOrmPlaylistStore {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

fn to_playlist(m: playlist::Model) -> Playlist {
    Playlist { id: m.id, uid: m.uid, name: m.name, interval: m.interval, org_id: m.org_id }
}

fn to_item(m: playlist_item::Model) -> Result<PlaylistItem, PlaylistError> {
    Ok(PlaylistItem {
        id: m.id,
        playlist_id: m.playlist_id,
        item_type: m.item_type.parse().map_err(|e: models::errors::ModelError| PlaylistError::Repository(e.to_string()))?,
        value: m.value,
        title: m.title,
        order: m.order,
    })
}

async fn write_items<C: ConnectionTrait>(db: &C, playlist_id: i64, new: &NewPlaylist) -> Result<Vec<PlaylistItem>, PlaylistError> {
    let mut out = Vec::with_capacity(new.items.len());
    for item in &new.items {
        let am = playlist_item::ActiveModel {
            playlist_id: Set(playlist_id),
            item_type: Set(item.item_type.to_string()),
            value: Set(item.value.clone()),
            title: Set(item.title.clone()),
            order: Set(item.order),
            ..Default::default()
        };
        out.push(to_item(am.insert(db).await?)?);
    }
    Ok(out)
}

/// Playlist and item rows of an insert; the caller owns the transaction.
pub(crate) async fn insert_rows<C: ConnectionTrait>(db: &C, new: &NewPlaylist) -> Result<Playlist, PlaylistError> {
    if playlist::find_by_org_uid(db, new.org_id, &new.uid).await?.is_some() {
        return Err(PlaylistError::Conflict(format!("uid '{}' is taken", new.uid)));
    }

    let now = Utc::now().into();
    let created = playlist::ActiveModel {
        uid: Set(new.uid.clone()),
        name: Set(new.name.clone()),
        interval: Set(new.interval.clone()),
        org_id: Set(new.org_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;
    let items = write_items(db, created.id, new).await?;

    debug!(playlist_id = created.id, items = items.len(), "playlist rows inserted");
    Ok(to_playlist(created))
}

/// Overwrite the playlist row and swap its items; `None` when absent.
pub(crate) async fn replace_rows<C: ConnectionTrait>(
    db: &C,
    new: &NewPlaylist,
) -> Result<Option<(Playlist, Vec<PlaylistItem>)>, PlaylistError> {
    let Some(existing) = playlist::find_by_org_uid(db, new.org_id, &new.uid).await? else {
        return Ok(None);
    };

    let id = existing.id;
    let mut am: playlist::ActiveModel = existing.into();
    am.name = Set(new.name.clone());
    am.interval = Set(new.interval.clone());
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(db).await?;

    playlist_item::Entity::delete_many()
        .filter(playlist_item::Column::PlaylistId.eq(id))
        .exec(db)
        .await?;
    let items = write_items(db, id, new).await?;
    Ok(Some((to_playlist(updated), items)))
}

/// Lowercase the needle the way the backend's `LOWER()` folds the column:
/// SQLite only folds ASCII, Postgres folds Unicode.
fn fold_like_backend(needle: &str, backend: DatabaseBackend) -> String {
    match backend {
        DatabaseBackend::Sqlite => needle.to_ascii_lowercase(),
        _ => needle.to_lowercase(),
    }
}

/// `%`/`_` in user input match literally.
fn contains_pattern(needle: &str, backend: DatabaseBackend) -> LikeExpr {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in fold_like_backend(needle, backend).chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    LikeExpr::new(escaped).escape('\\')
}

#[async_trait]
impl PlaylistStore for SeaOrmPlaylistStore {
    async fn insert(&self, new: NewPlaylist) -> Result<Playlist, PlaylistError> {
        let txn = self.db.begin().await?;
        let created = insert_rows(&txn, &new).await?;
        txn.commit().await?;
        Ok(created)
    }

    async fn find(&self, org_id: i64, uid: &str) -> Result<Option<Playlist>, PlaylistError> {
        Ok(playlist::find_by_org_uid(&self.db, org_id, uid).await?.map(to_playlist))
    }

    async fn items(&self, playlist_id: i64) -> Result<Vec<PlaylistItem>, PlaylistError> {
        playlist::items_of(&self.db, playlist_id).await?.into_iter().map(to_item).collect()
    }

    async fn replace(&self, new: NewPlaylist) -> Result<Option<(Playlist, Vec<PlaylistItem>)>, PlaylistError> {
        let txn = self.db.begin().await?;
        let replaced = replace_rows(&txn, &new).await?;
        txn.commit().await?;
        Ok(replaced)
    }

    async fn delete(&self, org_id: i64, uid: &str) -> Result<bool, PlaylistError> {
        let txn = self.db.begin().await?;
        let Some(existing) = playlist::find_by_org_uid(&txn, org_id, uid).await? else {
            return Ok(false);
        };
        playlist_item::Entity::delete_many()
            .filter(playlist_item::Column::PlaylistId.eq(existing.id))
            .exec(&txn)
            .await?;
        playlist::Entity::delete_by_id(existing.id).exec(&txn).await?;
        txn.commit().await?;
        Ok(true)
    }

    async fn search(&self, org_id: i64, name: Option<&str>, limit: u64) -> Result<Vec<Playlist>, PlaylistError> {
        let mut select = playlist::Entity::find().filter(playlist::Column::OrgId.eq(org_id));
        if let Some(needle) = name {
            let lowered = Expr::expr(Func::lower(Expr::col((playlist::Entity, playlist::Column::Name))));
            select = select.filter(lowered.like(contains_pattern(needle, self.db.get_database_backend())));
        }
        let rows = select
            .order_by_asc(playlist::Column::Name)
            .order_by_asc(playlist::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(to_playlist).collect())
    }
}
