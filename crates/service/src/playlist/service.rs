use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use models::{playlist as playlist_model, playlist_item as item_model};

use super::context::RequestContext;
use super::domain::{
    generate_short_uid, CreatePlaylistCommand, DeletePlaylistCommand, GetPlaylistsQuery, NewPlaylist,
    NewPlaylistItem, Playlist, PlaylistDto, PlaylistItemInput, Playlists, ReadPlaylistByUidQuery,
    UpdatePlaylistCommand,
};
use super::errors::PlaylistError;
use super::repository::PlaylistStore;

/// CRUD plus search over playlists.
///
/// Every call is bounded by `ctx`: a cancelled context or an expired deadline
/// aborts the call with [`PlaylistError::Cancelled`] or
/// [`PlaylistError::DeadlineExceeded`].
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use service::playlist::{PlaylistService, PlaylistServiceImpl, RequestContext};
/// use service::playlist::domain::{CreatePlaylistCommand, ItemType, PlaylistItemInput, ReadPlaylistByUidQuery};
/// use service::playlist::repository::memory::MemoryPlaylistStore;
///
/// let svc = PlaylistServiceImpl::new(Arc::new(MemoryPlaylistStore::default()));
/// let ctx = RequestContext::background();
/// let cmd = CreatePlaylistCommand {
///     org_id: 1,
///     uid: None,
///     name: "Ops wall".into(),
///     interval: "5m".into(),
///     items: vec![PlaylistItemInput { item_type: ItemType::DashboardByTag, value: "ops".into(), title: String::new() }],
/// };
/// let created = tokio_test::block_on(svc.create(&ctx, &cmd)).unwrap();
/// let dto = tokio_test::block_on(svc.read(&ctx, &ReadPlaylistByUidQuery { org_id: 1, uid: created.uid })).unwrap();
/// assert_eq!(dto.items.len(), 1);
/// assert_eq!(dto.items[0].order, 1);
/// ```
#[async_trait]
pub trait PlaylistService: Send + Sync {
    async fn create(&self, ctx: &RequestContext, cmd: &CreatePlaylistCommand) -> Result<Playlist, PlaylistError>;
    async fn read(&self, ctx: &RequestContext, query: &ReadPlaylistByUidQuery) -> Result<PlaylistDto, PlaylistError>;
    async fn update(&self, ctx: &RequestContext, cmd: &UpdatePlaylistCommand) -> Result<PlaylistDto, PlaylistError>;
    async fn delete(&self, ctx: &RequestContext, cmd: &DeletePlaylistCommand) -> Result<(), PlaylistError>;

    /// Same lookup as [`PlaylistService::read`], without loading items.
    async fn get_without_items(&self, ctx: &RequestContext, query: &ReadPlaylistByUidQuery) -> Result<Playlist, PlaylistError>;
    /// Zero matches is an empty list, not an error.
    async fn search(&self, ctx: &RequestContext, query: &GetPlaylistsQuery) -> Result<Playlists, PlaylistError>;
}

/// Playlist business service independent of storage and web framework
pub struct PlaylistServiceImpl<S: PlaylistStore> {
    store: Arc<S>,
}

impl<S: PlaylistStore> PlaylistServiceImpl<S> {
    pub fn new(store: Arc<S>) -> Self { Self { store } }
}

fn require_org(org_id: i64) -> Result<(), PlaylistError> {
    if org_id <= 0 {
        return Err(PlaylistError::Validation("org_id must be positive".into()));
    }
    Ok(())
}

fn require_uid(uid: &str) -> Result<(), PlaylistError> {
    if uid.trim().is_empty() {
        return Err(PlaylistError::Validation("uid required".into()));
    }
    Ok(())
}

/// Validate fields and number items in input order.
fn prepare(org_id: i64, uid: String, name: &str, interval: &str, items: &[PlaylistItemInput]) -> Result<NewPlaylist, PlaylistError> {
    require_org(org_id)?;
    let name = playlist_model::validate_name(name)?;
    let interval = playlist_model::validate_interval(interval)?;
    let items = items
        .iter()
        .enumerate()
        .map(|(idx, item)| -> Result<NewPlaylistItem, PlaylistError> {
            let order = i32::try_from(idx + 1).map_err(|_| PlaylistError::Validation("too many playlist items".into()))?;
            Ok(NewPlaylistItem {
                item_type: item.item_type,
                value: item_model::validate_value(item.item_type, &item.value)?,
                title: item_model::validate_title(&item.title)?,
                order,
            })
        })
        .collect::<Result<Vec<_>, PlaylistError>>()?;
    Ok(NewPlaylist { org_id, uid, name, interval, items })
}

#[async_trait]
impl<S: PlaylistStore> PlaylistService for PlaylistServiceImpl<S> {
    #[instrument(skip(self, ctx, cmd), fields(org_id = cmd.org_id, uid = ?cmd.uid))]
    async fn create(&self, ctx: &RequestContext, cmd: &CreatePlaylistCommand) -> Result<Playlist, PlaylistError> {
        ctx.check()?;
        let uid = match cmd.uid.as_deref().map(str::trim) {
            Some(uid) if !uid.is_empty() => {
                playlist_model::validate_uid(uid)?;
                uid.to_string()
            }
            _ => generate_short_uid(),
        };
        let new = prepare(cmd.org_id, uid, &cmd.name, &cmd.interval, &cmd.items)?;
        let items = new.items.len();

        let created = ctx.run(self.store.insert(new)).await?;
        info!(playlist_id = created.id, uid = %created.uid, org_id = created.org_id, items, "playlist_created");
        Ok(created)
    }

    #[instrument(skip(self, ctx, query), fields(org_id = query.org_id, uid = %query.uid))]
    async fn read(&self, ctx: &RequestContext, query: &ReadPlaylistByUidQuery) -> Result<PlaylistDto, PlaylistError> {
        ctx.check()?;
        require_org(query.org_id)?;
        require_uid(&query.uid)?;

        ctx.run(async {
            let playlist = self.store.find(query.org_id, query.uid.trim()).await?.ok_or(PlaylistError::NotFound)?;
            let items = self.store.items(playlist.id).await?;
            Ok::<_, PlaylistError>(PlaylistDto::from_parts(&playlist, items))
        })
        .await
    }

    #[instrument(skip(self, ctx, cmd), fields(org_id = cmd.org_id, uid = %cmd.uid))]
    async fn update(&self, ctx: &RequestContext, cmd: &UpdatePlaylistCommand) -> Result<PlaylistDto, PlaylistError> {
        ctx.check()?;
        require_uid(&cmd.uid)?;
        let new = prepare(cmd.org_id, cmd.uid.trim().to_string(), &cmd.name, &cmd.interval, &cmd.items)?;

        let (playlist, items) = ctx.run(self.store.replace(new)).await?.ok_or(PlaylistError::NotFound)?;
        info!(playlist_id = playlist.id, uid = %playlist.uid, org_id = playlist.org_id, items = items.len(), "playlist_updated");
        Ok(PlaylistDto::from_parts(&playlist, items))
    }

    #[instrument(skip(self, ctx, cmd), fields(org_id = cmd.org_id, uid = %cmd.uid))]
    async fn delete(&self, ctx: &RequestContext, cmd: &DeletePlaylistCommand) -> Result<(), PlaylistError> {
        ctx.check()?;
        require_org(cmd.org_id)?;
        require_uid(&cmd.uid)?;

        if !ctx.run(self.store.delete(cmd.org_id, cmd.uid.trim())).await? {
            return Err(PlaylistError::NotFound);
        }
        info!(uid = %cmd.uid, org_id = cmd.org_id, "playlist_deleted");
        Ok(())
    }

    #[instrument(skip(self, ctx, query), fields(org_id = query.org_id, uid = %query.uid))]
    async fn get_without_items(&self, ctx: &RequestContext, query: &ReadPlaylistByUidQuery) -> Result<Playlist, PlaylistError> {
        ctx.check()?;
        require_org(query.org_id)?;
        require_uid(&query.uid)?;

        ctx.run(self.store.find(query.org_id, query.uid.trim())).await?.ok_or(PlaylistError::NotFound)
    }

    #[instrument(skip(self, ctx, query), fields(org_id = query.org_id))]
    async fn search(&self, ctx: &RequestContext, query: &GetPlaylistsQuery) -> Result<Playlists, PlaylistError> {
        ctx.check()?;
        require_org(query.org_id)?;

        let limit = query.effective_limit();
        let found = ctx.run(self.store.search(query.org_id, query.name_filter(), limit)).await?;
        debug!(count = found.len(), limit, "playlists searched");
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use models::{playlist, playlist_item};
    use sea_orm::{EntityTrait, PaginatorTrait, TransactionTrait};

    use crate::playlist::domain::{ItemType, PlaylistItem};
    use crate::playlist::repo::seaorm::{insert_rows, replace_rows, SeaOrmPlaylistStore};
    use crate::playlist::repository::memory::MemoryPlaylistStore;
    use crate::test_support::get_db;

    fn item(item_type: ItemType, value: &str) -> PlaylistItemInput {
        PlaylistItemInput { item_type, value: value.into(), title: String::new() }
    }

    fn create_cmd(uid: Option<&str>, name: &str) -> CreatePlaylistCommand {
        CreatePlaylistCommand {
            org_id: 1,
            uid: uid.map(Into::into),
            name: name.into(),
            interval: "5m".into(),
            items: vec![item(ItemType::DashboardByUid, "dash-a"), item(ItemType::DashboardByTag, "ops")],
        }
    }

    fn by_uid(uid: &str) -> ReadPlaylistByUidQuery {
        ReadPlaylistByUidQuery { org_id: 1, uid: uid.into() }
    }

    /// Runs the whole lifecycle against any store.
    async fn lifecycle<S: PlaylistStore>(svc: PlaylistServiceImpl<S>) -> Result<(), anyhow::Error> {
        let ctx = RequestContext::background();

        let created = svc.create(&ctx, &create_cmd(None, "  Ops wall ")).await?;
        assert_eq!(created.name, "Ops wall");
        assert_eq!(created.uid.len(), 14);

        let dto = svc.read(&ctx, &by_uid(&created.uid)).await?;
        assert_eq!(dto.uid, created.uid);
        assert_eq!(dto.items.iter().map(|i| (i.value.as_str(), i.order)).collect::<Vec<_>>(), [("dash-a", 1), ("ops", 2)]);

        let bare = svc.get_without_items(&ctx, &by_uid(&created.uid)).await?;
        assert_eq!(bare, created);

        let updated = svc
            .update(
                &ctx,
                &UpdatePlaylistCommand {
                    org_id: 1,
                    uid: created.uid.clone(),
                    name: "Night wall".into(),
                    interval: "1h30m".into(),
                    items: vec![item(ItemType::DashboardById, "42")],
                },
            )
            .await?;
        assert_eq!(updated.name, "Night wall");
        assert_eq!(updated.interval, "1h30m");
        assert_eq!(updated.items.len(), 1);
        assert_eq!(updated.items[0].order, 1);
        assert_eq!(svc.read(&ctx, &by_uid(&created.uid)).await?, updated);

        let hits = svc.search(&ctx, &GetPlaylistsQuery { org_id: 1, name: Some("night".into()), limit: 0 }).await?;
        assert_eq!(hits.len(), 1);
        let misses = svc.search(&ctx, &GetPlaylistsQuery { org_id: 1, name: Some("ops".into()), limit: 0 }).await?;
        assert!(misses.is_empty());

        let equipe = svc.create(&ctx, &create_cmd(None, "Équipe Sud")).await?;
        let hits = svc.search(&ctx, &GetPlaylistsQuery { org_id: 1, name: Some("Équipe".into()), limit: 0 }).await?;
        assert_eq!(hits.iter().map(|p| p.uid.as_str()).collect::<Vec<_>>(), [equipe.uid.as_str()]);
        let hits = svc.search(&ctx, &GetPlaylistsQuery { org_id: 1, name: Some("ÉQUIPE SUD".into()), limit: 0 }).await?;
        assert_eq!(hits.len(), 1);
        svc.delete(&ctx, &DeletePlaylistCommand { org_id: 1, uid: equipe.uid }).await?;

        svc.delete(&ctx, &DeletePlaylistCommand { org_id: 1, uid: created.uid.clone() }).await?;
        assert_eq!(svc.read(&ctx, &by_uid(&created.uid)).await, Err(PlaylistError::NotFound));
        assert_eq!(svc.get_without_items(&ctx, &by_uid(&created.uid)).await, Err(PlaylistError::NotFound));
        assert_eq!(
            svc.delete(&ctx, &DeletePlaylistCommand { org_id: 1, uid: created.uid }).await,
            Err(PlaylistError::NotFound)
        );
        Ok(())
    }

    #[tokio::test]
    async fn lifecycle_in_memory() -> Result<(), anyhow::Error> {
        lifecycle(PlaylistServiceImpl::new(Arc::new(MemoryPlaylistStore::default()))).await
    }

    #[tokio::test]
    async fn lifecycle_sqlite() -> Result<(), anyhow::Error> {
        let store = SeaOrmPlaylistStore::new(get_db().await?);
        lifecycle(PlaylistServiceImpl::new(Arc::new(store))).await
    }

    #[tokio::test]
    async fn explicit_uid_is_kept_and_must_be_unique() {
        let svc = PlaylistServiceImpl::new(Arc::new(MemoryPlaylistStore::default()));
        let ctx = RequestContext::background();

        let created = svc.create(&ctx, &create_cmd(Some(" my-wall_1 "), "Wall")).await.unwrap();
        assert_eq!(created.uid, "my-wall_1");

        let err = svc.create(&ctx, &create_cmd(Some("my-wall_1"), "Other")).await.unwrap_err();
        assert!(matches!(err, PlaylistError::Conflict(_)));

        let err = svc.create(&ctx, &create_cmd(Some("bad uid!"), "Other")).await.unwrap_err();
        assert!(matches!(err, PlaylistError::Validation(_)));
    }

    #[tokio::test]
    async fn invalid_commands_are_rejected_before_storage() {
        let svc = PlaylistServiceImpl::new(Arc::new(MemoryPlaylistStore::default()));
        let ctx = RequestContext::background();

        let mut cmd = create_cmd(None, " ");
        assert!(matches!(svc.create(&ctx, &cmd).await, Err(PlaylistError::Validation(_))));

        cmd.name = "ok".into();
        cmd.interval = "soon".into();
        assert!(matches!(svc.create(&ctx, &cmd).await, Err(PlaylistError::Validation(_))));

        cmd.interval = "5m".into();
        cmd.items.push(item(ItemType::DashboardById, "not-a-number"));
        assert!(matches!(svc.create(&ctx, &cmd).await, Err(PlaylistError::Validation(_))));

        cmd.items.pop();
        cmd.interval = "1m".repeat(40);
        assert!(matches!(svc.create(&ctx, &cmd).await, Err(PlaylistError::Validation(_))));

        cmd.interval = "5m".into();
        cmd.items[0].title = "t".repeat(300);
        assert!(matches!(svc.create(&ctx, &cmd).await, Err(PlaylistError::Validation(_))));

        cmd.items[0].title = String::new();
        cmd.org_id = 0;
        assert!(matches!(svc.create(&ctx, &cmd).await, Err(PlaylistError::Validation(_))));

        let empty_uid = ReadPlaylistByUidQuery { org_id: 1, uid: "  ".into() };
        assert!(matches!(svc.read(&ctx, &empty_uid).await, Err(PlaylistError::Validation(_))));
        assert!(matches!(svc.get_without_items(&ctx, &empty_uid).await, Err(PlaylistError::Validation(_))));
        assert!(matches!(
            svc.delete(&ctx, &DeletePlaylistCommand { org_id: 0, uid: "x".into() }).await,
            Err(PlaylistError::Validation(_))
        ));
        assert!(matches!(
            svc.search(&ctx, &GetPlaylistsQuery::default()).await,
            Err(PlaylistError::Validation(_))
        ));

        // nothing was written
        let all = svc.search(&ctx, &GetPlaylistsQuery { org_id: 1, ..Default::default() }).await.unwrap();
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn update_of_missing_playlist_is_not_found() {
        let svc = PlaylistServiceImpl::new(Arc::new(MemoryPlaylistStore::default()));
        let cmd = UpdatePlaylistCommand { org_id: 1, uid: "ghost".into(), name: "n".into(), interval: "5m".into(), items: vec![] };
        assert_eq!(svc.update(&RequestContext::background(), &cmd).await, Err(PlaylistError::NotFound));
    }

    #[tokio::test]
    async fn playlists_are_scoped_per_org() -> Result<(), anyhow::Error> {
        let svc = PlaylistServiceImpl::new(Arc::new(MemoryPlaylistStore::default()));
        let ctx = RequestContext::background();
        let created = svc.create(&ctx, &create_cmd(Some("shared"), "Org one")).await?;

        let other_org = ReadPlaylistByUidQuery { org_id: 2, uid: created.uid.clone() };
        assert_eq!(svc.read(&ctx, &other_org).await, Err(PlaylistError::NotFound));
        assert!(svc.search(&ctx, &GetPlaylistsQuery { org_id: 2, ..Default::default() }).await?.is_empty());

        let mut cmd = create_cmd(Some("shared"), "Org two");
        cmd.org_id = 2;
        svc.create(&ctx, &cmd).await?;
        Ok(())
    }

    #[tokio::test]
    async fn search_sorts_by_name_and_honours_limit() -> Result<(), anyhow::Error> {
        let svc = PlaylistServiceImpl::new(Arc::new(MemoryPlaylistStore::default()));
        let ctx = RequestContext::background();
        for name in ["Charlie", "alpha", "Bravo"] {
            svc.create(&ctx, &create_cmd(None, name)).await?;
        }
        let all = svc.search(&ctx, &GetPlaylistsQuery { org_id: 1, ..Default::default() }).await?;
        assert_eq!(all.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(), ["Bravo", "Charlie", "alpha"]);

        let two = svc.search(&ctx, &GetPlaylistsQuery { org_id: 1, name: None, limit: 2 }).await?;
        assert_eq!(two.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn cancelled_context_aborts_every_operation() {
        let svc = PlaylistServiceImpl::new(Arc::new(MemoryPlaylistStore::default()));
        let (ctx, handle) = RequestContext::new();
        handle.cancel();

        assert_eq!(svc.create(&ctx, &create_cmd(None, "x")).await, Err(PlaylistError::Cancelled));
        assert_eq!(svc.read(&ctx, &by_uid("x")).await, Err(PlaylistError::Cancelled));
        let update = UpdatePlaylistCommand { org_id: 1, uid: "x".into(), name: "n".into(), interval: "5m".into(), items: vec![] };
        assert_eq!(svc.update(&ctx, &update).await, Err(PlaylistError::Cancelled));
        assert_eq!(svc.get_without_items(&ctx, &by_uid("x")).await, Err(PlaylistError::Cancelled));
        assert_eq!(
            svc.search(&ctx, &GetPlaylistsQuery { org_id: 1, ..Default::default() }).await,
            Err(PlaylistError::Cancelled)
        );
        assert_eq!(
            svc.delete(&ctx, &DeletePlaylistCommand { org_id: 1, uid: "x".into() }).await,
            Err(PlaylistError::Cancelled)
        );

        // the context wins over validation
        assert_eq!(svc.create(&ctx, &create_cmd(Some("bad uid!"), " ")).await, Err(PlaylistError::Cancelled));
        let invalid_update = UpdatePlaylistCommand { org_id: 0, uid: " ".into(), name: " ".into(), interval: "x".into(), items: vec![] };
        assert_eq!(svc.update(&ctx, &invalid_update).await, Err(PlaylistError::Cancelled));
        assert_eq!(
            svc.search(&ctx, &GetPlaylistsQuery::default()).await,
            Err(PlaylistError::Cancelled)
        );

        // the aborted create left nothing behind
        let fresh = RequestContext::background();
        assert!(svc.search(&fresh, &GetPlaylistsQuery { org_id: 1, ..Default::default() }).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn expired_deadline_is_reported() {
        let svc = PlaylistServiceImpl::new(Arc::new(MemoryPlaylistStore::default()));
        let ctx = RequestContext::background().with_timeout(std::time::Duration::ZERO);
        assert_eq!(svc.read(&ctx, &by_uid("x")).await, Err(PlaylistError::DeadlineExceeded));
    }

    /// SeaORM store that keeps each write transaction open for `hold` before committing.
    struct SlowCommitStore {
        inner: SeaOrmPlaylistStore,
        hold: Duration,
    }

    #[async_trait]
    impl PlaylistStore for SlowCommitStore {
        async fn insert(&self, new: NewPlaylist) -> Result<Playlist, PlaylistError> {
            let txn = self.inner.db.begin().await?;
            let created = insert_rows(&txn, &new).await?;
            tokio::time::sleep(self.hold).await;
            txn.commit().await?;
            Ok(created)
        }

        async fn find(&self, org_id: i64, uid: &str) -> Result<Option<Playlist>, PlaylistError> {
            self.inner.find(org_id, uid).await
        }

        async fn items(&self, playlist_id: i64) -> Result<Vec<PlaylistItem>, PlaylistError> {
            self.inner.items(playlist_id).await
        }

        async fn replace(&self, new: NewPlaylist) -> Result<Option<(Playlist, Vec<PlaylistItem>)>, PlaylistError> {
            let txn = self.inner.db.begin().await?;
            let replaced = replace_rows(&txn, &new).await?;
            tokio::time::sleep(self.hold).await;
            txn.commit().await?;
            Ok(replaced)
        }

        async fn delete(&self, org_id: i64, uid: &str) -> Result<bool, PlaylistError> {
            self.inner.delete(org_id, uid).await
        }

        async fn search(&self, org_id: i64, name: Option<&str>, limit: u64) -> Result<Vec<Playlist>, PlaylistError> {
            self.inner.search(org_id, name, limit).await
        }
    }

    #[tokio::test]
    async fn deadline_during_insert_rolls_back() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let slow = SlowCommitStore { inner: SeaOrmPlaylistStore::new(db.clone()), hold: Duration::from_secs(5) };
        let svc = PlaylistServiceImpl::new(Arc::new(slow));

        let ctx = RequestContext::background().with_timeout(Duration::from_millis(50));
        assert_eq!(svc.create(&ctx, &create_cmd(Some("slow"), "Slow")).await, Err(PlaylistError::DeadlineExceeded));

        let fresh = RequestContext::background();
        assert_eq!(svc.read(&fresh, &by_uid("slow")).await, Err(PlaylistError::NotFound));
        assert_eq!(playlist::Entity::find().count(&db).await?, 0);
        assert_eq!(playlist_item::Entity::find().count(&db).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn cancel_during_update_keeps_previous_version() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let fast = PlaylistServiceImpl::new(Arc::new(SeaOrmPlaylistStore::new(db.clone())));
        let fresh = RequestContext::background();
        let before = fast.create(&fresh, &create_cmd(Some("kept"), "Kept")).await?;
        let before = fast.read(&fresh, &by_uid(&before.uid)).await?;

        let slow = SlowCommitStore { inner: SeaOrmPlaylistStore::new(db.clone()), hold: Duration::from_secs(5) };
        let svc = PlaylistServiceImpl::new(Arc::new(slow));
        let (ctx, handle) = RequestContext::new();
        let cmd = UpdatePlaylistCommand {
            org_id: 1,
            uid: "kept".into(),
            name: "Renamed".into(),
            interval: "1m".into(),
            items: vec![item(ItemType::DashboardByTag, "night")],
        };
        let (res, ()) = tokio::join!(svc.update(&ctx, &cmd), async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            handle.cancel();
        });
        assert_eq!(res, Err(PlaylistError::Cancelled));

        assert_eq!(fast.read(&fresh, &by_uid("kept")).await?, before);
        assert_eq!(playlist_item::Entity::find().count(&db).await?, 2);
        Ok(())
    }
}
