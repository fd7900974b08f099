pub mod errors;
pub mod db;
pub mod playlist;
pub mod playlist_item;

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use configs::DatabaseConfig;
    use migration::MigratorTrait;
    use sea_orm::{ActiveModelTrait, EntityTrait, ModelTrait, Set};

    use crate::{db, playlist, playlist_item};

    async fn memory_db() -> anyhow::Result<sea_orm::DatabaseConnection> {
        let cfg = DatabaseConfig { url: "sqlite::memory:".into(), ..DatabaseConfig::default() };
        let db = db::connect_with_config(&cfg).await?;
        migration::Migrator::up(&db, None).await?;
        Ok(db)
    }

    #[tokio::test]
    async fn playlist_with_items_roundtrip() -> anyhow::Result<()> {
        let db = memory_db().await?;
        db::ping(&db).await?;

        let now = Utc::now().into();
        let p = playlist::ActiveModel {
            uid: Set("ops".into()),
            name: Set("Ops wall".into()),
            interval: Set("5m".into()),
            org_id: Set(1),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        for (i, value) in ["b-dash", "a-dash"].into_iter().enumerate() {
            playlist_item::ActiveModel {
                playlist_id: Set(p.id),
                item_type: Set(playlist_item::ItemType::DashboardByUid.to_string()),
                value: Set(value.into()),
                title: Set(String::new()),
                order: Set(i as i32 + 1),
                ..Default::default()
            }
            .insert(&db)
            .await?;
        }

        let found = playlist::find_by_org_uid(&db, 1, "ops").await?.unwrap();
        assert_eq!(found.id, p.id);
        assert!(playlist::find_by_org_uid(&db, 2, "ops").await?.is_none());

        let items = playlist::items_of(&db, p.id).await?;
        assert_eq!(items.iter().map(|i| i.value.as_str()).collect::<Vec<_>>(), ["b-dash", "a-dash"]);

        let related = found.find_related(playlist_item::Entity).all(&db).await?;
        assert_eq!(related.len(), 2);

        playlist_item::Entity::delete_many().exec(&db).await?;
        playlist::Entity::delete_by_id(p.id).exec(&db).await?;
        assert!(playlist::find_by_org_uid(&db, 1, "ops").await?.is_none());
        Ok(())
    }
}
