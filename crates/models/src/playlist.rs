use sea_orm::{entity::prelude::*, ConnectionTrait, QueryOrder};
use serde::{Deserialize, Serialize};

use crate::{errors, playlist_item};

/// Longest accepted playlist uid.
pub const MAX_UID_LENGTH: usize = 40;
pub const MAX_NAME_LENGTH: usize = 255;
pub const MAX_INTERVAL_LENGTH: usize = 64;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "playlist")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub uid: String,
    pub name: String,
    pub interval: String,
    pub org_id: i64,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Items }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Items => Entity::has_many(playlist_item::Entity).into(),
        }
    }
}

impl Related<playlist_item::Entity> for Entity {
    fn to() -> RelationDef { Relation::Items.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_uid(uid: &str) -> Result<(), errors::ModelError> {
    if uid.is_empty() {
        return Err(errors::ModelError::Validation("uid required".into()));
    }
    if uid.len() > MAX_UID_LENGTH {
        return Err(errors::ModelError::Validation(format!("uid longer than {MAX_UID_LENGTH} characters")));
    }
    if !uid.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(errors::ModelError::Validation("uid may only contain letters, digits, '-' and '_'".into()));
    }
    Ok(())
}

/// Returns the trimmed name.
pub fn validate_name(name: &str) -> Result<String, errors::ModelError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(errors::ModelError::Validation("name required".into()));
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(errors::ModelError::Validation(format!("name longer than {MAX_NAME_LENGTH} characters")));
    }
    Ok(trimmed.to_string())
}

/// Accepts one or more `<digits><unit>` groups, e.g. `5m`, `30s`, `1h30m`.
pub fn validate_interval(interval: &str) -> Result<String, errors::ModelError> {
    let invalid = || errors::ModelError::Validation(format!("invalid interval '{interval}'"));
    let s = interval.trim();
    if s.is_empty() {
        return Err(errors::ModelError::Validation("interval required".into()));
    }
    if s.len() > MAX_INTERVAL_LENGTH {
        return Err(errors::ModelError::Validation(format!("interval longer than {MAX_INTERVAL_LENGTH} characters")));
    }

    let mut rest = s;
    while !rest.is_empty() {
        let digits = rest.chars().take_while(|c| c.is_ascii_digit()).count();
        if digits == 0 {
            return Err(invalid());
        }
        rest = &rest[digits..];
        let unit = ["ms", "s", "m", "h", "d", "w"]
            .into_iter()
            .find(|u| rest.starts_with(u))
            .ok_or_else(invalid)?;
        rest = &rest[unit.len()..];
    }
    Ok(s.to_string())
}

pub async fn find_by_org_uid<C: ConnectionTrait>(db: &C, org_id: i64, uid: &str) -> Result<Option<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::OrgId.eq(org_id))
        .filter(Column::Uid.eq(uid))
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

/// Items of a playlist in rotation order.
pub async fn items_of<C: ConnectionTrait>(db: &C, playlist_id: i64) -> Result<Vec<playlist_item::Model>, errors::ModelError> {
    playlist_item::Entity::find()
        .filter(playlist_item::Column::PlaylistId.eq(playlist_id))
        .order_by_asc(playlist_item::Column::Order)
        .order_by_asc(playlist_item::Column::Id)
        .all(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}
