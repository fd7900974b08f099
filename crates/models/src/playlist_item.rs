use std::{fmt, str::FromStr};

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{errors, playlist};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "playlist_item")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub playlist_id: i64,
    #[sea_orm(column_name = "type")]
    pub item_type: String,
    pub value: String,
    pub title: String,
    pub order: i32,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Playlist }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Playlist => Entity::belongs_to(playlist::Entity)
                .from(Column::PlaylistId)
                .to(playlist::Column::Id)
                .into(),
        }
    }
}

impl Related<playlist::Entity> for Entity {
    fn to() -> RelationDef { Relation::Playlist.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// How an item's `value` refers to dashboards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    DashboardByUid,
    DashboardByTag,
    /// Numeric dashboard id; kept for playlists created before uids existed.
    DashboardById,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::DashboardByUid => "dashboard_by_uid",
            ItemType::DashboardByTag => "dashboard_by_tag",
            ItemType::DashboardById => "dashboard_by_id",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemType {
    type Err = errors::ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dashboard_by_uid" => Ok(ItemType::DashboardByUid),
            "dashboard_by_tag" => Ok(ItemType::DashboardByTag),
            "dashboard_by_id" => Ok(ItemType::DashboardById),
            other => Err(errors::ModelError::Validation(format!("unknown playlist item type '{other}'"))),
        }
    }
}

pub const MAX_VALUE_LENGTH: usize = 255;
pub const MAX_TITLE_LENGTH: usize = 255;

/// Returns the trimmed value.
pub fn validate_value(item_type: ItemType, value: &str) -> Result<String, errors::ModelError> {
    let v = value.trim();
    if v.is_empty() {
        return Err(errors::ModelError::Validation("playlist item value required".into()));
    }
    if v.chars().count() > MAX_VALUE_LENGTH {
        return Err(errors::ModelError::Validation(format!("playlist item value longer than {MAX_VALUE_LENGTH} characters")));
    }
    if item_type == ItemType::DashboardById && !matches!(v.parse::<i64>(), Ok(id) if id > 0) {
        return Err(errors::ModelError::Validation(format!("dashboard id must be a positive integer, got '{v}'")));
    }
    Ok(v.to_string())
}

/// Returns the trimmed title; empty is allowed.
pub fn validate_title(title: &str) -> Result<String, errors::ModelError> {
    let t = title.trim();
    if t.chars().count() > MAX_TITLE_LENGTH {
        return Err(errors::ModelError::Validation(format!("playlist item title longer than {MAX_TITLE_LENGTH} characters")));
    }
    Ok(t.to_string())
}
