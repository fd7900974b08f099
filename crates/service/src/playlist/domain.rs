use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use models::playlist_item::ItemType;

/// Playlist without its items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: i64,
    pub uid: String,
    pub name: String,
    pub interval: String,
    pub org_id: i64,
}

pub type Playlists = Vec<Playlist>;

/// Stored playlist item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistItem {
    pub id: i64,
    pub playlist_id: i64,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub value: String,
    pub title: String,
    pub order: i32,
}

/// Item as supplied by create and update commands. Position in the list is its order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistItemInput {
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub value: String,
    #[serde(default)]
    pub title: String,
}

/// Full playlist representation, items in rotation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistDto {
    pub uid: String,
    pub name: String,
    pub interval: String,
    pub items: Vec<PlaylistItemDto>,
    #[serde(skip)]
    pub org_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistItemDto {
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub value: String,
    pub title: String,
    pub order: i32,
}

impl PlaylistDto {
    pub fn from_parts(playlist: &Playlist, mut items: Vec<PlaylistItem>) -> Self {
        items.sort_by_key(|i| (i.order, i.id));
        Self {
            uid: playlist.uid.clone(),
            name: playlist.name.clone(),
            interval: playlist.interval.clone(),
            org_id: playlist.org_id,
            items: items
                .into_iter()
                .map(|i| PlaylistItemDto { item_type: i.item_type, value: i.value, title: i.title, order: i.order })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistCommand {
    pub org_id: i64,
    /// Generated when absent or blank.
    #[serde(default)]
    pub uid: Option<String>,
    pub name: String,
    pub interval: String,
    #[serde(default)]
    pub items: Vec<PlaylistItemInput>,
}

/// Replaces name, interval and the whole item list of an existing playlist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePlaylistCommand {
    pub org_id: i64,
    pub uid: String,
    pub name: String,
    pub interval: String,
    #[serde(default)]
    pub items: Vec<PlaylistItemInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletePlaylistCommand {
    pub org_id: i64,
    pub uid: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadPlaylistByUidQuery {
    pub org_id: i64,
    pub uid: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetPlaylistsQuery {
    pub org_id: i64,
    /// Substring of the name, matched ignoring ASCII case.
    #[serde(default)]
    pub name: Option<String>,
    /// 0 selects [`DEFAULT_SEARCH_LIMIT`].
    #[serde(default)]
    pub limit: u64,
}

pub const DEFAULT_SEARCH_LIMIT: u64 = 1000;

impl GetPlaylistsQuery {
    pub fn effective_limit(&self) -> u64 {
        match self.limit {
            0 => DEFAULT_SEARCH_LIMIT,
            n => n.min(DEFAULT_SEARCH_LIMIT),
        }
    }

    /// Name filter with surrounding whitespace removed; blank filters are dropped.
    pub fn name_filter(&self) -> Option<&str> {
        self.name.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }
}

/// Validated playlist ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPlaylist {
    pub org_id: i64,
    pub uid: String,
    pub name: String,
    pub interval: String,
    pub items: Vec<NewPlaylistItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPlaylistItem {
    pub item_type: ItemType,
    pub value: String,
    pub title: String,
    /// 1-based.
    pub order: i32,
}

/// 14 lowercase alphanumerics starting with a letter.
pub fn generate_short_uid() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    let bytes = hex.as_bytes();
    let first = (b'a' + bytes[0] % 26) as char;
    format!("{first}{}", &hex[1..14])
}
