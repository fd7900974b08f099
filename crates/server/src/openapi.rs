use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

#[derive(ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// One of `dashboard_by_uid`, `dashboard_by_tag`, `dashboard_by_id`.
#[derive(Serialize, ToSchema)]
pub struct PlaylistItemInputDoc {
    #[serde(rename = "type")]
    pub item_type: String,
    pub value: String,
    pub title: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct PlaylistItemDoc {
    #[serde(rename = "type")]
    pub item_type: String,
    pub value: String,
    pub title: String,
    pub order: i32,
}

#[derive(ToSchema)]
pub struct PlaylistDoc {
    pub id: i64,
    pub uid: String,
    pub name: String,
    pub interval: String,
    pub org_id: i64,
}

#[derive(ToSchema)]
pub struct PlaylistDtoDoc {
    pub uid: String,
    pub name: String,
    pub interval: String,
    pub items: Vec<PlaylistItemDoc>,
}

#[derive(ToSchema)]
pub struct CreatePlaylistInputDoc {
    /// Generated when absent.
    pub uid: Option<String>,
    pub name: String,
    pub interval: String,
    pub items: Vec<PlaylistItemInputDoc>,
}

#[derive(ToSchema)]
pub struct UpdatePlaylistInputDoc {
    pub name: String,
    pub interval: String,
    pub items: Vec<PlaylistItemInputDoc>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::playlists::search,
        crate::routes::playlists::create,
        crate::routes::playlists::read,
        crate::routes::playlists::items,
        crate::routes::playlists::summary,
        crate::routes::playlists::update,
        crate::routes::playlists::delete,
    ),
    components(
        schemas(
            HealthResponse,
            PlaylistItemInputDoc,
            PlaylistItemDoc,
            PlaylistDoc,
            PlaylistDtoDoc,
            CreatePlaylistInputDoc,
            UpdatePlaylistInputDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "playlists")
    )
)]
pub struct ApiDoc;
